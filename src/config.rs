use crate::constants::GEMINI_API_BASE;
use crate::errors::{ConciergeError, ConciergeResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Runtime configuration. Environment-only: the app takes no CLI flags and
/// writes no config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: GEMINI_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Reads `GEMINI_API_KEY` (required) and `GEMINI_API_BASE` (optional
    /// origin override). A missing key is a normal error, not a panic; the
    /// caller turns it into the permanent setup-error screen.
    pub fn from_env() -> ConciergeResult<Self> {
        let config = Config {
            api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            api_base: env::var("GEMINI_API_BASE").unwrap_or_else(|_| GEMINI_API_BASE.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConciergeResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ConciergeError::config_error("GEMINI_API_KEY is not set"));
        }

        if self.api_base.trim().is_empty() {
            return Err(ConciergeError::config_error("API base URL must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_valid() {
        let config = Config {
            api_key: "test-key".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_config_missing_api_key() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_config_blank_api_base() {
        let config = Config {
            api_key: "test-key".to_string(),
            api_base: "  ".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
