use crate::constants::{CREDENTIAL_FAILURE_TEXT, GENERIC_FAILURE_TEXT, QUOTA_FAILURE_TEXT};
use thiserror::Error;

pub type ConciergeResult<T> = Result<T, ConciergeError>;

#[derive(Error, Debug)]
pub enum ConciergeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),
}

impl ConciergeError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
}

/// Category assigned to a failed exchange. Picks the fallback text shown in
/// place of the reply that never arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    CredentialInvalid,
    QuotaExceeded,
    Generic,
}

impl FailureCategory {
    pub fn classify(failure: &str) -> Self {
        if failure.contains("API key not valid") {
            FailureCategory::CredentialInvalid
        } else if failure.contains("quota") {
            FailureCategory::QuotaExceeded
        } else {
            FailureCategory::Generic
        }
    }

    pub fn fallback_text(self) -> &'static str {
        match self {
            FailureCategory::CredentialInvalid => CREDENTIAL_FAILURE_TEXT,
            FailureCategory::QuotaExceeded => QUOTA_FAILURE_TEXT,
            FailureCategory::Generic => GENERIC_FAILURE_TEXT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_invalid_key() {
        let failure = "api error: API key not valid. Please pass a valid API key.";
        assert_eq!(
            FailureCategory::classify(failure),
            FailureCategory::CredentialInvalid
        );
    }

    #[test]
    fn classify_quota() {
        let failure = "Resource has been exhausted (e.g. check quota).";
        assert_eq!(
            FailureCategory::classify(failure),
            FailureCategory::QuotaExceeded
        );
    }

    #[test]
    fn classify_anything_else() {
        assert_eq!(
            FailureCategory::classify("connection reset by peer"),
            FailureCategory::Generic
        );
    }

    #[test]
    fn fallback_text_per_category() {
        assert_eq!(
            FailureCategory::CredentialInvalid.fallback_text(),
            CREDENTIAL_FAILURE_TEXT
        );
        assert_eq!(
            FailureCategory::QuotaExceeded.fallback_text(),
            QUOTA_FAILURE_TEXT
        );
        assert_eq!(FailureCategory::Generic.fallback_text(), GENERIC_FAILURE_TEXT);
    }
}
