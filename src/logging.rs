use crate::errors::{ConciergeError, ConciergeResult};
use flexi_logger::{FileSpec, Logger, LoggerHandle};

/// Starts the file logger. Stdout belongs to the TUI, so log lines go to
/// `concierge.log` in the working directory. The handle must stay alive for
/// the lifetime of the process.
pub fn init() -> ConciergeResult<LoggerHandle> {
    Logger::try_with_env_or_str("info")
        .map_err(|e| ConciergeError::config_error(format!("invalid log spec: {}", e)))?
        .log_to_file(
            FileSpec::default()
                .basename("concierge")
                .suppress_timestamp(),
        )
        .append()
        .start()
        .map_err(|e| ConciergeError::config_error(format!("failed to start logger: {}", e)))
}
