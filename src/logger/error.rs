use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log level '{0}', expected one of trace, debug, info, warn, error")]
    InvalidLevel(String),

    #[error("invalid log format '{0}', expected full, compact or json")]
    InvalidFormat(String),

    #[error("invalid rotation settings: {0}")]
    InvalidRotation(String),

    #[error("at least one log output (console or file) must be enabled")]
    NoOutput,

    #[error("file output is enabled but no path is set")]
    MissingPath,

    /// The global subscriber was already set or the filter could not reload.
    #[error("tracing subscriber error: {0}")]
    Subscriber(String),
}
