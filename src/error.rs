use thiserror::Error as ThisError;

/// Errors surfaced by a [`Logger`](crate::Logger) after assembly.
///
/// Assembly itself never fails; see [`Diagnostic`](crate::Diagnostic).
#[derive(ThisError, Debug)]
pub enum Error {
    /// Rotating or opening the log file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The operation needs configuration the logger was built without.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Installing the logger as the global dispatcher failed.
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
