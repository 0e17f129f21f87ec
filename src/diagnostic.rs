use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A configuration or startup fault that was recovered from.
///
/// Assembly never fails; each fault it papers over is reported here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The level name was not recognized; `trace` is used.
    UnknownLevel { given: String },
    /// The timestamp format did not parse; the default stamp is used.
    InvalidTimestampFormat { format: String, reason: String },
    /// Rotating the log file at startup failed; logging continues.
    StartupRotationFailed { path: PathBuf, error: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { given } => {
                write!(f, "unknown log level {:?}, using trace", given)
            }
            Self::InvalidTimestampFormat { format, reason } => {
                write!(
                    f,
                    "invalid timestamp format {:?} ({}), using default",
                    format, reason
                )
            }
            Self::StartupRotationFailed { path, error } => {
                write!(
                    f,
                    "startup rotation of {} failed: {}",
                    path.display(),
                    error
                )
            }
        }
    }
}

/// Callback receiving diagnostics during assembly.
pub type DiagnosticObserver = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

pub(crate) fn report(observer: Option<&DiagnosticObserver>, diagnostic: Diagnostic) {
    if let Some(observer) = observer {
        observer(&diagnostic);
    }
}
