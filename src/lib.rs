//! # Lograft
//!
//! Build a ready-to-use logger from a configuration object.
//!
//! ## Features
//!
//! - Severity filtering by level name, forgiving unknown names
//! - Console output, plus an optional size-rotated log file
//! - Backup retention by count and age, with optional gzip
//! - A compact one-line text format with call-site annotations
//! - Built on the `tracing` ecosystem
//!
//! ## Example
//!
//! ```rust
//! use lograft::{default_config, new_logger};
//!
//! let logger = new_logger(&default_config(None::<String>));
//! logger.with_default(|| tracing::info!("This is an info message"));
//! ```

pub mod builder;
pub mod caller;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
pub mod rotation;
pub mod writer;

pub use builder::LogBuilder;
pub use caller::{CallSite, render_caller};
pub use config::{FormatterConfig, LoggerConfig, RotationConfig, default_config};
pub use diagnostic::{Diagnostic, DiagnosticObserver};
pub use error::{Error, Result};
pub use format::LineFormatter;
pub use level::parse_level;
pub use logger::Logger;
pub use rotation::RotationPolicy;
pub use writer::RotatingFile;

/// Assemble a logger from `config`, writing to stderr and, if configured,
/// the rotating log file.
pub fn new_logger(config: &LoggerConfig) -> Logger {
    LogBuilder::from_config(config.clone()).build()
}

/// Start a [`LogBuilder`] from the stock configuration.
pub fn builder() -> LogBuilder {
    LogBuilder::new()
}
