//! Assembly of a [`Logger`] from a [`LoggerConfig`].
//!
//! # Example
//!
//! ```rust,no_run
//! use lograft::{LogBuilder, default_config};
//!
//! let logger = LogBuilder::from_config(default_config(Some("logs/app.log")))
//!     .on_diagnostic(|d| eprintln!("logging: {}", d))
//!     .build();
//!
//! logger.with_default(|| tracing::info!("ready"));
//! ```

use std::sync::Arc;

use tracing::Dispatch;
use tracing_appender::non_blocking::NonBlockingBuilder;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::layer::SubscriberExt;

use crate::diagnostic::{Diagnostic, DiagnosticObserver, report};
use crate::format::LineFormatter;
use crate::level::parse_level;
use crate::{Logger, LoggerConfig, RotatingFile, RotationPolicy, default_config};

/// A builder for assembling a logger.
///
/// Assembly cannot fail: an unknown level, an unparsable timestamp format or
/// a failed startup rotation degrade to defaults and are reported to the
/// diagnostic observer, if one is set.
pub struct LogBuilder {
    config: LoggerConfig,
    console: Option<BoxMakeWriter>,
    observer: Option<DiagnosticObserver>,
}

impl LogBuilder {
    /// Create a LogBuilder with the stock configuration (console only).
    pub fn new() -> Self {
        Self::from_config(default_config(None::<String>))
    }

    /// Create a LogBuilder from an existing configuration.
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
            observer: None,
        }
    }

    /// Set the log level (e.g., "trace", "debug", "info", "warn", "error").
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Also write to a rotating file at `path`.
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.config.file = path.into();
        self
    }

    /// Replace stderr as the console destination.
    pub fn with_console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = Some(BoxMakeWriter::new(writer));
        self
    }

    /// Receive a [`Diagnostic`] for every fault assembly recovers from.
    pub fn on_diagnostic<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Diagnostic) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// The configuration that [`build`](Self::build) will assemble.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Assemble the logger.
    pub fn build(self) -> Logger {
        let observer = self.observer.as_ref();
        let config = &self.config;

        let level = parse_level(&config.level).unwrap_or_else(|| {
            report(
                observer,
                Diagnostic::UnknownLevel {
                    given: config.level.clone(),
                },
            );
            LevelFilter::TRACE
        });

        // Caller capture and the short annotation both ride on the formatter.
        let (formatter, timestamp_fault) = LineFormatter::from_config(&config.formatter_or_default());
        if let Some(diagnostic) = timestamp_fault {
            report(observer, diagnostic);
        }

        let mut destinations = self
            .console
            .unwrap_or_else(|| BoxMakeWriter::new(std::io::stderr));
        let mut ansi = true;
        let mut file = None;
        let mut guard = None;

        if let Some(path) = config.file_path() {
            // Escape codes would end up in the file.
            ansi = false;

            let rotation = config.rotation_or_default();
            let sink = RotatingFile::new(&path, RotationPolicy::from(&rotation));
            if rotation.rotate_at_startup
                && let Err(e) = sink.rotate()
            {
                report(
                    observer,
                    Diagnostic::StartupRotationFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    },
                );
            }

            let (non_blocking, worker) = NonBlockingBuilder::default()
                .lossy(false)
                .thread_name("lograft-file")
                .finish(sink.clone());
            destinations = BoxMakeWriter::new(destinations.and(non_blocking));
            file = Some(sink);
            guard = Some(worker);
        }

        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .parse_lossy("");
        let layer = tracing_subscriber::fmt::layer()
            .event_format(formatter)
            .with_writer(destinations)
            .with_ansi(ansi);
        let subscriber = tracing_subscriber::registry().with(filter).with(layer);

        Logger::new(Dispatch::new(subscriber), level, file, guard)
    }
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuilder")
            .field("config", &self.config)
            .field("custom_console", &self.console.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
