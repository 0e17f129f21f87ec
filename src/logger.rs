use std::path::Path;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::Dispatch;
use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;

use crate::{Error, Result, RotatingFile};

/// Keeps the file worker of the globally installed logger alive.
static LOG_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// An assembled logger.
///
/// Records are emitted with the `tracing` macros while this logger is the
/// active dispatcher, see [`with_default`](Self::with_default),
/// [`set_default`](Self::set_default) and [`init`](Self::init).
///
/// Dropping the logger flushes records still queued for the log file.
#[derive(Debug)]
pub struct Logger {
    dispatch: Dispatch,
    level: LevelFilter,
    file: Option<RotatingFile>,
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub(crate) fn new(
        dispatch: Dispatch,
        level: LevelFilter,
        file: Option<RotatingFile>,
        guard: Option<WorkerGuard>,
    ) -> Self {
        Self {
            dispatch,
            level,
            file,
            guard,
        }
    }

    /// The dispatcher records are routed through.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The effective severity threshold.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Path of the active log file, if file output is configured.
    pub fn log_file(&self) -> Option<&Path> {
        self.file.as_ref().map(RotatingFile::path)
    }

    /// Run `f` with this logger as the current thread's dispatcher.
    pub fn with_default<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the current thread's dispatcher until the guard drops.
    pub fn set_default(&self) -> DefaultGuard {
        tracing::dispatcher::set_default(&self.dispatch)
    }

    /// Rotate the log file now, e.g. on SIGHUP.
    ///
    /// # Errors
    ///
    /// Returns an error if no log file is configured or the rename fails.
    pub fn rotate(&self) -> Result<()> {
        match &self.file {
            Some(file) => file.rotate().map_err(Error::Io),
            None => Err(Error::Config("no log file configured".to_string())),
        }
    }

    /// Install this logger as the process-wide dispatcher.
    ///
    /// The file worker then lives until the process exits.
    ///
    /// # Errors
    ///
    /// Returns an error if a global dispatcher is already set.
    pub fn init(mut self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|e| Error::Init(e.to_string()))?;
        if let Some(guard) = self.guard.take() {
            *LOG_GUARD
                .lock()
                .map_err(|e| Error::Init(e.to_string()))? = Some(guard);
        }
        Ok(())
    }
}
