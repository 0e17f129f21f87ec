use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for a logger.
///
/// Field names follow the on-disk contract (`loglevel`, `logfile`,
/// `logrotation`, `logformatter`), so the same struct loads from YAML, TOML
/// or JSON. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Severity name (e.g. "trace", "debug", "info", "warn", "error")
    #[serde(rename = "loglevel")]
    pub level: String,
    /// Log file path; empty means console only
    #[serde(rename = "logfile")]
    pub file: String,
    /// Rotation of the log file
    #[serde(rename = "logrotation", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationConfig>,
    /// Line formatting options
    #[serde(rename = "logformatter", skip_serializing_if = "Option::is_none")]
    pub formatter: Option<FormatterConfig>,
}

impl LoggerConfig {
    /// Create an empty LoggerConfig (no level, console only, no sections)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the log file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Set the rotation section
    pub fn with_rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the formatter section
    pub fn with_formatter(mut self, formatter: FormatterConfig) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Log file path, if one is configured.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.file.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.file))
        }
    }

    /// Rotation section, or the all-zero section when absent.
    pub fn rotation_or_default(&self) -> RotationConfig {
        self.rotation.clone().unwrap_or_default()
    }

    /// Formatter section, or the all-false section when absent.
    pub fn formatter_or_default(&self) -> FormatterConfig {
        self.formatter.clone().unwrap_or_default()
    }
}

/// Rotation settings for the log file.
///
/// Zero values keep the usual rotator meaning: `max_size == 0` rotates at
/// 100 megabytes, `max_backups == 0` keeps every backup and `max_age == 0`
/// never removes a backup for its age.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Size in megabytes before the file is rotated
    #[serde(rename = "maxsize")]
    pub max_size: u64,
    /// Number of rotated files to keep
    #[serde(rename = "maxbackups")]
    pub max_backups: usize,
    /// Days to keep rotated files
    #[serde(rename = "maxage")]
    pub max_age: u32,
    /// Stamp backups with local time instead of UTC
    #[serde(rename = "localtime")]
    pub local_time: bool,
    /// Gzip rotated files
    pub compress: bool,
    /// Rotate once when the logger is assembled
    pub rotate_at_startup: bool,
}

impl RotationConfig {
    /// Create an all-zero rotation section
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_size = megabytes;
        self
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age = days;
        self
    }

    pub fn with_local_time(mut self, local_time: bool) -> Self {
        self.local_time = local_time;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_rotate_at_startup(mut self, rotate_at_startup: bool) -> Self {
        self.rotate_at_startup = rotate_at_startup;
        self
    }
}

/// Options for the line formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// `time` format description, e.g. "[year]-[month]-[day] [hour]:[minute]:[second]".
    /// Empty selects the default stamp.
    pub timestamp_format: String,
    /// Print `[value]` instead of `[key:value]` for fields
    pub hide_keys: bool,
    /// Print the full level name instead of its first four letters
    pub show_full_level: bool,
    /// Annotate records with their call site
    pub trace_caller: bool,
    /// Put the call site before the message instead of after it
    pub caller_first: bool,
    /// Render the call site unabridged instead of `(file:line func) ->`
    pub full_path_caller: bool,
}

impl FormatterConfig {
    /// Create an all-false formatter section
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn with_hide_keys(mut self, hide_keys: bool) -> Self {
        self.hide_keys = hide_keys;
        self
    }

    pub fn with_show_full_level(mut self, show_full_level: bool) -> Self {
        self.show_full_level = show_full_level;
        self
    }

    pub fn with_trace_caller(mut self, trace_caller: bool) -> Self {
        self.trace_caller = trace_caller;
        self
    }

    pub fn with_caller_first(mut self, caller_first: bool) -> Self {
        self.caller_first = caller_first;
        self
    }

    pub fn with_full_path_caller(mut self, full_path_caller: bool) -> Self {
        self.full_path_caller = full_path_caller;
        self
    }
}

/// Build the stock configuration, optionally logging to `file`.
///
/// Everything at trace level and above is kept. The file, when given, rotates
/// at 10 MB, once at startup, keeps 30 backups for at most 30 days and stamps
/// them with local time. Records carry a short caller annotation ahead of the
/// message, with field keys hidden.
pub fn default_config<P: Into<String>>(file: Option<P>) -> LoggerConfig {
    LoggerConfig {
        level: "trace".to_string(),
        file: file.map(Into::into).unwrap_or_default(),
        rotation: Some(RotationConfig {
            max_size: 10,
            max_backups: 30,
            max_age: 30,
            local_time: true,
            compress: false,
            rotate_at_startup: true,
        }),
        formatter: Some(FormatterConfig {
            timestamp_format: String::new(),
            hide_keys: true,
            show_full_level: false,
            trace_caller: true,
            caller_first: true,
            full_path_caller: true,
        }),
    }
}
