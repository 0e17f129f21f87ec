//! Compact single-line text format.
//!
//! ```text
//! Jan 15 08:30:00.123 [INFO] [user:alice] signed in (src/session.rs:42 app::session::open)
//! ```
//!
//! The level is cut to four letters unless full names are requested, fields
//! print as `[key:value]` (or `[value]` with hidden keys) sorted by key, and
//! the caller annotation goes either right after the timestamp or at the end
//! of the line.

use std::fmt::{self, Write as _};

use colored::Color;
use time::format_description::{BorrowedFormatItem, OwnedFormatItem};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

use crate::caller::{CallSite, render_caller};
use crate::config::FormatterConfig;
use crate::diagnostic::Diagnostic;

/// `Jan  2 15:04:05.000`
const DEFAULT_STAMP: &[BorrowedFormatItem<'static>] = format_description!(
    "[month repr:short] [day padding:space] [hour]:[minute]:[second].[subsecond digits:3]"
);

#[derive(Debug, Clone)]
enum Timestamp {
    Default,
    Custom(OwnedFormatItem),
}

/// Renders one record per line.
#[derive(Debug, Clone)]
pub struct LineFormatter {
    timestamp: Timestamp,
    offset: UtcOffset,
    follow_local: bool,
    hide_keys: bool,
    show_full_level: bool,
    trace_caller: bool,
    caller_first: bool,
    full_path_caller: bool,
}

impl Default for LineFormatter {
    fn default() -> Self {
        Self {
            timestamp: Timestamp::Default,
            offset: local_offset(),
            follow_local: true,
            hide_keys: false,
            show_full_level: false,
            trace_caller: false,
            caller_first: false,
            full_path_caller: true,
        }
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

impl LineFormatter {
    /// Build a formatter from its configuration section.
    ///
    /// An unparsable timestamp format falls back to the default stamp; the
    /// returned diagnostic says why.
    pub fn from_config(config: &FormatterConfig) -> (Self, Option<Diagnostic>) {
        let mut diagnostic = None;
        let formatter = Self::default()
            .with_hide_keys(config.hide_keys)
            .with_show_full_level(config.show_full_level)
            .with_trace_caller(config.trace_caller)
            .with_caller_first(config.caller_first)
            .with_full_path_caller(config.full_path_caller);

        let formatter = if config.timestamp_format.is_empty() {
            formatter
        } else {
            match formatter.clone().with_timestamp_format(&config.timestamp_format) {
                Ok(custom) => custom,
                Err(reason) => {
                    diagnostic = Some(Diagnostic::InvalidTimestampFormat {
                        format: config.timestamp_format.clone(),
                        reason,
                    });
                    formatter
                }
            }
        };

        (formatter, diagnostic)
    }

    /// Use a `time` format description for timestamps.
    pub fn with_timestamp_format(mut self, format: &str) -> Result<Self, String> {
        let items = time::format_description::parse_owned::<1>(format)
            .map_err(|e| e.to_string())?;
        self.timestamp = Timestamp::Custom(items);
        Ok(self)
    }

    /// Stamp records in this fixed offset instead of the local one.
    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self.follow_local = false;
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

    fn write_timestamp(&self, writer: &mut Writer<'_>) -> fmt::Result {
        // The local offset can change under a running process (DST); the
        // lookup fails once threads are running on some platforms.
        let offset = if self.follow_local {
            UtcOffset::current_local_offset().unwrap_or(self.offset)
        } else {
            self.offset
        };
        let now = OffsetDateTime::now_utc().to_offset(offset);
        let stamp = match &self.timestamp {
            Timestamp::Default => now.format(DEFAULT_STAMP),
            Timestamp::Custom(items) => now.format(items),
        };
        // A format that cannot render this instant prints nothing.
        writer.write_str(&stamp.unwrap_or_default())
    }

    fn level_label(&self, level: &Level) -> &'static str {
        let full = match *level {
            Level::TRACE => "TRACE",
            Level::DEBUG => "DEBUG",
            Level::INFO => "INFO",
            Level::WARN => "WARN",
            Level::ERROR => "ERROR",
        };
        if self.show_full_level {
            full
        } else {
            &full[..4]
        }
    }

    /// The innermost span stands in for the function name.
    fn caller<S, N>(&self, ctx: &FmtContext<'_, S, N>, event: &Event<'_>) -> String
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
        N: for<'a> FormatFields<'a> + 'static,
    {
        let metadata = event.metadata();
        let span_name = ctx
            .event_scope()
            .and_then(|mut scope| scope.next())
            .map(|span| span.name());
        let function = match (metadata.module_path(), span_name) {
            (Some(module), Some(span)) => format!("{}::{}", module, span),
            (Some(module), None) => module.to_string(),
            (None, Some(span)) => span.to_string(),
            (None, None) => metadata.target().to_string(),
        };
        let site = CallSite::new(
            metadata.file().unwrap_or("<unknown>"),
            metadata.line().unwrap_or(0),
            &function,
        );
        render_caller(&site, self.full_path_caller)
    }
}

fn level_color(level: &Level) -> Color {
    match *level {
        Level::TRACE | Level::DEBUG => Color::White,
        Level::INFO => Color::Cyan,
        Level::WARN => Color::Yellow,
        Level::ERROR => Color::Red,
    }
}

/// Collects the message and the remaining fields of an event.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name(), format!("{:?}", value)));
        }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let caller = if self.trace_caller {
            Some(self.caller(ctx, event))
        } else {
            None
        };

        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        collector.fields.sort_by(|a, b| a.0.cmp(b.0));

        self.write_timestamp(&mut writer)?;
        if self.caller_first
            && let Some(caller) = &caller
        {
            writer.write_str(caller)?;
        }

        let level = event.metadata().level();
        let mut head = format!(" [{}] ", self.level_label(level));
        for (key, value) in &collector.fields {
            if self.hide_keys {
                write!(head, "[{}] ", value)?;
            } else {
                write!(head, "[{}:{}] ", key, value)?;
            }
        }
        // Colour follows the writer, not the terminal state of stdout.
        if writer.has_ansi_escapes() {
            let color = level_color(level).to_fg_str();
            write!(writer, "\x1b[{}m{}\x1b[0m", color, head)?;
        } else {
            writer.write_str(&head)?;
        }

        writer.write_str(&collector.message)?;
        if !self.caller_first
            && let Some(caller) = &caller
        {
            writer.write_str(caller)?;
        }
        writeln!(writer)
    }
}
