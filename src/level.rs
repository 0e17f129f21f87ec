use tracing_subscriber::filter::LevelFilter;

/// Parse a severity name into a level filter.
///
/// Names are case-insensitive but not trimmed. `fatal` and `panic` have no
/// counterpart in `tracing` and filter as `error`. Returns `None` for anything
/// else.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" | "fatal" | "panic" => Some(LevelFilter::ERROR),
        _ => None,
    }
}
