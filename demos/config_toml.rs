//! Example of loading logging configuration from TOML.
//!
//! Run with:
//! ```bash
//! cargo run --example config_toml
//! ```

use serde::Deserialize;

#[derive(Deserialize)]
struct Config {
    log: lograft::LoggerConfig,
}

const CONFIG: &str = r#"
[log]
loglevel = "loud"

[log.logformatter]
timestamp_format = "[year]-[month]-[day] [hour]:[minute]:[second]"
hide_keys = true
trace_caller = true
caller_first = true
full_path_caller = true
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root: Config = toml::from_str(CONFIG)?;

    // "loud" is not a level: the logger falls back to trace and says so.
    let logger = lograft::LogBuilder::from_config(root.log)
        .on_diagnostic(|d| eprintln!("logging: {}", d))
        .build();

    logger.with_default(|| {
        tracing::trace!("This is a trace message");
        tracing::info!(user = "bob", duration_ms = 1234, "User session ended");
        tracing::error!(error_type = "database", "Database error occurred");
    });

    Ok(())
}
