//! Example of loading logging configuration from YAML.
//!
//! Run with:
//! ```bash
//! cargo run --example config_yaml
//! ```

use std::collections::HashMap;

const CONFIG: &str = r#"
log:
  loglevel: debug
  logformatter:
    hide_keys: false
    show_full_level: true
    trace_caller: true
    caller_first: false
    full_path_caller: false
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse the YAML configuration
    let root: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(CONFIG)?;
    let config: lograft::LoggerConfig = serde_yaml::from_value(root["log"].clone())?;

    let logger = lograft::LogBuilder::from_config(config)
        .on_diagnostic(|d| eprintln!("logging: {}", d))
        .build();

    logger.with_default(|| {
        tracing::trace!("This is a trace message (filtered out)");
        tracing::debug!("This is a debug message");
        tracing::info!(user = "alice", action = "login", "User performed an action");
        tracing::warn!(error_code = 404, path = "/api/users", "Resource not found");
    });

    Ok(())
}
