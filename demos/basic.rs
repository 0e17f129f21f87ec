//! Basic console logging example.
//!
//! This example demonstrates the simplest way to get a logger: the stock
//! configuration, console only, installed process-wide.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    lograft::builder().with_level("info").build().init()?;

    tracing::debug!("This is a debug message (filtered out)");
    tracing::info!("This is an info message");
    tracing::warn!(code = 7, "This is a warning message");
    tracing::error!("This is an error message");

    Ok(())
}
