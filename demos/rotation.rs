//! File logging with rotation.
//!
//! Writes into a temporary directory, rotates by hand once, and lists the
//! files left behind.

use lograft::{FormatterConfig, LoggerConfig, RotationConfig, new_logger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let log_path = temp_dir.path().join("app.log");

    let config = LoggerConfig::new()
        .with_level("debug")
        .with_file(log_path.to_string_lossy())
        .with_rotation(
            RotationConfig::new()
                .with_max_size(1)
                .with_max_backups(3)
                .with_compress(true)
                .with_rotate_at_startup(true),
        )
        .with_formatter(
            FormatterConfig::new()
                .with_trace_caller(true)
                .with_full_path_caller(false),
        );

    let logger = new_logger(&config);
    logger.with_default(|| {
        for i in 0..100 {
            tracing::info!("Log message number {}", i);
        }
    });
    logger.rotate()?;
    logger.with_default(|| tracing::info!("after manual rotation"));
    drop(logger);

    for entry in std::fs::read_dir(temp_dir.path())? {
        println!("{}", entry?.file_name().to_string_lossy());
    }

    Ok(())
}
