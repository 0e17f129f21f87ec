use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use lograft::{
    Diagnostic, FormatterConfig, LogBuilder, Logger, LoggerConfig, RotationConfig,
    default_config,
};
use tracing_subscriber::fmt::MakeWriter;

/// In-memory console.
#[derive(Clone, Default)]
struct Console(Arc<Mutex<Vec<u8>>>);

impl Console {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Console {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Console {
    type Writer = Console;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn build(config: LoggerConfig, console: &Console) -> Logger {
    LogBuilder::from_config(config)
        .with_console_writer(console.clone())
        .build()
}

fn emit_all_levels(logger: &Logger) {
    logger.with_default(|| {
        tracing::trace!("msg-trace");
        tracing::debug!("msg-debug");
        tracing::info!("msg-info");
        tracing::warn!("msg-warn");
        tracing::error!("msg-error");
    });
}

fn seen_levels(output: &str) -> Vec<&'static str> {
    ["trace", "debug", "info", "warn", "error"]
        .into_iter()
        .filter(|name| output.contains(&format!("msg-{}", name)))
        .collect()
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_level_threshold_filters_records() {
    let cases: [(&str, &[&str]); 6] = [
        ("trace", &["trace", "debug", "info", "warn", "error"]),
        ("debug", &["debug", "info", "warn", "error"]),
        ("info", &["info", "warn", "error"]),
        ("warn", &["warn", "error"]),
        ("error", &["error"]),
        ("fatal", &["error"]),
    ];

    for (level, expected) in cases {
        let console = Console::default();
        let logger = build(LoggerConfig::new().with_level(level), &console);
        emit_all_levels(&logger);
        assert_eq!(seen_levels(&console.contents()), expected, "level {}", level);
    }
}

#[test]
fn test_unknown_level_matches_trace() {
    let reference = Console::default();
    emit_all_levels(&build(LoggerConfig::new().with_level("trace"), &reference));

    let console = Console::default();
    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&diagnostics);
    let logger = LogBuilder::from_config(LoggerConfig::new().with_level("chatty"))
        .with_console_writer(console.clone())
        .on_diagnostic(move |d| sink.lock().unwrap().push(d.clone()))
        .build();
    emit_all_levels(&logger);

    assert_eq!(
        seen_levels(&console.contents()),
        seen_levels(&reference.contents())
    );
    assert_eq!(
        *diagnostics.lock().unwrap(),
        vec![Diagnostic::UnknownLevel {
            given: "chatty".to_string()
        }]
    );
}

#[test]
fn test_console_only_writes_no_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let console = Console::default();
    let logger = build(default_config(None::<String>), &console);

    logger.with_default(|| tracing::info!("console-only"));
    drop(logger);

    assert!(console.contents().contains("console-only"));
    assert!(dir_entries(dir.path()).is_empty());
}

#[test]
fn test_file_receives_every_console_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let console = Console::default();

    let config = LoggerConfig::new()
        .with_level("debug")
        .with_file(path.to_string_lossy())
        .with_formatter(
            FormatterConfig::new()
                .with_trace_caller(true)
                .with_full_path_caller(false),
        );
    let logger = build(config, &console);
    assert_eq!(logger.log_file(), Some(path.as_path()));

    logger.with_default(|| {
        tracing::trace!("dropped");
        tracing::debug!(user = "alice", "first");
        tracing::warn!("second");
    });
    drop(logger);

    let on_console = console.contents();
    let in_file = std::fs::read_to_string(&path).expect("read log file");
    assert_eq!(on_console, in_file);
    assert_eq!(in_file.lines().count(), 2);
    assert!(in_file.contains("[DEBU] [user:alice] first"), "{}", in_file);
    assert!(in_file.contains("(logging_file_tests.rs:"), "{}", in_file);
    assert!(!in_file.contains("dropped"));
    assert!(!in_file.contains('\x1b'), "ANSI escape found in log file");
}

#[test]
fn test_rotate_at_startup_moves_old_content_aside() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    std::fs::write(&path, "old content\n").expect("seed log");

    let config = default_config(Some(path.to_string_lossy()));
    let logger = build(config, &Console::default());

    // Rotation happened during assembly, before any record.
    let names = dir_entries(dir.path());
    assert_eq!(names.len(), 2, "{:?}", names);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    let backup = names
        .iter()
        .find(|n| n.starts_with("app-") && n.ends_with(".log"))
        .expect("backup file");
    assert_eq!(
        std::fs::read_to_string(dir.path().join(backup)).unwrap(),
        "old content\n"
    );

    logger.with_default(|| tracing::info!("fresh record"));
    drop(logger);

    assert_eq!(dir_entries(dir.path()).len(), 2);
    let active = std::fs::read_to_string(&path).unwrap();
    assert!(active.contains("fresh record"));
    assert!(!active.contains("old content"));
}

#[test]
fn test_no_startup_rotation_appends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    std::fs::write(&path, "old content\n").expect("seed log");

    let config = LoggerConfig::new()
        .with_level("info")
        .with_file(path.to_string_lossy())
        .with_rotation(RotationConfig::new().with_max_size(1));
    let logger = build(config, &Console::default());

    logger.with_default(|| tracing::info!("appended record"));
    drop(logger);

    assert_eq!(dir_entries(dir.path()), vec!["app.log"]);
    let active = std::fs::read_to_string(&path).unwrap();
    assert!(active.starts_with("old content\n"));
    assert!(active.contains("appended record"));
}

#[test]
fn test_startup_rotation_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().expect("tempdir");
    // The parent of the log path is a regular file, so nothing can be created.
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").expect("create blocker");
    let path = blocker.join("app.log");

    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&diagnostics);
    let logger = LogBuilder::from_config(default_config(Some(path.to_string_lossy())))
        .with_console_writer(std::io::sink)
        .on_diagnostic(move |d| sink.lock().unwrap().push(d.clone()))
        .build();

    logger.with_default(|| tracing::info!("still alive"));
    drop(logger);

    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::StartupRotationFailed { path: p, .. } if p == &path
    ));
}

#[test]
fn test_bad_timestamp_format_falls_back_and_is_reported() {
    let console = Console::default();
    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&diagnostics);
    let config = LoggerConfig::new()
        .with_level("info")
        .with_formatter(FormatterConfig::new().with_timestamp_format("[bogus"));
    let logger = LogBuilder::from_config(config)
        .with_console_writer(console.clone())
        .on_diagnostic(move |d| sink.lock().unwrap().push(d.clone()))
        .build();
    logger.with_default(|| tracing::info!("stamped"));

    let diagnostics = diagnostics.lock().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::InvalidTimestampFormat { format, .. } if format == "[bogus"
    ));

    // Default stamp "Jan  2 15:04:05.000", then the coloured level.
    let out = console.contents();
    let stamp = out.split('\x1b').next().expect("stamp");
    assert_eq!(stamp.len(), 19, "{:?}", out);
    assert_eq!(&stamp[3..4], " ");
    assert_eq!(&stamp[15..16], ".");
    assert!(out.ends_with("stamped\n"), "{:?}", out);
}

#[test]
fn test_custom_timestamp_format_is_used() {
    let console = Console::default();
    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&diagnostics);
    let config = LoggerConfig::new()
        .with_level("info")
        .with_formatter(FormatterConfig::new().with_timestamp_format("[year]"));
    let logger = LogBuilder::from_config(config)
        .with_console_writer(console.clone())
        .on_diagnostic(move |d| sink.lock().unwrap().push(d.clone()))
        .build();
    logger.with_default(|| tracing::info!("yearly"));

    assert!(diagnostics.lock().unwrap().is_empty());
    let out = console.contents();
    let (year, rest) = out.split_at(4);
    assert!(year.chars().all(|c| c.is_ascii_digit()), "{:?}", out);
    assert_eq!(rest, "\x1b[36m [INFO] \x1b[0myearly\n");
}

#[test]
fn test_concurrent_logging_across_rotations() {
    const THREADS: usize = 8;
    const RECORDS: usize = 500;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("app.log");
    let config = LoggerConfig::new()
        .with_level("info")
        .with_file(path.to_string_lossy())
        .with_formatter(FormatterConfig::new().with_hide_keys(true));
    let logger = LogBuilder::from_config(config)
        .with_console_writer(std::io::sink)
        .build();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let dispatch = logger.dispatch().clone();
            std::thread::spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    for i in 0..RECORDS {
                        tracing::info!(thread = t, seq = i, "payload-end");
                    }
                })
            })
        })
        .collect();
    for _ in 0..5 {
        logger.rotate().expect("manual rotation");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    for handle in handles {
        handle.join().expect("logging thread");
    }
    drop(logger);

    let mut total = 0;
    for name in dir_entries(dir.path()) {
        let content = std::fs::read_to_string(dir.path().join(&name)).expect("read log");
        for line in content.lines() {
            assert!(line.ends_with(" payload-end"), "torn record in {}: {:?}", name, line);
            total += 1;
        }
    }
    assert_eq!(total, THREADS * RECORDS);
    assert!(dir_entries(dir.path()).len() > 1);
}

#[test]
fn test_config_formats_share_wire_keys() {
    let yaml = r#"
loglevel: warn
logfile: /tmp/app.log
logrotation:
  maxsize: 5
  maxbackups: 2
  rotate_at_startup: true
logformatter:
  hide_keys: true
  trace_caller: true
"#;
    let toml_src = r#"
loglevel = "warn"
logfile = "/tmp/app.log"

[logrotation]
maxsize = 5
maxbackups = 2
rotate_at_startup = true

[logformatter]
hide_keys = true
trace_caller = true
"#;
    let json = r#"{
        "loglevel": "warn",
        "logfile": "/tmp/app.log",
        "logrotation": {"maxsize": 5, "maxbackups": 2, "rotate_at_startup": true},
        "logformatter": {"hide_keys": true, "trace_caller": true}
    }"#;

    let expected = LoggerConfig::new()
        .with_level("warn")
        .with_file("/tmp/app.log")
        .with_rotation(
            RotationConfig::new()
                .with_max_size(5)
                .with_max_backups(2)
                .with_rotate_at_startup(true),
        )
        .with_formatter(
            FormatterConfig::new()
                .with_hide_keys(true)
                .with_trace_caller(true),
        );

    let from_yaml: LoggerConfig = serde_yaml::from_str(yaml).expect("yaml");
    let from_toml: LoggerConfig = toml::from_str(toml_src).expect("toml");
    let from_json: LoggerConfig = serde_json::from_str(json).expect("json");
    assert_eq!(from_yaml, expected);
    assert_eq!(from_toml, expected);
    assert_eq!(from_json, expected);
}
