use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::{Compression, write::GzEncoder};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::config::RotationConfig;

const MEGABYTE: u64 = 1024 * 1024;
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const COMPRESS_SUFFIX: &str = ".gz";

/// Timestamp embedded in backup names, e.g. `app-2026-01-15T08-30-00.000.log`.
/// Fixed width, so lexical order is chronological order.
const BACKUP_STAMP: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]"
);
const BACKUP_STAMP_LEN: usize = 23;

/// How and when the log file is rotated, and what happens to old files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before a write would take the file past this size.
    pub max_bytes: u64,
    /// Number of backups kept; 0 keeps all.
    pub max_backups: usize,
    /// Age in days after which backups are removed; 0 never removes.
    pub max_age_days: u32,
    /// Stamp backups with local time instead of UTC.
    pub local_time: bool,
    /// Gzip backups.
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_SIZE_MB * MEGABYTE,
            max_backups: 0,
            max_age_days: 0,
            local_time: false,
            compress: false,
        }
    }
}

impl From<&RotationConfig> for RotationPolicy {
    fn from(config: &RotationConfig) -> Self {
        let megabytes = if config.max_size == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            config.max_size
        };
        Self {
            max_bytes: megabytes.saturating_mul(MEGABYTE),
            max_backups: config.max_backups,
            max_age_days: config.max_age,
            local_time: config.local_time,
            compress: config.compress,
        }
    }
}

/// A rotated file found next to the active log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    pub stamp: String,
    pub compressed: bool,
}

impl RotationPolicy {
    /// Create a size-only policy.
    pub fn size(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
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

    fn now(&self) -> OffsetDateTime {
        if self.local_time {
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
        } else {
            OffsetDateTime::now_utc()
        }
    }

    /// Pick an unused backup path for `active`, stamped with the current time
    /// and strictly later than `after`. Returns the path and its stamp.
    ///
    /// Two rotations inside the same millisecond would collide, so the stamp
    /// is advanced until neither the plain nor the compressed name exists.
    pub fn backup_path(
        &self,
        active: &Path,
        after: Option<OffsetDateTime>,
    ) -> io::Result<(PathBuf, OffsetDateTime)> {
        let mut at = self.now();
        if let Some(after) = after
            && at <= after
        {
            at = after + Duration::milliseconds(1);
        }
        loop {
            let candidate = backup_name(active, &format_stamp(at)?);
            let compressed = with_suffix(&candidate, COMPRESS_SUFFIX);
            if !candidate.exists() && !compressed.exists() {
                return Ok((candidate, at));
            }
            at += Duration::milliseconds(1);
        }
    }

    /// List backups of `active`, newest first.
    pub fn backups(&self, active: &Path) -> io::Result<Vec<Backup>> {
        let dir = match active.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (prefix, ext) = name_parts(active);

        let mut backups = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let (name_without_gz, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
                Some(stripped) => (stripped, true),
                None => (name.as_str(), false),
            };
            if let Some(stamp) = backup_stamp(name_without_gz, &prefix, &ext) {
                backups.push(Backup {
                    path: entry.path(),
                    stamp: stamp.to_string(),
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.stamp.cmp(&a.stamp));
        Ok(backups)
    }

    /// Apply the backup count, age and compression rules to the backups of
    /// `active`.
    pub fn enforce_retention(&self, active: &Path) -> io::Result<()> {
        if self.max_backups == 0 && self.max_age_days == 0 && !self.compress {
            return Ok(());
        }

        let mut remaining = self.backups(active)?;

        if self.max_backups > 0 {
            // A stamp with both a plain and a .gz file counts once.
            let mut kept = HashSet::new();
            let mut keep = Vec::new();
            for backup in remaining {
                if kept.contains(&backup.stamp) || kept.len() < self.max_backups {
                    kept.insert(backup.stamp.clone());
                    keep.push(backup);
                } else {
                    remove_if_present(&backup.path)?;
                }
            }
            remaining = keep;
        }

        if self.max_age_days > 0 {
            let cutoff = format_stamp(self.now() - Duration::days(i64::from(self.max_age_days)))?;
            let mut keep = Vec::new();
            for backup in remaining {
                if backup.stamp < cutoff {
                    remove_if_present(&backup.path)?;
                } else {
                    keep.push(backup);
                }
            }
            remaining = keep;
        }

        if self.compress {
            for backup in remaining.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }

        Ok(())
    }
}

fn format_stamp(at: OffsetDateTime) -> io::Result<String> {
    at.format(BACKUP_STAMP).map_err(io::Error::other)
}

/// Split `app.log` into the backup prefix `app-` and extension `.log`.
fn name_parts(active: &Path) -> (String, String) {
    let file_name = active
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = active
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(ext.as_str())
        .unwrap_or(&file_name)
        .to_string();
    (format!("{}-", stem), ext)
}

fn backup_name(active: &Path, stamp: &str) -> PathBuf {
    let (prefix, ext) = name_parts(active);
    active.with_file_name(format!("{}{}{}", prefix, stamp, ext))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Return the timestamp of `name` if it is a backup for `prefix`/`ext`.
fn backup_stamp<'a>(name: &'a str, prefix: &str, ext: &str) -> Option<&'a str> {
    let stamp = name.strip_prefix(prefix)?.strip_suffix(ext)?;
    if stamp.len() != BACKUP_STAMP_LEN {
        return None;
    }
    let well_formed = stamp.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 | 13 | 16 => b == b'-',
        10 => b == b'T',
        19 => b == b'.',
        _ => b.is_ascii_digit(),
    });
    well_formed.then_some(stamp)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Gzip `path` into `path.gz` and remove the original.
fn compress_file(path: &Path) -> io::Result<()> {
    let target = with_suffix(path, COMPRESS_SUFFIX);
    let mut src = File::open(path)?;
    let dst = File::create(&target)?;
    let mut encoder = GzEncoder::new(dst, Compression::default());
    io::copy(&mut src, &mut encoder)?;
    encoder.finish()?;
    fs::remove_file(path)
}
