use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;

use crate::RotationPolicy;

/// State of the current log file.
#[derive(Debug)]
struct FileState {
    /// The open file handle.
    file: File,
    /// Current size of the file in bytes.
    size: u64,
}

#[derive(Debug, Default)]
struct State {
    /// The active file, `None` until first use and briefly during rotation.
    current: Option<FileState>,
    /// Stamp of the last backup made by this writer; later backups sort after it.
    last_backup: Option<OffsetDateTime>,
}

/// A log file that rotates itself once it grows past the policy's size.
///
/// Nothing touches the disk until the first write (or an explicit
/// [`rotate`](Self::rotate)), so construction cannot fail. Clones share the
/// same file; writes and rotations are serialized by one mutex.
#[derive(Debug, Clone)]
pub struct RotatingFile {
    /// Path of the active log file.
    path: PathBuf,
    /// Size and retention rules.
    policy: RotationPolicy,
    /// Current file state, protected by mutex.
    state: Arc<Mutex<State>>,
}

impl RotatingFile {
    /// Create a rotating file at `path`. The file is opened lazily.
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Move the active file aside as a timestamped backup and start a new one.
    pub fn rotate(&self) -> io::Result<()> {
        let mut guard = self.lock();
        self.rotate_locked(&mut guard)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic mid-write leaves the file usable; keep logging.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_parent(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn open_append(&self) -> io::Result<FileState> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(FileState { file, size })
    }

    /// Open the existing file if the next write fits, otherwise rotate.
    fn open_existing_or_new(&self, state: &mut State, buf_len: u64) -> io::Result<()> {
        self.ensure_parent()?;
        match std::fs::metadata(&self.path) {
            Ok(metadata) if metadata.len() + buf_len >= self.policy.max_bytes => {
                self.rotate_locked(state)
            }
            Ok(_) => {
                state.current = Some(self.open_append()?);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                state.current = Some(self.open_append()?);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn rotate_locked(&self, state: &mut State) -> io::Result<()> {
        // Close current file (drop it)
        state.current = None;
        self.ensure_parent()?;

        if self.path.exists() {
            let (backup, stamped) = self.policy.backup_path(&self.path, state.last_backup)?;
            std::fs::rename(&self.path, &backup)?;
            state.last_backup = Some(stamped);
        }
        state.current = Some(self.open_append()?);

        // Losing a backup cleanup must not stop the log itself.
        let _ = self.policy.enforce_retention(&self.path);
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.policy.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {} exceeds maximum file size {}",
                    len, self.policy.max_bytes
                ),
            ));
        }

        let mut guard = self.lock();
        match guard.current.as_ref().map(|current| current.size) {
            None => self.open_existing_or_new(&mut guard, len)?,
            Some(size) if size + len > self.policy.max_bytes => self.rotate_locked(&mut guard)?,
            Some(_) => {}
        }

        match guard.current.as_mut() {
            Some(state) => {
                let written = state.file.write(buf)?;
                state.size += written as u64;
                Ok(written)
            }
            None => Err(io::Error::other("Failed to open log file")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock().current.as_mut() {
            Some(state) => state.file.flush(),
            None => Ok(()),
        }
    }
}
