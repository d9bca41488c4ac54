//! Advisory lock serializing administrative theme operations.
//!
//! The services themselves do no locking; the CLI holds this lock around
//! every mutating command so two invocations cannot race on the same theme
//! directory or export staging area.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BcError, Result};

/// Held lock; released on drop.
pub struct GlobalLock {
    lock_file: File,
    lock_path: PathBuf,
}

/// Who holds the lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
    pub hostname: String,
}

impl GlobalLock {
    const LOCK_FILENAME: &'static str = "bctheme.lock";

    /// Try to acquire lock without blocking
    pub fn try_acquire(root: &Path) -> io::Result<Option<Self>> {
        let lock_path = root.join(Self::LOCK_FILENAME);

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            let fd = lock_file.as_raw_fd();
            #[allow(unsafe_code)]
            let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
            if result != 0 {
                let err = io::Error::last_os_error();
                if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                    return Ok(None);
                }
                return Err(err);
            }
        }

        Self::write_lock_info(&lock_file)?;

        Ok(Some(Self {
            lock_file,
            lock_path,
        }))
    }

    /// Acquire with timeout (polling)
    pub fn acquire_timeout(root: &Path, timeout: Duration) -> Result<Self> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(50);

        loop {
            if let Some(lock) = Self::try_acquire(root)? {
                return Ok(lock);
            }
            if start.elapsed() >= timeout {
                let holder = Self::read_lock_info(root)
                    .ok()
                    .flatten()
                    .map(|info| format!(" (held by pid {} on {})", info.pid, info.hostname))
                    .unwrap_or_default();
                return Err(BcError::LockTimeout(format!(
                    "waited {}ms for {}{holder}",
                    timeout.as_millis(),
                    root.join(Self::LOCK_FILENAME).display()
                )));
            }
            std::thread::sleep(poll_interval);
        }
    }

    fn write_lock_info(file: &File) -> io::Result<()> {
        use std::io::Write;

        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: Utc::now(),
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        };

        let mut file = file;
        file.set_len(0)?;
        let json = serde_json::to_string_pretty(&info).unwrap_or_default();
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }

    pub fn read_lock_info(root: &Path) -> io::Result<Option<LockInfo>> {
        let lock_path = root.join(Self::LOCK_FILENAME);
        if !lock_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&lock_path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str(&content).ok())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for GlobalLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            let fd = self.lock_file.as_raw_fd();
            #[allow(unsafe_code)]
            unsafe {
                libc::flock(fd, libc::LOCK_UN);
            }
        }
    }
}
