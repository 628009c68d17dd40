//! Named advisory lock shared by every process using the same data directory.
//!
//! Backed by an exclusive `flock`-style lock on `<dir>/.<name>.lock`. Two
//! handles contend even inside one process, since each acquisition opens its
//! own file description.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct ProcessLock {
    path: PathBuf,
}

impl ProcessLock {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!(".{}.lock", name)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait up to `timeout` for the lock. Never fails loudly: any I/O error or
    /// timeout yields `None`.
    pub async fn try_acquire(&self, timeout: Duration) -> Option<LockGuard> {
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to open lock file");
                return None;
            }
        };

        let deadline = Instant::now() + timeout;
        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => {
                    debug!(path = %self.path.display(), "lock acquired");
                    return Some(LockGuard { file: Some(file) });
                }
                Err(_) if Instant::now() < deadline => tokio::time::sleep(POLL_INTERVAL).await,
                Err(e) => {
                    debug!(path = %self.path.display(), error = %e, "lock wait timed out");
                    return None;
                }
            }
        }
    }
}

/// Held lock. Released on `release()` or drop; release errors are ignored.
#[derive(Debug)]
pub struct LockGuard {
    file: Option<File>,
}

impl LockGuard {
    pub fn release(mut self) {
        self.unlock();
    }

    fn unlock(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.unlock();
    }
}
