use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use super::AuditEntry;

/// Writes audit entries to a text file. Best-effort: failures are logged
/// and never reach the caller.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, user: &str, action: &str, details: &str) {
        let entry = AuditEntry::new(user, action, details);
        if let Err(e) = self.append(&entry) {
            warn!(path = %self.path.display(), error = %e, "audit write failed");
        }
    }

    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create audit directory")?;
        }
        let mut line = entry.to_line();
        line.push('\n');
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open audit log")?
            .write_all(line.as_bytes())
            .context("Failed to write audit entry")?;
        Ok(())
    }
}
