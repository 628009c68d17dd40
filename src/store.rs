//! Named JSON documents in a data directory.
//!
//! Each document is `<root>/<name>.json`, written pretty-printed. Writes
//! overwrite in place; a crash mid-write can truncate the document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::StoreError;

pub const CARDS: &str = "cards";
pub const FLOORS: &str = "floors";
pub const LANES: &str = "lanes";
pub const USERS: &str = "users";

#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Open the store, creating the root directory if needed.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root).map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    pub async fn save<T: Serialize + ?Sized>(
        &self,
        name: &str,
        data: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data).map_err(|source| StoreError::Serialize {
            name: name.to_string(),
            source,
        })?;
        let path = self.path_for(name);
        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StoreError::Io { path, source })?;
        debug!(document = name, "saved document");
        Ok(())
    }

    /// Load a document. `Ok(None)` means the document does not exist.
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.path_for(name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let value = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            name: name.to_string(),
            source,
        })?;
        Ok(Some(value))
    }
}
