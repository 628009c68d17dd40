//! Configuration read from `planify.toml`.
//!
//! Every section is optional:
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/planify"
//!
//! [lock]
//! name = "repo"
//! timeout_ms = 1000
//!
//! [audit]
//! file_name = "audit.log"
//!
//! [auth]
//! admin_username = "admin"
//! admin_password = "admin"
//! pbkdf2_iterations = 100000
//! ```
//!
//! Layering is file → environment (`PLANIFY_DATA_DIR`) → CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_PBKDF2_ITERATIONS;
use crate::lock::DEFAULT_LOCK_TIMEOUT;

pub const CONFIG_FILE_NAME: &str = "planify.toml";
pub const DATA_DIR_ENV: &str = "PLANIFY_DATA_DIR";
const APP_DIR_NAME: &str = "Planify";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    /// Directory holding the JSON documents (default: platform data dir + `Planify`)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSection {
    #[serde(default = "default_lock_name")]
    pub name: String,
    /// Bounded wait before proceeding without the lock
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_lock_name() -> String {
    "repo".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT.as_millis() as u64
}

impl Default for LockSection {
    fn default() -> Self {
        Self {
            name: default_lock_name(),
            timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSection {
    #[serde(default = "default_audit_file_name")]
    pub file_name: String,
}

fn default_audit_file_name() -> String {
    "audit.log".to_string()
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            file_name: default_audit_file_name(),
        }
    }
}

/// Settings for the built-in administrator and credential hashing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSection {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin".to_string()
}

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_PBKDF2_ITERATIONS
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
        }
    }
}

/// The complete planify.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanifyToml {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub lock: LockSection,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub auth: AuthSection,
}

impl PlanifyToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse planify.toml")
    }

    /// Load `path` if it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize planify.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.lock.timeout_ms == 0 {
            warnings.push(
                "lock.timeout_ms is 0: load and save will rarely hold the process lock".to_string(),
            );
        }
        if self.lock.name.trim().is_empty() {
            warnings.push("lock.name is empty".to_string());
        }
        if self.auth.admin_username.trim().is_empty() {
            warnings.push("auth.admin_username is empty: nobody can sign in".to_string());
        }
        if self.auth.pbkdf2_iterations < 10_000 {
            warnings.push(format!(
                "auth.pbkdf2_iterations = {} is weak; use at least 10000",
                self.auth.pbkdf2_iterations
            ));
        }
        warnings
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct PlanifyConfig {
    pub data_dir: PathBuf,
    pub lock_name: String,
    pub lock_timeout: Duration,
    pub audit_file: PathBuf,
    pub auth: AuthSection,
}

impl PlanifyConfig {
    /// Resolve from a parsed file, the environment, and an optional CLI override.
    pub fn resolve(toml: &PlanifyToml, cli_data_dir: Option<PathBuf>) -> Result<Self> {
        let env_data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        Self::resolve_with(toml, env_data_dir, cli_data_dir)
    }

    fn resolve_with(
        toml: &PlanifyToml,
        env_data_dir: Option<PathBuf>,
        cli_data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let data_dir = match cli_data_dir
            .or(env_data_dir)
            .or_else(|| toml.storage.data_dir.clone())
        {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Self::for_data_dir(&data_dir, toml))
    }

    /// Configuration rooted at an explicit data directory.
    pub fn for_data_dir(data_dir: &Path, toml: &PlanifyToml) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            lock_name: toml.lock.name.clone(),
            lock_timeout: Duration::from_millis(toml.lock.timeout_ms),
            audit_file: data_dir.join(&toml.audit.file_name),
            auth: toml.auth.clone(),
        }
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .ok_or_else(|| anyhow::anyhow!("Could not determine the platform data directory"))
}

/// Default location of `planify.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
