//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module   | Commands handled                 |
//! |----------|----------------------------------|
//! | `board`  | `Init`, `Board`, `Check`         |
//! | `floors` | `Floors`                         |
//! | `users`  | `Login`, `Users`                 |
//! | `config` | `Config`                         |

pub mod board;
pub mod config;
pub mod floors;
pub mod users;

pub use board::{cmd_board, cmd_check, cmd_init};
pub use config::cmd_config;
pub use floors::cmd_floors;
pub use users::{cmd_login, cmd_users};

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

use planify::config::{CONFIG_FILE_NAME, PlanifyConfig, PlanifyToml, default_config_path};
use planify::repository::{LoadReport, Repository};

use super::Cli;

/// `--config`, else the platform default location.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .or_else(default_config_path)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

pub fn load_toml(cli: &Cli) -> Result<PlanifyToml> {
    let path = config_path(cli);
    let toml = PlanifyToml::load_or_default(&path)?;
    for warning in toml.validate() {
        warn!(config = %path.display(), "{}", warning);
    }
    Ok(toml)
}

pub fn resolve_config(cli: &Cli) -> Result<PlanifyConfig> {
    let toml = load_toml(cli)?;
    PlanifyConfig::resolve(&toml, cli.data_dir.clone())
}

/// Open and load the repository for the resolved data directory.
pub async fn load_repository(cli: &Cli) -> Result<(Repository, LoadReport)> {
    let config = resolve_config(cli)?;
    let mut repo = Repository::open(&config).with_context(|| {
        format!(
            "Failed to open data directory {}",
            config.data_dir.display()
        )
    })?;
    let report = repo.load().await;
    if !report.locked {
        warn!("another process holds the data directory lock");
    }
    Ok((repo, report))
}

pub async fn open_repository(cli: &Cli) -> Result<Repository> {
    let (repo, _) = load_repository(cli).await?;
    Ok(repo)
}
