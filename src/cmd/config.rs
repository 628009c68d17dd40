//! Configuration view and validation commands: `planify config`.

use anyhow::Result;

use planify::config::PlanifyToml;

use super::super::{Cli, ConfigCommands};
use super::{config_path, resolve_config};

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    let path = config_path(cli);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            if path.exists() {
                println!("Config file: {}", path.display());
            } else {
                println!("No planify.toml found at {}; using defaults.", path.display());
            }
            let config = resolve_config(cli)?;
            println!();
            println!("  data_dir          = {}", config.data_dir.display());
            println!("  lock.name         = {}", config.lock_name);
            println!("  lock.timeout_ms   = {}", config.lock_timeout.as_millis());
            println!("  audit file        = {}", config.audit_file.display());
            println!("  admin_username    = {}", config.auth.admin_username);
            println!("  pbkdf2_iterations = {}", config.auth.pbkdf2_iterations);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            if !path.exists() {
                println!("No planify.toml found. Using defaults (valid).");
                return Ok(());
            }
            let warnings = PlanifyToml::load(&path)?.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if path.exists() {
                println!("planify.toml already exists at {}", path.display());
                return Ok(());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            PlanifyToml::default().save(&path)?;
            println!("Created {}", path.display());
        }
    }
    Ok(())
}
