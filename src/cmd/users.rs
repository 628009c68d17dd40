//! Account commands: `planify login`, `planify users`.

use anyhow::{Context, Result, bail};

use planify::models::NewUser;

use super::super::{Cli, UsersCommands};
use super::open_repository;

pub async fn cmd_login(cli: &Cli, username: &str, password: &str) -> Result<()> {
    let mut repo = open_repository(cli).await?;

    if !repo.login(username, password).await {
        bail!("Login failed: unknown username or wrong password");
    }
    let session = repo.session();
    println!(
        "Signed in as {}{}",
        session.current_user,
        if session.is_admin { " (admin)" } else { "" }
    );
    repo.logout();
    Ok(())
}

pub async fn cmd_users(cli: &Cli, command: UsersCommands) -> Result<()> {
    let mut repo = open_repository(cli).await?;

    match command {
        UsersCommands::List => {
            println!();
            println!("{:<20} {:<6} Avatar", "Username", "Admin");
            println!("{:<20} {:<6} ------", "--------", "-----");
            for user in repo.users() {
                println!(
                    "{:<20} {:<6} {}",
                    user.username,
                    if user.is_admin { "yes" } else { "no" },
                    user.avatar.as_deref().unwrap_or("-")
                );
            }
            println!();
        }
        UsersCommands::Create {
            username,
            password,
            admin,
        } => {
            let created = repo.create_user(NewUser {
                username: username.clone(),
                password,
                is_admin: admin,
                avatar: None,
            });
            if !created {
                bail!("User '{}' already exists or the name is blank", username);
            }
            repo.save().await.context("Failed to save users")?;
            println!("Created user {}", username.trim());
        }
        UsersCommands::Remove { username } => {
            if !repo.remove_user(&username) {
                bail!("User '{}' not found", username);
            }
            repo.save().await.context("Failed to save users")?;
            println!("Removed user {}", username);
        }
    }
    Ok(())
}
