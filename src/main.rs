use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd;

#[derive(Parser)]
#[command(name = "planify")]
#[command(version, about = "Workstation asset tracking over a local data directory")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding cards.json, lanes.json, floors.json and users.json.
    /// Overrides PLANIFY_DATA_DIR and planify.toml.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to planify.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and write any missing documents from seed data
    Init,
    /// Print every lane with its cards
    Board,
    /// Print floor plans with their tables and seats
    Floors,
    /// Check whether a card may move to "in use"
    Check {
        card_id: String,
        /// Floor level to check the locater against (defaults to the first floor's level)
        #[arg(long)]
        level: Option<i32>,
    },
    /// Verify a username and password against the stored accounts
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum UsersCommands {
    /// List all accounts
    List,
    /// Create an account
    Create {
        username: String,
        #[arg(long)]
        password: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },
    /// Remove an account
    Remove { username: String },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default planify.toml
    Init,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "planify=debug" } else { "planify=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Init => cmd::cmd_init(&cli).await?,
        Commands::Board => cmd::cmd_board(&cli).await?,
        Commands::Floors => cmd::cmd_floors(&cli).await?,
        Commands::Check { card_id, level } => cmd::cmd_check(&cli, card_id, *level).await?,
        Commands::Login { username, password } => cmd::cmd_login(&cli, username, password).await?,
        Commands::Users { command } => cmd::cmd_users(&cli, command.clone()).await?,
        Commands::Config { command } => cmd::cmd_config(&cli, command.clone())?,
    }

    Ok(())
}
