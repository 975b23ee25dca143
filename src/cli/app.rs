//! Main CLI application structure

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{auth, config_cmd, projects, tags, tasks};
use crate::auth::TokenStore;
use crate::backend::TickTickClient;
use crate::config::Config;
use crate::logger;

#[derive(Parser)]
#[command(name = "ticky")]
#[command(
    version,
    about = "TickTick CLI tool",
    long_about = "ticky - A CLI tool for TickTick task management. Designed for both human use and AI agent integration."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true, conflicts_with = "plain")]
    pub json: bool,

    /// Output in TSV format
    #[arg(long, global = true)]
    pub plain: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authentication commands
    #[command(subcommand)]
    Auth(auth::AuthCommands),

    /// Project operations
    #[command(subcommand)]
    Projects(projects::ProjectCommands),

    /// Task operations
    #[command(subcommand)]
    Tasks(tasks::TaskCommands),

    /// Tag operations
    #[command(subcommand)]
    Tags(tags::TagCommands),

    /// Inspect or create the settings file
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Everything a command needs besides its own arguments.
pub struct AppContext {
    pub config: Config,
    pub store: TokenStore,
    pub output: Output,
}

impl AppContext {
    /// Authenticated API client; refreshes an expired stored token first.
    pub async fn client(&self) -> Result<TickTickClient> {
        Ok(TickTickClient::connect(&self.config, &self.store).await?)
    }
}

/// Parses arguments and runs the selected command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = Config::get_config_dir()?;
    let config = Config::load()?;
    logger::init(&config.logging, cli.verbose, &config_dir)?;

    let ctx = AppContext {
        config,
        store: TokenStore::new(config_dir),
        output: Output::new(OutputFormat::from_flags(cli.json, cli.plain)),
    };

    match cli.command {
        Commands::Auth(cmd) => auth::run(cmd, &ctx).await,
        Commands::Projects(cmd) => projects::run(cmd, &ctx).await,
        Commands::Tasks(cmd) => tasks::run(cmd, &ctx).await,
        Commands::Tags(cmd) => tags::run(cmd, &ctx).await,
        Commands::Config(cmd) => config_cmd::run(cmd, &ctx),
    }
}
