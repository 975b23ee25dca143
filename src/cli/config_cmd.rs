//! Settings file CLI commands

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use super::app::AppContext;
use super::output::OutputFormat;
use crate::config::Config;
use crate::constants::{CONFIG_GENERATED, SETTINGS_FILE};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show where ticky keeps its files
    Path,

    /// Write a default config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(cmd: ConfigCommands, ctx: &AppContext) -> Result<()> {
    let dir = ctx.store.dir();
    let settings = dir.join(SETTINGS_FILE);
    let out = &ctx.output;

    match cmd {
        ConfigCommands::Path => match out.format() {
            OutputFormat::Json => out.json(&json!({
                "config_dir": dir,
                "settings": settings,
                "token": ctx.store.token_path(),
                "inbox_cache": ctx.store.inbox_cache_path(),
            }))?,
            OutputFormat::Plain | OutputFormat::Text => out.line(dir.display()),
        },
        ConfigCommands::Init { force } => {
            if settings.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", settings.display());
            }
            Config::generate_default_config(&settings)?;
            match out.format() {
                OutputFormat::Json => out.json(&json!({ "status": "created", "path": settings }))?,
                OutputFormat::Plain => out.line(settings.display()),
                OutputFormat::Text => out.line(format!("{}: {}", CONFIG_GENERATED, settings.display())),
            }
        }
    }
    Ok(())
}
