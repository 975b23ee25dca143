//! Authentication CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;

use super::app::AppContext;
use super::output::OutputFormat;
use crate::auth::{ClientCredentials, OAuthClient};
use crate::backend::Backend;
use crate::constants::{MSG_LOGIN_SUCCESS, MSG_LOGOUT_SUCCESS, MSG_NOT_AUTHENTICATED};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login to TickTick via OAuth
    Login,

    /// Show authentication status
    Status,

    /// Remove saved authentication token
    Logout,
}

pub async fn run(cmd: AuthCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        AuthCommands::Login => login(ctx).await,
        AuthCommands::Status => status(ctx).await,
        AuthCommands::Logout => logout(ctx),
    }
}

async fn login(ctx: &AppContext) -> Result<()> {
    let credentials = ClientCredentials::from_env().context("login failed")?;
    let oauth = OAuthClient::new(ctx.config.oauth.clone(), credentials, ctx.config.api.timeout())?;

    let token = oauth
        .login(|url| {
            eprintln!("Opening browser for authentication...");
            eprintln!("If the browser doesn't open, visit:\n{}", url);
        })
        .await
        .context("login failed")?;

    ctx.store.save(&token).context("failed to save token")?;

    let token_path = ctx.store.token_path();
    let out = &ctx.output;
    match out.format() {
        OutputFormat::Json => out.json(&json!({
            "status": "authenticated",
            "token_path": token_path,
        }))?,
        OutputFormat::Plain => out.row(&["authenticated".to_string(), token_path.display().to_string()]),
        OutputFormat::Text => {
            out.line(MSG_LOGIN_SUCCESS);
            out.line(format!("Token saved to {}", token_path.display()));
        }
    }
    Ok(())
}

async fn status(ctx: &AppContext) -> Result<()> {
    let out = &ctx.output;

    let client = match ctx.client().await {
        Ok(client) => client,
        Err(e) => {
            log::debug!("No usable credentials: {:#}", e);
            match out.format() {
                OutputFormat::Json => out.json(&json!({
                    "status": "not authenticated",
                    "error": format!("{:#}", e),
                }))?,
                OutputFormat::Plain | OutputFormat::Text => out.line(MSG_NOT_AUTHENTICATED),
            }
            return Ok(());
        }
    };

    // The Open API has no user endpoint; listing projects proves the token works.
    let projects = client.get_projects().await.context("authentication check failed")?;

    let token_path = ctx.store.token_path();
    match out.format() {
        OutputFormat::Json => out.json(&json!({
            "status": "authenticated",
            "project_count": projects.len(),
            "token_path": token_path,
        }))?,
        OutputFormat::Plain => out.row(&["authenticated".to_string(), format!("{} projects", projects.len())]),
        OutputFormat::Text => {
            out.line(format!("Authenticated (token: {})", token_path.display()));
            out.line(format!("Projects: {}", projects.len()));
        }
    }
    Ok(())
}

fn logout(ctx: &AppContext) -> Result<()> {
    ctx.store.delete().context("logout failed")?;

    let out = &ctx.output;
    match out.format() {
        OutputFormat::Json => out.json(&json!({ "status": "logged out" }))?,
        OutputFormat::Plain => out.line("logged out"),
        OutputFormat::Text => out.line(MSG_LOGOUT_SUCCESS),
    }
    Ok(())
}
