//! Authentication: OAuth login, token persistence, and access-token resolution.

pub mod callback;
pub mod oauth;
pub mod token_store;

pub use oauth::{generate_state, ClientCredentials, LoginState, OAuthClient, PendingLogin};
pub use token_store::TokenStore;

use log::{debug, info};

use crate::config::Config;
use crate::constants::ENV_ACCESS_TOKEN;
use crate::error::{Error, Result};

/// Pick the bearer token for API calls.
///
/// A non-empty `TICKTICK_ACCESS_TOKEN` is used as-is and never refreshed or
/// persisted. Otherwise the stored token is loaded and, when expired, refreshed
/// and saved back. Every refresh failure surfaces as [`Error::NeedsLogin`].
pub async fn resolve_access_token<F>(config: &Config, store: &TokenStore, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|t| !t.is_empty()) {
        debug!("Using access token from {}", ENV_ACCESS_TOKEN);
        return Ok(token);
    }

    let saved = store.load()?;
    if !saved.is_expired_at(chrono::Utc::now().timestamp()) {
        return Ok(saved.access_token);
    }

    info!("Access token expired, refreshing");
    let refresh_token = saved
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::NeedsLogin("token expired and no refresh token available".to_string()))?;

    let needs_login = |e: Error| Error::NeedsLogin(format!("failed to refresh token: {}", e));
    let credentials = ClientCredentials::from_lookup(&lookup).map_err(needs_login)?;
    let oauth = OAuthClient::new(config.oauth.clone(), credentials, config.api.timeout()).map_err(needs_login)?;
    let mut fresh = oauth.refresh(&refresh_token).await.map_err(needs_login)?;

    if fresh.refresh_token.as_deref().map_or(true, str::is_empty) {
        fresh.refresh_token = Some(refresh_token);
    }
    store.save(&fresh)?;
    debug!("Refreshed token saved to {}", store.token_path().display());

    Ok(fresh.access_token)
}
