//! OAuth 2.0 authorization-code flow against TickTick.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use log::{debug, info, warn};
use rand::RngCore;
use reqwest::Url;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;

use super::callback::{CallbackResult, CallbackServer};
use crate::config::OAuthSettings;
use crate::constants::{ENV_CLIENT_ID, ENV_CLIENT_SECRET, LISTENER_SHUTDOWN_GRACE_MS};
use crate::error::{Error, Result};
use crate::ticktick::OAuthToken;

/// Registered OAuth application credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl ClientCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Both values must be present and non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(ENV_CLIENT_ID).filter(|v| !v.is_empty());
        let client_secret = lookup(ENV_CLIENT_SECRET).filter(|v| !v.is_empty());
        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id,
                client_secret,
            }),
            _ => Err(Error::MissingClientCredentials),
        }
    }
}

/// Fresh anti-forgery state: 16 random bytes, URL-safe base64.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

/// Where an interactive login currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    BrowserOpened,
    AwaitingCallback,
    Exchanging,
    Authenticated,
    TimedOut,
    Failed,
}

/// Token-endpoint client plus the settings needed for interactive login.
pub struct OAuthClient {
    settings: OAuthSettings,
    credentials: ClientCredentials,
    http: reqwest::Client,
}

impl OAuthClient {
    /// `timeout` bounds each token-endpoint request, like any other API call.
    pub fn new(settings: OAuthSettings, credentials: ClientCredentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            settings,
            credentials,
            http,
        })
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Authorization URL the user has to visit for the given `state`.
    pub fn authorization_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("scope", self.settings.scope.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("state", state),
                ("response_type", "code"),
            ],
        )
        .map_err(|e| Error::InvalidUrl {
            url: self.settings.auth_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(url.into())
    }

    /// Bind the callback listener and prepare the authorization URL.
    pub async fn start_login(&self) -> Result<PendingLogin<'_>> {
        let state = generate_state();
        let (server, result_rx) = CallbackServer::bind(&self.settings.listen_addr, state.clone()).await?;
        let auth_url = self.authorization_url(&state)?;

        Ok(PendingLogin {
            client: self,
            auth_url,
            server,
            result_rx,
            state: LoginState::Idle,
        })
    }

    /// Run the whole interactive flow. `notify` receives the authorization URL
    /// before the browser is opened.
    pub async fn login<F>(&self, notify: F) -> Result<OAuthToken>
    where
        F: FnOnce(&str),
    {
        let mut pending = self.start_login().await?;
        notify(pending.authorization_url());
        if self.settings.open_browser {
            pending.open_browser();
        }
        pending.wait().await
    }

    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken> {
        self.request_token(&[
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ])
        .await
    }

    /// Trade a refresh token for a new credential record. The returned record
    /// may lack a refresh token; callers decide whether to keep the old one.
    pub async fn refresh(&self, refresh_token: &str) -> Result<OAuthToken> {
        self.request_token(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<OAuthToken> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let mut token: OAuthToken = serde_json::from_str(&body).map_err(Error::TokenParseFailed)?;
        token.stamp_expiry(chrono::Utc::now().timestamp());
        Ok(token)
    }
}

/// A login whose callback listener is running.
pub struct PendingLogin<'a> {
    client: &'a OAuthClient,
    auth_url: String,
    server: CallbackServer,
    result_rx: oneshot::Receiver<CallbackResult>,
    state: LoginState,
}

impl PendingLogin<'_> {
    pub fn authorization_url(&self) -> &str {
        &self.auth_url
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Best effort; failure only means the user has to open the URL by hand.
    pub fn open_browser(&mut self) {
        match open::that(&self.auth_url) {
            Ok(()) => self.transition(LoginState::BrowserOpened),
            Err(e) => warn!("Could not open browser: {}", e),
        }
    }

    /// Wait for the callback, shut the listener down, and exchange the code.
    pub async fn wait(mut self) -> Result<OAuthToken> {
        self.transition(LoginState::AwaitingCallback);

        let timeout = self.client.settings.login_timeout();
        let outcome = tokio::time::timeout(timeout, &mut self.result_rx).await;
        self.server
            .shutdown(Duration::from_millis(LISTENER_SHUTDOWN_GRACE_MS))
            .await;

        let code = match outcome {
            Ok(Ok(Ok(code))) => code,
            Ok(Ok(Err(e))) => return Err(self.fail(e)),
            Ok(Err(_)) => {
                return Err(self.fail(Error::CallbackListener(
                    "listener exited before receiving a callback".to_string(),
                )))
            }
            Err(_) => {
                self.transition(LoginState::TimedOut);
                return Err(Error::AuthTimeout);
            }
        };

        self.transition(LoginState::Exchanging);
        match self.client.exchange_code(&code).await {
            Ok(token) => {
                self.transition(LoginState::Authenticated);
                info!("OAuth login completed");
                Ok(token)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        self.transition(LoginState::Failed);
        error
    }

    fn transition(&mut self, next: LoginState) {
        debug!("OAuth login: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> ClientCredentials {
        ClientCredentials {
            client_id: "my-client".to_string(),
            client_secret: "s3cret".to_string(),
        }
    }

    #[test]
    fn credentials_require_both_values() {
        let env = |id: Option<&str>, secret: Option<&str>| {
            let (id, secret) = (id.map(String::from), secret.map(String::from));
            move |key: &str| match key {
                ENV_CLIENT_ID => id.clone(),
                ENV_CLIENT_SECRET => secret.clone(),
                _ => None,
            }
        };

        assert!(ClientCredentials::from_lookup(env(Some("id"), Some("secret"))).is_ok());
        assert!(matches!(
            ClientCredentials::from_lookup(env(Some("id"), None)),
            Err(Error::MissingClientCredentials)
        ));
        assert!(matches!(
            ClientCredentials::from_lookup(env(Some(""), Some("secret"))),
            Err(Error::MissingClientCredentials)
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let rendered = format!("{:?}", credentials());
        assert!(rendered.contains("my-client"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn state_is_url_safe_and_unique() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 24);
        assert!(!a.contains('+') && !a.contains('/'));
        assert_eq!(URL_SAFE.decode(&a).unwrap().len(), 16);
    }

    #[test]
    fn authorization_url_carries_all_parameters() {
        let client = OAuthClient::new(OAuthSettings::default(), credentials(), Duration::from_secs(5)).unwrap();
        let url = Url::parse(&client.authorization_url("st=ate").unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("ticktick.com"));
        assert_eq!(url.path(), "/oauth/authorize");
        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };
        assert_eq!(param("client_id").as_deref(), Some("my-client"));
        assert_eq!(param("scope").as_deref(), Some("tasks:read tasks:write"));
        assert_eq!(param("redirect_uri").as_deref(), Some("http://localhost:18080/callback"));
        assert_eq!(param("state").as_deref(), Some("st=ate"));
        assert_eq!(param("response_type").as_deref(), Some("code"));
    }
}
