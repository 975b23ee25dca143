//! Error types shared by every layer of the ticky library.

/// Errors produced while authenticating against or talking to TickTick.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("TICKTICK_CLIENT_ID and TICKTICK_CLIENT_SECRET must be set")]
    MissingClientCredentials,

    #[error("state mismatch in OAuth callback")]
    StateMismatch,

    #[error("OAuth error: {0}")]
    AuthorizationDenied(String),

    #[error("no code in OAuth callback")]
    MissingCode,

    #[error("authentication timed out")]
    AuthTimeout,

    #[error("token exchange failed (status {status}): {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("failed to parse token response: {0}")]
    TokenParseFailed(#[source] serde_json::Error),

    #[error("not authenticated: run 'ticky auth login' first")]
    NotAuthenticated,

    #[error("failed to parse token file {path}: {source}")]
    CorruptToken {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}: run 'ticky auth login'")]
    NeedsLogin(String),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse {what}: {source}")]
    ResponseParse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid priority: {0} (use none, low, medium, high)")]
    InvalidPriority(String),

    #[error("unsupported date format: {0} (use today, tomorrow, +Nd, or YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OAuth callback listener stopped: {0}")]
    CallbackListener(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to discover inbox ID: {0}")]
    InboxDiscovery(String),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// HTTP status carried by API and token-endpoint failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::TokenExchangeFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
