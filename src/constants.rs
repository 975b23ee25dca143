//! Constants used throughout the application
//!
//! This module centralizes endpoints, environment variable names, file names,
//! and user-facing messages.

// Remote endpoints
pub const DEFAULT_API_BASE_URL: &str = "https://api.ticktick.com/open/v1";
pub const DEFAULT_AUTH_URL: &str = "https://ticktick.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://ticktick.com/oauth/token";

// Local OAuth callback
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:18080/callback";
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:18080";
pub const CALLBACK_PATH: &str = "/callback";
pub const DEFAULT_SCOPE: &str = "tasks:read tasks:write";

// Timing
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Grace period for the callback listener to finish in-flight responses
pub const LISTENER_SHUTDOWN_GRACE_MS: u64 = 2_000;

// Environment variables
pub const ENV_CLIENT_ID: &str = "TICKTICK_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "TICKTICK_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "TICKTICK_ACCESS_TOKEN";
pub const ENV_CONFIG_DIR: &str = "TICKY_CONFIG_DIR";

// Files under the config directory
pub const CONFIG_DIR_NAME: &str = "ticky";
pub const TOKEN_FILE: &str = "token.json";
pub const INBOX_CACHE_FILE: &str = "config.json";
pub const SETTINGS_FILE: &str = "config.toml";
pub const LOCAL_SETTINGS_FILE: &str = "ticky.toml";
pub const LOG_FILE: &str = "ticky.log";

/// Title of the throwaway task used to learn the inbox project id
pub const INBOX_PROBE_TITLE: &str = ".ticky-inbox-probe";

// Callback pages
pub const CALLBACK_SUCCESS_PAGE: &str =
    "<html><body><h2>Authentication successful!</h2><p>You can close this window.</p></body></html>";

// Messages
pub const MSG_LOGIN_SUCCESS: &str = "Successfully authenticated!";
pub const MSG_LOGOUT_SUCCESS: &str = "Logged out successfully";
pub const MSG_NOT_AUTHENTICATED: &str = "Not authenticated";
pub const MSG_NO_TASKS: &str = "No tasks found";
pub const MSG_NO_TAGS: &str = "No tags found";
pub const CONFIG_GENERATED: &str = "Generated default configuration file";
