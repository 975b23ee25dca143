mod common;

use common::{env_from, StubResponse, StubServer};
use serde_json::json;
use tempfile::TempDir;
use ticky::auth::TokenStore;
use ticky::backend::{discover_inbox_id, get_all_project_ids, Backend, TickTickClient};
use ticky::config::Config;
use ticky::constants::{ENV_ACCESS_TOKEN, ENV_CLIENT_ID, ENV_CLIENT_SECRET, INBOX_PROBE_TITLE};
use ticky::ticktick::OAuthToken;
use ticky::Error;

fn config_for(server: &StubServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.url();
    config.oauth.token_url = format!("{}/oauth/token", server.url());
    config
}

fn stored(access: &str, refresh: Option<&str>, expires_at: Option<i64>) -> OAuthToken {
    OAuthToken {
        access_token: access.to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        scope: "tasks:read tasks:write".to_string(),
        refresh_token: refresh.map(String::from),
        expires_at,
    }
}

fn an_hour_ago() -> i64 {
    chrono::Utc::now().timestamp() - 3600
}

fn api(req: &common::RecordedRequest) -> StubResponse {
    match (req.method.as_str(), req.path.as_str()) {
        ("POST", "/oauth/token") => StubResponse::json(200, json!({"access_token": "fresh", "expires_in": 7200})),
        ("GET", "/project") => StubResponse::json(200, json!([{"id": "p1", "name": "Work"}])),
        ("POST", "/task") => StubResponse::json(200, json!({"id": "probe", "projectId": "inbox42"})),
        ("DELETE", _) => StubResponse::empty(),
        _ => StubResponse::text(404, "not found"),
    }
}

#[tokio::test]
async fn env_token_is_used_verbatim_without_touching_disk() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path().join("ticky"));

    let client = TickTickClient::connect_with(&config_for(&server), &store, env_from(&[(ENV_ACCESS_TOKEN, "static")]))
        .await
        .unwrap();
    client.get_projects().await.unwrap();

    assert_eq!(server.requests()[0].header("authorization"), Some("Bearer static"));
    assert!(!store.dir().exists());
}

#[tokio::test]
async fn fresh_stored_token_is_used_without_refresh() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    store.save(&stored("saved", Some("r"), Some(i64::MAX))).unwrap();

    let client = TickTickClient::connect_with(&config_for(&server), &store, env_from(&[(ENV_ACCESS_TOKEN, "")]))
        .await
        .unwrap();
    client.get_projects().await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("authorization"), Some("Bearer saved"));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_persisted() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    store.save(&stored("stale", Some("keep-me"), Some(an_hour_ago()))).unwrap();

    let env = env_from(&[(ENV_CLIENT_ID, "id"), (ENV_CLIENT_SECRET, "secret")]);
    let client = TickTickClient::connect_with(&config_for(&server), &store, env).await.unwrap();
    client.get_projects().await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].path, "/oauth/token");
    assert!(requests[0].body.contains("refresh_token=keep-me"));
    assert_eq!(requests[1].header("authorization"), Some("Bearer fresh"));

    let saved = store.load().unwrap();
    assert_eq!(saved.access_token, "fresh");
    // refresh response had no refresh_token, the old one is kept
    assert_eq!(saved.refresh_token.as_deref(), Some("keep-me"));
    assert!(saved.expires_at.unwrap() > chrono::Utc::now().timestamp());
}

#[tokio::test]
async fn expired_without_refresh_token_needs_login() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    store.save(&stored("stale", None, Some(an_hour_ago()))).unwrap();

    let result = TickTickClient::connect_with(&config_for(&server), &store, env_from(&[])).await;
    let err = result.err().unwrap();
    assert!(matches!(err, Error::NeedsLogin(_)));
    assert!(err.to_string().contains("ticky auth login"));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn refresh_without_client_credentials_needs_login() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    store.save(&stored("stale", Some("r"), Some(an_hour_ago()))).unwrap();

    let result = TickTickClient::connect_with(&config_for(&server), &store, env_from(&[])).await;
    assert!(matches!(result, Err(Error::NeedsLogin(_))));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn rejected_refresh_needs_login_and_keeps_old_record() {
    let server = StubServer::start(|_| StubResponse::text(400, "invalid_grant")).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    let old = stored("stale", Some("r"), Some(an_hour_ago()));
    store.save(&old).unwrap();

    let env = env_from(&[(ENV_CLIENT_ID, "id"), (ENV_CLIENT_SECRET, "secret")]);
    let err = TickTickClient::connect_with(&config_for(&server), &store, env)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::NeedsLogin(ref msg) if msg.contains("status 400")));
    assert_eq!(store.load().unwrap(), old);
}

#[tokio::test]
async fn no_token_at_all_is_not_authenticated() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());

    let result = TickTickClient::connect_with(&config_for(&server), &store, env_from(&[])).await;
    assert!(matches!(result, Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn inbox_probe_over_http_then_cache() {
    let server = StubServer::start(api).await;
    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    let client = TickTickClient::connect_with(&config_for(&server), &store, env_from(&[(ENV_ACCESS_TOKEN, "t")]))
        .await
        .unwrap();

    assert_eq!(discover_inbox_id(&client, &store).await.unwrap(), "inbox42");
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/task");
    assert_eq!(requests[0].json(), json!({"title": INBOX_PROBE_TITLE}));
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/project/inbox42/task/probe");

    let ids = get_all_project_ids(&client, &store).await.unwrap();
    assert_eq!(ids, vec!["inbox42", "p1"]);
    // only the project listing hit the network the second time
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn refresh_uses_configured_api_timeout() {
    let silent = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();
    let hold = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((stream, _)) = silent.accept().await {
            open.push(stream);
        }
    });

    let dir = TempDir::new().unwrap();
    let store = TokenStore::new(dir.path());
    store.save(&stored("stale", Some("r"), Some(an_hour_ago()))).unwrap();

    let mut config = Config::default();
    config.api.timeout_secs = 1;
    config.oauth.token_url = format!("http://{}/oauth/token", addr);
    let env = env_from(&[(ENV_CLIENT_ID, "id"), (ENV_CLIENT_SECRET, "secret")]);

    let started = std::time::Instant::now();
    let result = TickTickClient::connect_with(&config, &store, env).await;
    assert!(matches!(result, Err(Error::NeedsLogin(_))));
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    hold.abort();
}
