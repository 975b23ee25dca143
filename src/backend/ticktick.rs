//! HTTP client for the TickTick Open API.

use async_trait::async_trait;
use log::debug;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::Backend;
use crate::auth::{resolve_access_token, TokenStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ticktick::{Project, ProjectData, Task, TaskCreateRequest, TaskUpdateRequest};

/// Authenticated TickTick client. Every request carries the bearer token it was built with.
pub struct TickTickClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl TickTickClient {
    pub fn new(base_url: &str, access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| Error::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                url: base_url.to_string(),
                reason: "cannot be used as a base URL".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
            access_token: access_token.into(),
        })
    }

    /// Build a client from the environment token or the stored credentials,
    /// refreshing an expired stored token first.
    pub async fn connect(config: &Config, store: &TokenStore) -> Result<Self> {
        Self::connect_with(config, store, |key| std::env::var(key).ok()).await
    }

    /// Like [`connect`](Self::connect) with an explicit environment lookup.
    pub async fn connect_with<F>(config: &Config, store: &TokenStore, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = resolve_access_token(config, store, lookup).await?;
        Self::new(&config.api.base_url, token, config.api.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // checked in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<String>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url.path());

        let mut request = self.http.request(method, url).bearer_auth(&self.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!("API call failed with status {}", status);
            return Err(Error::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], what: &'static str) -> Result<T> {
        let body = self.send::<()>(Method::GET, segments, None).await?;
        parse(&body, what)
    }
}

fn parse<T: DeserializeOwned>(body: &str, what: &'static str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| Error::ResponseParse { what, source })
}

#[async_trait]
impl Backend for TickTickClient {
    fn backend_type(&self) -> &str {
        "ticktick"
    }

    async fn get_projects(&self) -> Result<Vec<Project>> {
        self.get_json(&["project"], "projects").await
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.get_json(&["project", project_id], "project").await
    }

    async fn get_project_data(&self, project_id: &str) -> Result<ProjectData> {
        self.get_json(&["project", project_id, "data"], "project data").await
    }

    async fn create_task(&self, request: &TaskCreateRequest) -> Result<Task> {
        let body = self.send(Method::POST, &["task"], Some(request)).await?;
        parse(&body, "task")
    }

    async fn get_task(&self, project_id: &str, task_id: &str) -> Result<Task> {
        self.get_json(&["project", project_id, "task", task_id], "task").await
    }

    async fn update_task(&self, request: &TaskUpdateRequest) -> Result<Task> {
        let body = self
            .send(Method::POST, &["task", request.id.as_str()], Some(request))
            .await?;
        parse(&body, "task")
    }

    async fn complete_task(&self, project_id: &str, task_id: &str) -> Result<()> {
        self.send::<()>(Method::POST, &["project", project_id, "task", task_id, "complete"], None)
            .await?;
        Ok(())
    }

    async fn delete_task(&self, project_id: &str, task_id: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, &["project", project_id, "task", task_id], None)
            .await?;
        Ok(())
    }
}
