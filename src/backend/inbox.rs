//! Inbox project discovery.
//!
//! The Open API does not list the inbox among the user's projects. Creating a
//! task without a project files it there, so a throwaway probe task reveals the
//! inbox id; the id is then cached next to the token.

use log::{debug, info, warn};

use super::Backend;
use crate::auth::TokenStore;
use crate::constants::INBOX_PROBE_TITLE;
use crate::error::{Error, Result};
use crate::ticktick::TaskCreateRequest;

/// Inbox project id, from the cache when present, otherwise by probing.
pub async fn discover_inbox_id(backend: &dyn Backend, store: &TokenStore) -> Result<String> {
    match store.load_inbox_id() {
        Ok(id) => {
            debug!("Using cached inbox id {}", id);
            return Ok(id);
        }
        Err(e) => debug!("No cached inbox id ({}), probing", e),
    }

    let probe = backend
        .create_task(&TaskCreateRequest {
            title: INBOX_PROBE_TITLE.to_string(),
            ..Default::default()
        })
        .await?;

    if probe.project_id.is_empty() {
        return Err(Error::InboxDiscovery(format!(
            "probe task {} came back without a project id",
            probe.id
        )));
    }
    let inbox_id = probe.project_id;

    if let Err(e) = backend.delete_task(&inbox_id, &probe.id).await {
        warn!("Failed to delete inbox probe task {}: {}", probe.id, e);
    }
    if let Err(e) = store.save_inbox_id(&inbox_id) {
        warn!("Failed to cache inbox id: {}", e);
    }

    info!("Discovered inbox project {}", inbox_id);
    Ok(inbox_id)
}

/// Inbox id followed by every listed project id, without duplicates.
pub async fn get_all_project_ids(backend: &dyn Backend, store: &TokenStore) -> Result<Vec<String>> {
    let projects = backend.get_projects().await?;
    let inbox_id = discover_inbox_id(backend, store).await?;

    let mut ids = Vec::with_capacity(projects.len() + 1);
    ids.push(inbox_id);
    for project in projects {
        if !ids.contains(&project.id) {
            ids.push(project.id);
        }
    }
    Ok(ids)
}
