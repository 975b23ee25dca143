//! TickTick Open API data models.
//!
//! Field names follow the remote JSON (camelCase); every response type
//! tolerates missing fields so partial payloads still parse.

use serde::{Deserialize, Serialize, Serializer};

/// A TickTick project (list).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub sort_order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub is_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// A TickTick task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// One of 0 (none), 1 (low), 3 (medium), 5 (high)
    pub priority: i32,
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    pub is_all_day: bool,
    #[serde(rename = "completedTime", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "modifiedTime", skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

/// Response of `GET /project/{id}/data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    pub project: Project,
    pub tasks: Vec<Task>,
}

/// Body of `POST /task`.
///
/// Without a `project_id` TickTick files the task in the inbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreateRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
}

/// A single field of an update request.
///
/// `Unchanged` omits the key, `Clear` sends the type's empty value
/// (`""`, `[]`, `0`, `false`) and `Set` sends the given value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// Current value, if one is being set.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Unchanged, Patch::Set)
    }
}

impl<T: Serialize + Default> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            Patch::Clear => T::default().serialize(serializer),
            Patch::Unchanged => serializer.serialize_none(),
        }
    }
}

/// Body of `POST /task/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateRequest {
    pub id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub title: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub content: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub desc: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub priority: Patch<i32>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub due_date: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub start_date: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub tags: Patch<Vec<String>>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub time_zone: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_unchanged")]
    pub is_all_day: Patch<bool>,
}

impl TaskUpdateRequest {
    pub fn new(id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// Seed an update from an existing task so unspecified fields keep their values.
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            project_id: task.project_id.clone(),
            title: Patch::Set(task.title.clone()),
            content: task.content.clone().into(),
            priority: Patch::Set(task.priority),
            due_date: task.due_date.clone().filter(|d| !d.is_empty()).into(),
            tags: Patch::Set(task.tags.clone()),
            ..Default::default()
        }
    }
}

/// OAuth credential record, as returned by the token endpoint and persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry in epoch seconds; `None` means unknown / never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl OAuthToken {
    /// Stamp `expires_at = now + expires_in` when the lifetime is positive.
    pub fn stamp_expiry(&mut self, now: i64) {
        self.expires_at = (self.expires_in > 0).then(|| now + self.expires_in);
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}
