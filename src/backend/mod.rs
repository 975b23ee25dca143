//! Backend abstraction over the TickTick Open API.
//!
//! Commands and the inbox resolver talk to a [`Backend`] rather than to the
//! HTTP client directly, so they can run against a stand-in in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::ticktick::{Project, ProjectData, Task, TaskCreateRequest, TaskUpdateRequest};

pub mod inbox;
pub mod ticktick;

pub use inbox::{discover_inbox_id, get_all_project_ids};
pub use ticktick::TickTickClient;

/// Remote operations every command relies on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend type identifier.
    fn backend_type(&self) -> &str;

    // Projects
    async fn get_projects(&self) -> Result<Vec<Project>>;
    async fn get_project(&self, project_id: &str) -> Result<Project>;
    /// Project plus its tasks
    async fn get_project_data(&self, project_id: &str) -> Result<ProjectData>;

    // Tasks
    async fn create_task(&self, request: &TaskCreateRequest) -> Result<Task>;
    async fn get_task(&self, project_id: &str, task_id: &str) -> Result<Task>;
    /// Addressed by `request.id` alone
    async fn update_task(&self, request: &TaskUpdateRequest) -> Result<Task>;
    async fn complete_task(&self, project_id: &str, task_id: &str) -> Result<()>;
    async fn delete_task(&self, project_id: &str, task_id: &str) -> Result<()>;
}
