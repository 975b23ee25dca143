//! Task CLI commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use super::app::AppContext;
use super::output::{tsv_row, OutputFormat};
use crate::backend::{discover_inbox_id, Backend};
use crate::constants::MSG_NO_TASKS;
use crate::ticktick::{Patch, Task, TaskCreateRequest, TaskUpdateRequest};
use crate::utils::date::display_day;
use crate::utils::{parse_priority, priority_label, resolve_date};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// List tasks in a project
    List {
        /// Project ID (default: Inbox)
        #[arg(long)]
        project: Option<String>,
    },

    /// Get task details
    Get {
        /// Task ID
        task_id: String,

        /// Project ID
        #[arg(long)]
        project: String,
    },

    /// Create a new task
    Create(CreateArgs),

    /// Update an existing task
    Update(UpdateArgs),

    /// Mark a task as complete
    Complete {
        /// Task ID
        task_id: String,

        /// Project ID
        #[arg(long)]
        project: String,
    },

    /// Delete a task
    Delete {
        /// Task ID
        task_id: String,

        /// Project ID
        #[arg(long)]
        project: String,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Task title
    #[arg(long)]
    pub title: String,

    /// Project ID (default: Inbox)
    #[arg(long)]
    pub project: Option<String>,

    /// Task content/description
    #[arg(long)]
    pub content: Option<String>,

    /// Priority: none, low, medium, high
    #[arg(long)]
    pub priority: Option<String>,

    /// Due date: today, tomorrow, +3d, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Task ID
    pub task_id: String,

    /// Project ID
    #[arg(long)]
    pub project: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New content
    #[arg(long)]
    pub content: Option<String>,

    /// Priority: none, low, medium, high
    #[arg(long)]
    pub priority: Option<String>,

    /// Due date: today, tomorrow, +3d, YYYY-MM-DD
    #[arg(long)]
    pub due: Option<String>,

    /// Clear the due date
    #[arg(long, conflicts_with = "due")]
    pub clear_due: bool,

    /// Replace all tags (comma-separated, empty clears)
    #[arg(long)]
    pub tags: Option<String>,

    /// Add tags (comma-separated)
    #[arg(long)]
    pub add_tags: Option<String>,

    /// Remove tags (comma-separated)
    #[arg(long)]
    pub remove_tags: Option<String>,
}

impl CreateArgs {
    /// Validates priority and due date before anything touches the network.
    fn to_request(&self) -> Result<TaskCreateRequest> {
        Ok(TaskCreateRequest {
            title: self.title.clone(),
            project_id: self.project.clone().filter(|p| !p.is_empty()),
            content: self.content.clone().filter(|c| !c.is_empty()),
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            due_date: self.due.as_deref().map(resolve_date).transpose()?,
            tags: self.tags.as_deref().map(split_tags).unwrap_or_default(),
            ..Default::default()
        })
    }
}

/// Parsed form of the update flags, independent of the current task.
#[derive(Debug, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
    pub clear_due: bool,
    pub replace_tags: Option<Vec<String>>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl UpdateArgs {
    fn changes(&self) -> Result<TaskChanges> {
        Ok(TaskChanges {
            title: self.title.clone(),
            content: self.content.clone(),
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            due_date: self.due.as_deref().map(resolve_date).transpose()?,
            clear_due: self.clear_due,
            replace_tags: self.tags.as_deref().map(split_tags),
            add_tags: self.add_tags.as_deref().map(split_tags).unwrap_or_default(),
            remove_tags: self.remove_tags.as_deref().map(split_tags).unwrap_or_default(),
        })
    }
}

/// Seed an update from `existing` and apply `changes` on top.
///
/// Tags are replaced first, then added, then removed.
pub fn build_update(existing: &Task, project_id: &str, changes: &TaskChanges) -> TaskUpdateRequest {
    let mut request = TaskUpdateRequest::from_task(existing);
    request.project_id = project_id.to_string();

    if let Some(title) = &changes.title {
        request.title = Patch::Set(title.clone());
    }
    if let Some(content) = &changes.content {
        request.content = Patch::Set(content.clone());
    }
    if let Some(priority) = changes.priority {
        request.priority = Patch::Set(priority);
    }
    if let Some(due) = &changes.due_date {
        request.due_date = Patch::Set(due.clone());
    }
    if changes.clear_due {
        request.due_date = Patch::Clear;
    }

    let mut tags = changes.replace_tags.clone().unwrap_or_else(|| existing.tags.clone());
    for tag in &changes.add_tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags.retain(|t| !changes.remove_tags.contains(t));
    request.tags = if tags.is_empty() { Patch::Clear } else { Patch::Set(tags) };

    request
}

/// Split a comma-separated flag value into trimmed, non-empty tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn task_row(task: &Task) -> String {
    let priority = priority_label(task.priority);
    let tags = task.tags.join(",");
    tsv_row(&[
        task.id.as_str(),
        task.project_id.as_str(),
        task.title.as_str(),
        priority.as_str(),
        task.due_date.as_deref().unwrap_or_default(),
        tags.as_str(),
    ])
}

/// `id title [priority] (due: YYYY-MM-DD) #tag ...`
fn task_line(task: &Task) -> String {
    let mut line = format!("{:<24} {}", task.id, task.title);
    if task.priority > 0 {
        line.push_str(&format!(" [{}]", priority_label(task.priority)));
    }
    if let Some(due) = task.due_date.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!(" (due: {})", display_day(due)));
    }
    if !task.tags.is_empty() {
        line.push_str(&format!(" #{}", task.tags.join(" #")));
    }
    line
}

fn detail_lines(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("ID:       {}", task.id),
        format!("Project:  {}", task.project_id),
        format!("Title:    {}", task.title),
    ];
    if let Some(content) = task.content.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("Content:  {}", content));
    }
    lines.push(format!("Priority: {}", priority_label(task.priority)));
    if let Some(due) = task.due_date.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Due:      {}", due));
    }
    if !task.tags.is_empty() {
        lines.push(format!("Tags:     {}", task.tags.join(", ")));
    }
    lines
}

pub async fn run(cmd: TaskCommands, ctx: &AppContext) -> Result<()> {
    let out = &ctx.output;

    match cmd {
        TaskCommands::List { project } => {
            let client = ctx.client().await?;
            let project_id = match project.filter(|p| !p.is_empty()) {
                Some(id) => id,
                None => discover_inbox_id(&client, &ctx.store).await?,
            };

            let data = client
                .get_project_data(&project_id)
                .await
                .context("failed to list tasks")?;

            match out.format() {
                OutputFormat::Json => out.json(&data.tasks)?,
                OutputFormat::Plain => {
                    for task in &data.tasks {
                        out.line(task_row(task));
                    }
                }
                OutputFormat::Text if data.tasks.is_empty() => out.line(MSG_NO_TASKS),
                OutputFormat::Text => {
                    for task in &data.tasks {
                        out.line(task_line(task));
                    }
                }
            }
        }

        TaskCommands::Get { task_id, project } => {
            let client = ctx.client().await?;
            let task = client
                .get_task(&project, &task_id)
                .await
                .context("failed to get task")?;

            match out.format() {
                OutputFormat::Json => out.json(&task)?,
                OutputFormat::Plain => out.line(task_row(&task)),
                OutputFormat::Text => {
                    for line in detail_lines(&task) {
                        out.line(line);
                    }
                }
            }
        }

        TaskCommands::Create(args) => {
            let request = args.to_request()?;
            let client = ctx.client().await?;
            let task = client.create_task(&request).await.context("failed to create task")?;

            match out.format() {
                OutputFormat::Json => out.json(&task)?,
                OutputFormat::Plain => out.row(&[&task.id, &task.project_id]),
                OutputFormat::Text => out.line(format!(
                    "Created task: {} (ID: {}, Project: {})",
                    task.title, task.id, task.project_id
                )),
            }
        }

        TaskCommands::Update(args) => {
            let changes = args.changes()?;
            let client = ctx.client().await?;
            let existing = client
                .get_task(&args.project, &args.task_id)
                .await
                .context("failed to get existing task")?;

            let mut request = build_update(&existing, &args.project, &changes);
            request.id = args.task_id.clone();
            let task = client.update_task(&request).await.context("failed to update task")?;

            match out.format() {
                OutputFormat::Json => out.json(&task)?,
                OutputFormat::Plain => out.row(&[&task.id, &task.project_id]),
                OutputFormat::Text => out.line(format!("Updated task: {} (ID: {})", task.title, task.id)),
            }
        }

        TaskCommands::Complete { task_id, project } => {
            let client = ctx.client().await?;
            client
                .complete_task(&project, &task_id)
                .await
                .context("failed to complete task")?;
            report_status(ctx, &task_id, "completed")?;
        }

        TaskCommands::Delete { task_id, project } => {
            let client = ctx.client().await?;
            client
                .delete_task(&project, &task_id)
                .await
                .context("failed to delete task")?;
            report_status(ctx, &task_id, "deleted")?;
        }
    }
    Ok(())
}

fn report_status(ctx: &AppContext, task_id: &str, status: &str) -> Result<()> {
    let out = &ctx.output;
    match out.format() {
        OutputFormat::Json => out.json(&json!({ "status": status, "task_id": task_id }))?,
        OutputFormat::Plain => out.row(&[task_id, status]),
        OutputFormat::Text => out.line(format!("Task {} {}", task_id, status)),
    }
    Ok(())
}
