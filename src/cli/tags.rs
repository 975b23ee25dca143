//! Tag CLI commands
//!
//! TickTick's Open API has no tag endpoint, so tags are aggregated from the
//! tasks of every project, inbox included.

use anyhow::Result;
use clap::Subcommand;
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

use super::app::AppContext;
use super::output::OutputFormat;
use crate::backend::{get_all_project_ids, Backend};
use crate::constants::MSG_NO_TAGS;
use crate::ticktick::Task;

#[derive(Subcommand)]
pub enum TagCommands {
    /// List all tags (aggregated from tasks across all projects)
    List,
}

/// A tag and the number of tasks carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Count tags over `tasks`, most used first, ties by name.
pub fn count_tags<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in tasks {
        for tag in &task.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(name, count)| TagCount {
            name: name.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    tags
}

pub async fn run(cmd: TagCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        TagCommands::List => list(ctx).await,
    }
}

async fn list(ctx: &AppContext) -> Result<()> {
    let client = ctx.client().await?;
    let project_ids = get_all_project_ids(&client, &ctx.store).await?;

    let mut tasks = Vec::new();
    for project_id in &project_ids {
        match client.get_project_data(project_id).await {
            Ok(data) => tasks.extend(data.tasks),
            Err(e) => warn!("Skipping project {}: {}", project_id, e),
        }
    }
    let tags = count_tags(&tasks);

    let out = &ctx.output;
    match out.format() {
        OutputFormat::Json => out.json(&tags)?,
        OutputFormat::Plain => {
            for tag in &tags {
                out.row(&[tag.name.clone(), tag.count.to_string()]);
            }
        }
        OutputFormat::Text if tags.is_empty() => out.line(MSG_NO_TAGS),
        OutputFormat::Text => {
            for tag in &tags {
                out.line(format!("#{:<20} ({} tasks)", tag.name, tag.count));
            }
        }
    }
    Ok(())
}
