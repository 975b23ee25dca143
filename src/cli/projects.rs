//! Project CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;

use super::app::AppContext;
use super::output::OutputFormat;
use crate::backend::Backend;
use crate::ticktick::Project;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List all projects
    List,

    /// Get project details
    Get {
        /// Project ID
        project_id: String,
    },
}

pub async fn run(cmd: ProjectCommands, ctx: &AppContext) -> Result<()> {
    let client = ctx.client().await?;
    let out = &ctx.output;

    match cmd {
        ProjectCommands::List => {
            let projects = client.get_projects().await.context("failed to list projects")?;
            match out.format() {
                OutputFormat::Json => out.json(&projects)?,
                OutputFormat::Plain => {
                    for p in &projects {
                        out.row(&[&p.id, &p.name]);
                    }
                }
                OutputFormat::Text => {
                    for p in &projects {
                        out.line(format!("{:<24} {}", p.id, p.name));
                    }
                }
            }
        }
        ProjectCommands::Get { project_id } => {
            let project = client.get_project(&project_id).await.context("failed to get project")?;
            match out.format() {
                OutputFormat::Json => out.json(&project)?,
                OutputFormat::Plain => out.row(&[&project.id, &project.name]),
                OutputFormat::Text => {
                    for line in detail_lines(&project) {
                        out.line(line);
                    }
                }
            }
        }
    }
    Ok(())
}

fn detail_lines(project: &Project) -> Vec<String> {
    let mut lines = vec![
        format!("ID:    {}", project.id),
        format!("Name:  {}", project.name),
    ];
    if let Some(color) = project.color.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("Color: {}", color));
    }
    if let Some(kind) = project.kind.as_deref().filter(|k| !k.is_empty()) {
        lines.push(format!("Kind:  {}", kind));
    }
    lines
}
