//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! | Group | Examples |
//! |-------|----------|
//! | Auth | `auth login`, `auth status`, `auth logout` |
//! | Projects | `projects list`, `projects get <id>` |
//! | Tasks | `tasks list`, `tasks create --title ...`, `tasks update <id> --project <p>` |
//! | Tags | `tags list` |
//! | Config | `config path`, `config init` |
//!
//! Every command honors the global `--json` (indented JSON) and `--plain`
//! (tab-separated) flags; the default is human-readable text.

mod app;
mod auth;
mod config_cmd;
mod output;
mod projects;
mod tags;
mod tasks;

pub use app::{run, AppContext, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use tags::{count_tags, TagCount};
pub use tasks::{build_update, split_tags, TaskChanges};
