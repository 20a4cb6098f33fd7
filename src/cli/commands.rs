use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "dotdot",
    about = concat!("dotdot v", env!("CARGO_PKG_VERSION"), " - nested task lists in the terminal"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Task list to open (default: tasks.dot in the current directory)
    pub name: Option<String>,

    /// Use NAME.dot in the current directory instead of the global lists
    #[arg(long, global = true, conflicts_with = "file")]
    pub local: bool,

    /// Use a specific file
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep copied titles inside dotdot instead of the system clipboard
    #[arg(long, global = true)]
    pub no_clipboard: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a task list in the terminal UI
    Open(NameArgs),
    /// List available task lists
    List,
    /// Delete a task list
    Delete(DeleteArgs),
    /// Show information about a task list file
    Info(NameArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Task list name (default: tasks)
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task list name
    pub name: Option<String>,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
