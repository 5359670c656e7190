//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    delete::DeleteArgs,
    edit::EditArgs,
    init::InitArgs,
    link::LinkCommands,
    list::ListArgs,
    new::NewArgs,
    search::SearchArgs,
    show::ShowArgs,
    watch::WatchArgs,
};

#[derive(Parser)]
#[command(name = "tkt")]
#[command(author, version, about = "Tessera Tickets")]
#[command(long_about = "Plain-text item tracking: tasks, bugs and epics stored as Markdown files with YAML headers.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .tkt/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tkt project
    Init(InitArgs),

    /// Create a new item
    New(NewArgs),

    /// Show one item
    Show(ShowArgs),

    /// List items, optionally filtered or as a tree
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Full-text search over titles, bodies and short names
    Search(SearchArgs),

    /// Change an item's fields, or open it in an editor
    Edit(EditArgs),

    /// Manage links between items
    #[command(subcommand)]
    Link(LinkCommands),

    /// Delete an item
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Watch the item directory and report reloads
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (details for show, table for list)
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
