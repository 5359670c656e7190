//! `tkt search` command - Full-text search over titles and bodies

use miette::Result;

use crate::cli::helpers::{split_values, Workspace};
use crate::cli::table::ItemTable;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search terms; every term must match, as a word prefix
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Maximum number of results
    #[arg(long, short = 'n', default_value = "20")]
    pub limit: usize,

    /// Only results with these statuses
    #[arg(long, short = 's')]
    pub status: Vec<String>,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let query = args.query.join(" ");
    if query.trim().is_empty() {
        return Err(miette::miette!("search query must not be empty"));
    }

    let statuses = split_values(&args.status);
    let results: Vec<_> = ws
        .store
        .search(&query, args.limit)?
        .into_iter()
        .filter(|item| statuses.is_empty() || statuses.contains(&item.status))
        .collect();

    if results.is_empty() && matches!(global.format, OutputFormat::Auto | OutputFormat::Tsv) {
        if !global.quiet {
            println!("No items match '{}'.", query);
        }
        return Ok(());
    }

    ItemTable::new(ws.store.taxonomy())
        .quiet(global.quiet)
        .print(&results, global.format)
}
