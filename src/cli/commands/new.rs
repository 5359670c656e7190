//! `tkt new` command - Create an item

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{split_values, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::links::LinkType;
use crate::core::persist;
use crate::entities::Item;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Item title
    pub title: String,

    /// Item type (default from config)
    #[arg(long, short = 't')]
    pub r#type: Option<String>,

    /// Priority (default from config)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Initial status (default from config)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Tags (repeatable or comma-separated)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Parent item ID (or unique prefix)
    #[arg(long)]
    pub parent: Option<String>,

    /// Items this one blocks (repeatable)
    #[arg(long)]
    pub blocks: Vec<String>,

    /// Body text
    #[arg(long, short = 'm')]
    pub body: Option<String>,

    /// Explicit ID instead of a generated one
    #[arg(long)]
    pub id: Option<String>,

    /// Author (default from config, git, or $USER)
    #[arg(long)]
    pub author: Option<String>,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;

    let mut item = Item::new(args.title.trim());
    if item.title.is_empty() {
        return Err(miette::miette!("title must not be empty"));
    }
    item.id = args.id.unwrap_or_default();
    item.kind = args.r#type.unwrap_or_default();
    item.priority = args.priority.unwrap_or_default();
    item.status = args.status.unwrap_or_default();
    item.tags = split_values(&args.tags).into_iter().collect();
    item.author = Some(args.author.unwrap_or_else(|| ws.config.author()));
    if let Some(body) = args.body {
        item.body = body;
    }

    if let Some(parent) = &args.parent {
        let parent = ws.store.resolve_id(parent)?;
        item.set_parent(&parent);
    }
    for target in split_values(&args.blocks) {
        let target = ws.store.resolve_id(&target)?;
        item.add_link(LinkType::Blocks, &target);
    }

    let item = ws.store.create(item)?;

    match global.format {
        OutputFormat::Id => println!("{}", item.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item).into_diagnostic()?);
        }
        _ => {
            if !global.quiet {
                println!(
                    "{} Created {} {}",
                    style("✓").green(),
                    style(&item.id).cyan(),
                    item.title
                );
                println!(
                    "   {}",
                    style(persist::item_path(ws.store.dir(), &item).display()).dim()
                );
            } else {
                println!("{}", item.id);
            }
        }
    }
    Ok(())
}
