//! `tkt show` command - Show one item

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::graph;
use crate::core::links::LinkType;
use crate::core::persist;
use crate::entities::Item;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Item ID (or unique prefix)
    pub id: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let item = ws.store.get(&args.id)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", item.id),
        _ => print_details(&ws, &item),
    }
    Ok(())
}

fn print_details(ws: &Workspace, item: &Item) {
    let all = ws.store.all();
    let taxonomy = ws.store.taxonomy();

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&item.id).cyan());
    println!("{}: {}", style("Title").bold(), style(&item.title).yellow());
    println!("{}: {}", style("Type").bold(), item.kind);
    println!("{}: {}", style("Status").bold(), item.status);
    println!("{}: {}", style("Priority").bold(), item.priority);
    if !item.tags.is_empty() {
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        println!("{}: {}", style("Tags").bold(), tags.join(", "));
    }

    let blocked = graph::blocked_ids(&all, taxonomy).contains(&item.id);
    if blocked {
        println!("{}: {}", style("Blocked").bold(), style("yes").red());
    }

    let title_of = |id: &str| {
        all.iter()
            .find(|i| i.id == id)
            .map(|i| i.title.clone())
            .unwrap_or_else(|| style("(missing)").dim().to_string())
    };

    let children = graph::children_of(&all, &item.id);
    let blockers = graph::blockers_of(&all, &item.id);
    if !item.links.is_empty() || !children.is_empty() || !blockers.is_empty() {
        println!();
        println!("{}", style("Links:").bold());
        for link in &item.links {
            println!(
                "  {:<12} {} {}",
                link.kind.to_string(),
                style(&link.target).cyan(),
                title_of(&link.target)
            );
        }
        for child in children {
            println!(
                "  {:<12} {} {}",
                LinkType::Parent.reverse_label(),
                style(&child.id).cyan(),
                child.title
            );
        }
        for blocker in blockers {
            println!(
                "  {:<12} {} {} [{}]",
                LinkType::Blocks.reverse_label(),
                style(&blocker.id).cyan(),
                blocker.title,
                blocker.status
            );
        }
    }

    println!("{}", style("─".repeat(60)).dim());
    if !item.body.trim().is_empty() {
        println!("{}", item.body.trim_matches('\n'));
        println!("{}", style("─".repeat(60)).dim());
    }
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        item.author.as_deref().unwrap_or("-"),
        style("Created").dim(),
        item.created.format("%Y-%m-%d %H:%M"),
        style("Updated").dim(),
        item.updated.format("%Y-%m-%d %H:%M"),
    );
    println!(
        "{}",
        style(persist::item_path(ws.store.dir(), item).display()).dim()
    );
}
