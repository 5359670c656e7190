//! `tkt link` command - Manage edges between items

use console::style;
use miette::Result;

use crate::cli::helpers::Workspace;
use crate::cli::table::ItemTable;
use crate::cli::GlobalOpts;
use crate::core::graph;
use crate::core::links::LinkType;

#[derive(clap::Subcommand, Debug)]
pub enum LinkCommands {
    /// Set the parent of one or more items
    Parent(ParentArgs),

    /// Remove the parent of one or more items
    Unparent(UnparentArgs),

    /// List items that could become the parent of the given items
    Candidates(CandidatesArgs),

    /// Record that BLOCKER must finish before TARGET can proceed
    Blocks(BlockArgs),

    /// Remove a blocks edge
    Unblock(BlockArgs),

    /// Add an informational edge between two items
    Related(RelatedArgs),

    /// Add an edge of any type (parent and blocks are checked as above)
    Add(EdgeArgs),

    /// Remove an edge of any type
    Remove(EdgeArgs),
}

#[derive(clap::Args, Debug)]
pub struct ParentArgs {
    /// New parent ID (or unique prefix)
    pub parent: String,

    /// Items to move under the parent
    #[arg(required = true)]
    pub children: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct UnparentArgs {
    #[arg(required = true)]
    pub children: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct CandidatesArgs {
    #[arg(required = true)]
    pub children: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct BlockArgs {
    /// Item that blocks
    pub blocker: String,

    /// Item that is blocked
    pub target: String,
}

#[derive(clap::Args, Debug)]
pub struct RelatedArgs {
    pub source: String,
    pub target: String,
}

#[derive(clap::Args, Debug)]
#[command(after_help = "\
LINK TYPES:
  parent     Single-valued hierarchy edge (→ child)
  blocks     Source must finish before target proceeds (→ blocked_by)
  related    Informational
  Any other name is stored as given.

EXAMPLES:
  tkt link add ab12 related cd34
  tkt link remove ab12 related cd34")]
pub struct EdgeArgs {
    /// Source item ID (or unique prefix)
    pub source: String,

    /// Link type
    pub link_type: String,

    /// Target item ID (or unique prefix)
    pub target: String,
}

pub fn run(cmd: LinkCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    match cmd {
        LinkCommands::Parent(args) => set_parent(&ws, &args.parent, &args.children, global),
        LinkCommands::Unparent(args) => unparent(&ws, &args.children, global),
        LinkCommands::Candidates(args) => candidates(&ws, &args.children, global),
        LinkCommands::Blocks(args) => {
            add_edge(&ws, &args.blocker, LinkType::Blocks, &args.target, global)
        }
        LinkCommands::Unblock(args) => {
            remove_edge(&ws, &args.blocker, LinkType::Blocks, &args.target, global)
        }
        LinkCommands::Related(args) => {
            add_edge(&ws, &args.source, LinkType::Related, &args.target, global)
        }
        LinkCommands::Add(args) => {
            let kind = link_type(&args.link_type)?;
            if kind == LinkType::Parent {
                set_parent(&ws, &args.target, &[args.source], global)
            } else {
                add_edge(&ws, &args.source, kind, &args.target, global)
            }
        }
        LinkCommands::Remove(args) => {
            let kind = link_type(&args.link_type)?;
            remove_edge(&ws, &args.source, kind, &args.target, global)
        }
    }
}

fn link_type(name: &str) -> Result<LinkType> {
    if name.trim().is_empty() {
        return Err(miette::miette!("link type must not be empty"));
    }
    name.parse()
        .map_err(|_: std::convert::Infallible| miette::miette!("invalid link type '{}'", name))
}

fn resolve_all(ws: &Workspace, ids: &[String]) -> Result<Vec<String>> {
    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        let id = ws.store.resolve_id(id)?;
        if !resolved.contains(&id) {
            resolved.push(id);
        }
    }
    Ok(resolved)
}

fn set_parent(ws: &Workspace, parent: &str, children: &[String], global: &GlobalOpts) -> Result<()> {
    let parent = ws.store.resolve_id(parent)?;
    let children = resolve_all(ws, children)?;
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    let all = ws.store.all();
    graph::check_parent_assignment(&all, &child_refs, &parent)?;

    for child in &children {
        let mut item = ws.store.get(child)?;
        if item.set_parent(&parent) {
            ws.store.update(item)?;
        }
        if !global.quiet {
            println!(
                "{} {} {} {}",
                style("✓").green(),
                style(child).cyan(),
                style("parent →").dim(),
                style(&parent).cyan()
            );
        }
    }
    Ok(())
}

fn unparent(ws: &Workspace, children: &[String], global: &GlobalOpts) -> Result<()> {
    for child in resolve_all(ws, children)? {
        let mut item = ws.store.get(&child)?;
        let changed = item.clear_parent();
        if changed {
            ws.store.update(item)?;
        }
        if !global.quiet {
            if changed {
                println!("{} {} has no parent", style("✓").green(), style(&child).cyan());
            } else {
                println!("{} {} had no parent", style("!").yellow(), style(&child).cyan());
            }
        }
    }
    Ok(())
}

fn candidates(ws: &Workspace, children: &[String], global: &GlobalOpts) -> Result<()> {
    let children = resolve_all(ws, children)?;
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    let all = ws.store.all();
    let mut found: Vec<_> = graph::parent_candidates(&all, &child_refs)
        .into_iter()
        .cloned()
        .collect();
    found.sort_by(|a, b| ws.store.taxonomy().compare(a, b));

    ItemTable::new(ws.store.taxonomy())
        .quiet(global.quiet)
        .print(&found, global.format)
}

fn add_edge(
    ws: &Workspace,
    source: &str,
    kind: LinkType,
    target: &str,
    global: &GlobalOpts,
) -> Result<()> {
    let mut item = ws.store.get(source)?;
    let target = ws.store.resolve_id(target)?;
    if kind == LinkType::Blocks {
        graph::check_blocks_assignment(&item.id, &target)?;
    } else if item.id == target {
        return Err(miette::miette!("'{}' cannot link to itself", target));
    }

    let changed = item.add_link(kind.clone(), &target);
    let id = item.id.clone();
    if changed {
        ws.store.update(item)?;
    }

    if !global.quiet {
        let marker = if changed {
            style("✓").green()
        } else {
            style("!").yellow()
        };
        let suffix = if changed { "" } else { " (already linked)" };
        println!(
            "{} {} {} {}{}",
            marker,
            style(&id).cyan(),
            style(format!("{} →", kind)).dim(),
            style(&target).cyan(),
            suffix
        );
    }
    Ok(())
}

fn remove_edge(
    ws: &Workspace,
    source: &str,
    kind: LinkType,
    target: &str,
    global: &GlobalOpts,
) -> Result<()> {
    let mut item = ws.store.get(source)?;
    // the target may already be deleted, so fall back to the literal id
    let target = ws
        .store
        .resolve_id(target)
        .unwrap_or_else(|_| target.to_string());

    if !item.remove_link(&kind, &target) {
        return Err(miette::miette!(
            "{} has no {} link to {}",
            item.id,
            kind,
            target
        ));
    }
    let id = item.id.clone();
    ws.store.update(item)?;

    if !global.quiet {
        println!(
            "{} Removed {} {} {}",
            style("✓").green(),
            style(&id).cyan(),
            style(format!("{} →", kind)).dim(),
            style(&target).cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_type_names() {
        assert_eq!(link_type("parent").unwrap(), LinkType::Parent);
        assert_eq!(link_type("related_to").unwrap(), LinkType::Related);
        assert_eq!(
            link_type("duplicates").unwrap(),
            LinkType::Other("duplicates".to_string())
        );
        assert!(link_type(" ").is_err());
    }
}
