//! `tkt list` command - List and filter items

use clap::ValueEnum;
use miette::Result;
use std::cmp::Ordering;

use crate::cli::helpers::{split_values, Workspace};
use crate::cli::table::ItemTable;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::filter::ItemFilter;
use crate::core::taxonomy::{Category, Taxonomy};
use crate::core::tree::build_forest;
use crate::core::ItemStore;
use crate::entities::Item;

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    // ========== FILTERING OPTIONS ==========
    /// Only these statuses (repeatable or comma-separated)
    #[arg(long, short = 's')]
    pub status: Vec<String>,

    /// Exclude these statuses
    #[arg(long)]
    pub not_status: Vec<String>,

    /// Only these types
    #[arg(long, short = 't')]
    pub r#type: Vec<String>,

    /// Exclude these types
    #[arg(long)]
    pub not_type: Vec<String>,

    /// Only these priorities
    #[arg(long, short = 'p')]
    pub priority: Vec<String>,

    /// Exclude these priorities
    #[arg(long)]
    pub not_priority: Vec<String>,

    /// Items with any of these tags
    #[arg(long)]
    pub tag: Vec<String>,

    /// Items with none of these tags
    #[arg(long)]
    pub not_tag: Vec<String>,

    /// Only items that have a parent
    #[arg(long, conflicts_with = "no_parent")]
    pub has_parent: bool,

    /// Only items without a parent
    #[arg(long)]
    pub no_parent: bool,

    /// Only direct children of this item
    #[arg(long, value_name = "ID")]
    pub parent: Option<String>,

    /// Only items that block something
    #[arg(long)]
    pub blocking: bool,

    /// Only items that block this item
    #[arg(long, value_name = "ID")]
    pub blocks: Option<String>,

    /// Only items blocked by an unfinished item
    #[arg(long, conflicts_with = "unblocked")]
    pub blocked: bool,

    /// Only items not blocked by an unfinished item
    #[arg(long)]
    pub unblocked: bool,

    /// Only items ready to work on: not blocked and not finished
    #[arg(long)]
    pub actionable: bool,

    /// Include finished items (hidden unless a status filter is given)
    #[arg(long, short = 'a')]
    pub all: bool,

    // ========== OUTPUT CONTROL ==========
    /// Show matches with their ancestors as a tree
    #[arg(long)]
    pub tree: bool,

    /// Sort by field
    #[arg(long, default_value = "rank")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    /// Status order, then priority order, then age
    #[default]
    Rank,
    Id,
    Title,
    Created,
    Updated,
    Priority,
    Status,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let taxonomy = ws.store.taxonomy();
    let filter = build_filter(&args, &ws.store)?;

    let all = ws.store.all();
    let mut matched = filter.apply(&all, taxonomy);
    let cmp = |a: &Item, b: &Item| {
        let ord = compare(args.sort, taxonomy, a, b);
        if args.reverse {
            ord.reverse()
        } else {
            ord
        }
    };
    matched.sort_by(|a, b| cmp(a, b));
    if let Some(limit) = args.limit {
        matched.truncate(limit);
    }

    if args.count {
        println!("{}", matched.len());
        return Ok(());
    }

    if matched.is_empty() && matches!(global.format, OutputFormat::Auto | OutputFormat::Tsv) {
        if !global.quiet {
            println!("No items found.");
        }
        return Ok(());
    }

    let table = ItemTable::new(taxonomy).quiet(global.quiet);
    if args.tree {
        let forest = build_forest(&matched, &all, cmp);
        table.print_tree(&forest, global.format)
    } else {
        table.print(&matched, global.format)
    }
}

/// Translate flags into a filter, checking categorical values and
/// resolving id prefixes
fn build_filter(args: &ListArgs, store: &ItemStore) -> Result<ItemFilter> {
    let taxonomy = store.taxonomy();

    let mut filter = ItemFilter {
        statuses: checked(&args.status, &taxonomy.statuses)?,
        exclude_statuses: checked(&args.not_status, &taxonomy.statuses)?,
        kinds: checked(&args.r#type, &taxonomy.kinds)?,
        exclude_kinds: checked(&args.not_type, &taxonomy.kinds)?,
        priorities: checked(&args.priority, &taxonomy.priorities)?,
        exclude_priorities: checked(&args.not_priority, &taxonomy.priorities)?,
        tags: split_values(&args.tag),
        exclude_tags: split_values(&args.not_tag),
        has_parent: flag_pair(args.has_parent, args.no_parent),
        has_blocks: args.blocking.then_some(true),
        blocked: flag_pair(args.blocked, args.unblocked),
        actionable: args.actionable,
        ..ItemFilter::default()
    };

    if let Some(parent) = &args.parent {
        filter.parent = Some(store.resolve_id(parent)?);
    }
    if let Some(target) = &args.blocks {
        filter.blocks = Some(store.resolve_id(target)?);
    }

    if !args.all && filter.statuses.is_empty() {
        for status in taxonomy.terminal_statuses() {
            if !filter.exclude_statuses.contains(status) {
                filter.exclude_statuses.push(status.clone());
            }
        }
    }

    Ok(filter)
}

fn checked(values: &[String], category: &Category) -> Result<Vec<String>> {
    let values = split_values(values);
    for value in &values {
        category.validate(value)?;
    }
    Ok(values)
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

fn compare(field: SortField, taxonomy: &Taxonomy, a: &Item, b: &Item) -> Ordering {
    let primary = match field {
        SortField::Rank => return taxonomy.compare(a, b),
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Created => a.created.cmp(&b.created),
        SortField::Updated => a.updated.cmp(&b.updated),
        SortField::Priority => taxonomy
            .priorities
            .rank(&a.priority)
            .cmp(&taxonomy.priorities.rank(&b.priority)),
        SortField::Status => taxonomy
            .statuses
            .rank(&a.status)
            .cmp(&taxonomy.statuses.rank(&b.status)),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::StoreOptions;
    use tempfile::tempdir;

    fn store_with(ids: &[&str]) -> (tempfile::TempDir, ItemStore) {
        let tmp = tempdir().unwrap();
        let store = ItemStore::open(tmp.path(), StoreOptions::default()).unwrap();
        store.load().unwrap();
        for id in ids {
            let mut item = Item::new(*id);
            item.id = id.to_string();
            store.create(item).unwrap();
        }
        (tmp, store)
    }

    #[test]
    fn test_default_hides_terminal_statuses() {
        let (_tmp, store) = store_with(&[]);
        let filter = build_filter(&ListArgs::default(), &store).unwrap();
        assert_eq!(filter.exclude_statuses, vec!["done", "archived"]);

        let all = ListArgs {
            all: true,
            ..ListArgs::default()
        };
        assert!(build_filter(&all, &store).unwrap().exclude_statuses.is_empty());
    }

    #[test]
    fn test_status_filter_shows_terminal() {
        let (_tmp, store) = store_with(&[]);
        let args = ListArgs {
            status: vec!["done,open".to_string()],
            ..ListArgs::default()
        };
        let filter = build_filter(&args, &store).unwrap();
        assert_eq!(filter.statuses, vec!["done", "open"]);
        assert!(filter.exclude_statuses.is_empty());
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let (_tmp, store) = store_with(&[]);
        let args = ListArgs {
            priority: vec!["urgent".to_string()],
            ..ListArgs::default()
        };
        assert!(build_filter(&args, &store).is_err());
    }

    #[test]
    fn test_parent_prefix_is_resolved() {
        let (_tmp, store) = store_with(&["epic1", "task1"]);
        let args = ListArgs {
            parent: Some("ep".to_string()),
            ..ListArgs::default()
        };
        let filter = build_filter(&args, &store).unwrap();
        assert_eq!(filter.parent.as_deref(), Some("epic1"));
    }

    #[test]
    fn test_flag_pair() {
        assert_eq!(flag_pair(false, false), None);
        assert_eq!(flag_pair(true, false), Some(true));
        assert_eq!(flag_pair(false, true), Some(false));
    }
}
