//! Structured item filter
//!
//! Lists within one category are OR-ed; categories are AND-ed. Empty lists
//! and `None` mean "no constraint".

use std::collections::HashSet;

use crate::core::graph;
use crate::core::taxonomy::Taxonomy;
use crate::entities::item::Item;

/// Predicates for narrowing a set of items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub statuses: Vec<String>,
    pub exclude_statuses: Vec<String>,
    pub kinds: Vec<String>,
    pub exclude_kinds: Vec<String>,
    pub priorities: Vec<String>,
    pub exclude_priorities: Vec<String>,

    /// Any of these tags
    pub tags: Vec<String>,
    /// None of these tags
    pub exclude_tags: Vec<String>,

    pub has_parent: Option<bool>,
    /// Parent is exactly this id
    pub parent: Option<String>,

    /// Has at least one outgoing `blocks` edge
    pub has_blocks: Option<bool>,
    /// Blocks exactly this id
    pub blocks: Option<String>,

    /// Blocked by a non-terminal item (one hop)
    pub blocked: Option<bool>,
    /// Not blocked and not in a terminal status
    pub actionable: bool,
}

/// Per-call context derived from the whole slice
struct Context<'a> {
    taxonomy: &'a Taxonomy,
    blocked: HashSet<String>,
}

impl ItemFilter {
    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Items from `items` passing every predicate, in input order.
    ///
    /// Blocking is judged against `items` itself, so pass the full set when
    /// that matters.
    pub fn apply(&self, items: &[Item], taxonomy: &Taxonomy) -> Vec<Item> {
        let ctx = self.context(items, taxonomy);
        items
            .iter()
            .filter(|item| self.matches_in(item, &ctx))
            .cloned()
            .collect()
    }

    /// Whether one item passes, judging blocking against `items`
    pub fn matches(&self, item: &Item, items: &[Item], taxonomy: &Taxonomy) -> bool {
        self.matches_in(item, &self.context(items, taxonomy))
    }

    fn context<'a>(&self, items: &[Item], taxonomy: &'a Taxonomy) -> Context<'a> {
        let blocked = if self.blocked.is_some() || self.actionable {
            graph::blocked_ids(items, taxonomy)
        } else {
            HashSet::new()
        };
        Context { taxonomy, blocked }
    }

    fn matches_in(&self, item: &Item, ctx: &Context<'_>) -> bool {
        if !one_of(&self.statuses, &item.status) || none_of(&self.exclude_statuses, &item.status) {
            return false;
        }
        if !one_of(&self.kinds, &item.kind) || none_of(&self.exclude_kinds, &item.kind) {
            return false;
        }
        if !one_of(&self.priorities, &item.priority)
            || none_of(&self.exclude_priorities, &item.priority)
        {
            return false;
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|t| item.has_tag(t)) {
            return false;
        }
        if self.exclude_tags.iter().any(|t| item.has_tag(t)) {
            return false;
        }

        if let Some(want) = self.has_parent {
            if item.parent().is_some() != want {
                return false;
            }
        }
        if let Some(parent) = &self.parent {
            if item.parent() != Some(parent.as_str()) {
                return false;
            }
        }

        if let Some(want) = self.has_blocks {
            if item.blocks().next().is_some() != want {
                return false;
            }
        }
        if let Some(target) = &self.blocks {
            if !item.blocks().any(|b| b == target) {
                return false;
            }
        }

        let is_blocked = ctx.blocked.contains(&item.id);
        if let Some(want) = self.blocked {
            if is_blocked != want {
                return false;
            }
        }
        if self.actionable && (is_blocked || ctx.taxonomy.is_terminal(&item.status)) {
            return false;
        }

        true
    }
}

/// Empty list allows everything
fn one_of(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|v| v == value)
}

/// True when `value` is explicitly excluded
fn none_of(excluded: &[String], value: &str) -> bool {
    excluded.iter().any(|v| v == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::links::LinkType;

    fn item(id: &str, status: &str, kind: &str, priority: &str, tags: &[&str]) -> Item {
        let mut item = Item::new(id);
        item.id = id.to_string();
        item.status = status.to_string();
        item.kind = kind.to_string();
        item.priority = priority.to_string();
        item.tags = tags.iter().map(|t| t.to_string()).collect();
        item
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn fixture() -> Vec<Item> {
        let mut epic = item("e1", "open", "epic", "high", &["ui"]);
        epic.add_link(LinkType::Blocks, "t2");
        let mut task = item("t1", "in-progress", "task", "medium", &["ui", "perf"]);
        task.set_parent("e1");
        let task2 = item("t2", "open", "task", "low", &[]);
        let mut done = item("d1", "done", "bug", "critical", &["perf"]);
        done.add_link(LinkType::Blocks, "t1");
        vec![epic, task, task2, done]
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let items = fixture();
        let filter = ItemFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&items, &Taxonomy::default()).len(), 4);
    }

    #[test]
    fn test_or_within_and_across() {
        let items = fixture();
        let filter = ItemFilter {
            statuses: strings(&["open", "in-progress"]),
            kinds: strings(&["task"]),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&filter.apply(&items, &Taxonomy::default())), vec!["t1", "t2"]);
    }

    #[test]
    fn test_exclusions() {
        let items = fixture();
        let filter = ItemFilter {
            exclude_statuses: strings(&["done"]),
            exclude_priorities: strings(&["low"]),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&filter.apply(&items, &Taxonomy::default())), vec!["e1", "t1"]);
    }

    #[test]
    fn test_tags_any_and_none() {
        let items = fixture();
        let filter = ItemFilter {
            tags: strings(&["perf", "missing"]),
            exclude_tags: strings(&["UI"]),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&filter.apply(&items, &Taxonomy::default())), vec!["d1"]);
    }

    #[test]
    fn test_parent_predicates() {
        let items = fixture();
        let taxonomy = Taxonomy::default();
        let with_parent = ItemFilter {
            has_parent: Some(true),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&with_parent.apply(&items, &taxonomy)), vec!["t1"]);

        let under_e1 = ItemFilter {
            parent: Some("e1".to_string()),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&under_e1.apply(&items, &taxonomy)), vec!["t1"]);

        let roots = ItemFilter {
            has_parent: Some(false),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&roots.apply(&items, &taxonomy)), vec!["e1", "t2", "d1"]);
    }

    #[test]
    fn test_blocks_predicates() {
        let items = fixture();
        let taxonomy = Taxonomy::default();
        let blockers = ItemFilter {
            has_blocks: Some(true),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&blockers.apply(&items, &taxonomy)), vec!["e1", "d1"]);

        let blocks_t2 = ItemFilter {
            blocks: Some("t2".to_string()),
            ..ItemFilter::default()
        };
        assert_eq!(ids(&blocks_t2.apply(&items, &taxonomy)), vec!["e1"]);
    }

    #[test]
    fn test_blocked_ignores_terminal_blockers() {
        let items = fixture();
        let blocked = ItemFilter {
            blocked: Some(true),
            ..ItemFilter::default()
        };
        // t1 is blocked only by d1, which is done
        assert_eq!(ids(&blocked.apply(&items, &Taxonomy::default())), vec!["t2"]);
    }

    #[test]
    fn test_actionable() {
        let items = fixture();
        let filter = ItemFilter {
            actionable: true,
            ..ItemFilter::default()
        };
        assert_eq!(ids(&filter.apply(&items, &Taxonomy::default())), vec!["e1", "t1"]);
    }

    #[test]
    fn test_matches_single_item() {
        let items = fixture();
        let filter = ItemFilter {
            blocked: Some(false),
            ..ItemFilter::default()
        };
        assert!(filter.matches(&items[0], &items, &Taxonomy::default()));
        assert!(!filter.matches(&items[2], &items, &Taxonomy::default()));
    }
}
