//! Hierarchical display of a filtered item set
//!
//! The forest holds every matched item plus the ancestors needed to place
//! it. Ancestors that did not match are kept for context and flagged.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::entities::item::Item;

/// One node of the display forest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub item: Item,
    /// False for ancestors included only for context
    pub matched: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// Build the minimal forest containing `matched` and their ancestors.
///
/// Ancestors are looked up in `all`; the walk stops at a missing parent or
/// one already collected. Siblings are ordered with `cmp`. Parent cycles in
/// the data do not hang the builder: members never reached from a root are
/// added as extra roots.
pub fn build_forest<F>(matched: &[Item], all: &[Item], cmp: F) -> Vec<TreeNode>
where
    F: Fn(&Item, &Item) -> Ordering,
{
    let by_id: HashMap<&str, &Item> = all.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut collected: HashMap<&str, (&Item, bool)> = HashMap::new();
    for item in matched {
        collected.insert(item.id.as_str(), (item, true));
    }
    for item in matched {
        let mut next = item.parent();
        while let Some(parent_id) = next {
            if collected.contains_key(parent_id) {
                break;
            }
            let Some(&parent) = by_id.get(parent_id) else {
                break;
            };
            collected.insert(parent.id.as_str(), (parent, false));
            next = parent.parent();
        }
    }

    let mut children: HashMap<&str, Vec<&Item>> = HashMap::new();
    let mut roots: Vec<&Item> = Vec::new();
    for &(item, _) in collected.values() {
        match item.parent() {
            Some(parent) if parent != item.id && collected.contains_key(parent) => {
                children.entry(parent).or_default().push(item);
            }
            _ => roots.push(item),
        }
    }

    let builder = Builder {
        collected: &collected,
        children: &children,
        cmp: &cmp,
    };
    let mut visited = HashSet::new();

    roots.sort_by(|a, b| cmp(*a, *b));
    let mut forest: Vec<TreeNode> = roots
        .iter()
        .map(|&root| builder.node(root, &mut visited))
        .collect();

    // members of a parent cycle are unreachable from any root
    if visited.len() < collected.len() {
        let mut stranded: Vec<&Item> = collected
            .values()
            .map(|(item, _)| *item)
            .filter(|item| !visited.contains(item.id.as_str()))
            .collect();
        stranded.sort_by(|a, b| cmp(*a, *b));
        for item in stranded {
            if !visited.contains(item.id.as_str()) {
                forest.push(builder.node(item, &mut visited));
            }
        }
    }

    forest
}

struct Builder<'a, F> {
    collected: &'a HashMap<&'a str, (&'a Item, bool)>,
    children: &'a HashMap<&'a str, Vec<&'a Item>>,
    cmp: &'a F,
}

impl<'a, F> Builder<'a, F>
where
    F: Fn(&Item, &Item) -> Ordering,
{
    fn node(&self, item: &'a Item, visited: &mut HashSet<&'a str>) -> TreeNode {
        visited.insert(item.id.as_str());
        let matched = self
            .collected
            .get(item.id.as_str())
            .is_some_and(|(_, matched)| *matched);

        let mut kids: Vec<&Item> = self
            .children
            .get(item.id.as_str())
            .map(|kids| kids.to_vec())
            .unwrap_or_default();
        kids.sort_by(|a, b| (self.cmp)(*a, *b));

        let mut nodes = Vec::with_capacity(kids.len());
        for kid in kids {
            if !visited.contains(kid.id.as_str()) {
                nodes.push(self.node(kid, visited));
            }
        }

        TreeNode {
            item: item.clone(),
            matched,
            children: nodes,
        }
    }
}

/// Depth-first walk in display order, with each node's depth
pub fn flatten(forest: &[TreeNode]) -> Vec<(usize, &TreeNode)> {
    fn walk<'a>(nodes: &'a [TreeNode], depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
        for node in nodes {
            out.push((depth, node));
            walk(&node.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::taxonomy::Taxonomy;

    fn item(id: &str, parent: Option<&str>) -> Item {
        let mut item = Item::new(id);
        item.id = id.to_string();
        item.status = "open".to_string();
        item.priority = "medium".to_string();
        if let Some(parent) = parent {
            item.set_parent(parent);
        }
        item
    }

    fn by_id(a: &Item, b: &Item) -> Ordering {
        a.id.cmp(&b.id)
    }

    fn shape(forest: &[TreeNode]) -> Vec<(usize, String, bool)> {
        flatten(forest)
            .into_iter()
            .map(|(depth, node)| (depth, node.item.id.clone(), node.matched))
            .collect()
    }

    #[test]
    fn test_minimal_ancestor_chain() {
        let all = vec![
            item("m", None),
            item("e", Some("m")),
            item("t", Some("e")),
            item("x", Some("m")),
            item("y", None),
        ];
        let matched = vec![all[2].clone()];

        let forest = build_forest(&matched, &all, by_id);
        assert_eq!(
            shape(&forest),
            vec![
                (0, "m".to_string(), false),
                (1, "e".to_string(), false),
                (2, "t".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_matched_ancestor_stays_matched() {
        let all = vec![item("m", None), item("e", Some("m")), item("t", Some("e"))];
        let matched = vec![all[2].clone(), all[0].clone()];
        let forest = build_forest(&matched, &all, by_id);
        assert_eq!(
            shape(&forest),
            vec![
                (0, "m".to_string(), true),
                (1, "e".to_string(), false),
                (2, "t".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let all = vec![item("a", Some("gone")), item("b", None)];
        let forest = build_forest(&all, &all, by_id);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].item.id, "a");
    }

    #[test]
    fn test_siblings_use_comparator() {
        let mut low = item("a", Some("p"));
        low.priority = "low".to_string();
        let mut high = item("b", Some("p"));
        high.priority = "high".to_string();
        let all = vec![item("p", None), low, high];

        let taxonomy = Taxonomy::default();
        let forest = build_forest(&all, &all, |a, b| taxonomy.compare(a, b));
        let kids: Vec<_> = forest[0].children.iter().map(|n| n.item.id.as_str()).collect();
        assert_eq!(kids, vec!["b", "a"]);
    }

    #[test]
    fn test_parent_cycle_keeps_every_item() {
        let all = vec![item("x", Some("y")), item("y", Some("x")), item("z", None)];
        let forest = build_forest(&all, &all, by_id);
        let total: usize = forest.iter().map(TreeNode::size).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_self_parent_is_root() {
        let all = vec![item("s", Some("s"))];
        let forest = build_forest(&all, &all, by_id);
        assert_eq!(shape(&forest), vec![(0, "s".to_string(), true)]);
    }

    #[test]
    fn test_empty_match() {
        let all = vec![item("a", None)];
        assert!(build_forest(&[], &all, by_id).is_empty());
    }
}
