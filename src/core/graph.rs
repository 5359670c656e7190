//! Relationship graph queries
//!
//! Everything here works on a snapshot slice and is recomputed per call.
//! Dangling edges (targets not in the slice) are treated as absent.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::error::StoreError;
use crate::core::taxonomy::Taxonomy;
use crate::entities::item::Item;

/// Map of parent id -> ids of its direct children
pub fn children_index(items: &[Item]) -> HashMap<&str, Vec<&str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in items {
        if let Some(parent) = item.parent() {
            index.entry(parent).or_default().push(item.id.as_str());
        }
    }
    index
}

/// Every item below `id` in the parent hierarchy.
///
/// Breadth-first over inverted parent edges. Terminates on cyclic data; in
/// that case `id` itself appears in the result.
pub fn descendants(items: &[Item], id: &str) -> HashSet<String> {
    let children = children_index(items);
    let mut found = HashSet::new();
    let mut queue = VecDeque::from([id]);

    while let Some(current) = queue.pop_front() {
        for &child in children.get(current).into_iter().flatten() {
            if found.insert(child.to_string()) {
                queue.push_back(child);
            }
        }
    }
    found
}

/// Check that `candidate` may become the parent of every item in
/// `children`.
///
/// Rejected when the candidate is one of the children (self-reference or
/// another member of the same batch) or lies below any of them.
pub fn check_parent_assignment(
    items: &[Item],
    children: &[&str],
    candidate: &str,
) -> Result<(), StoreError> {
    if children.contains(&candidate) {
        return Err(StoreError::Validation(if children.len() == 1 {
            format!("'{}' cannot be its own parent", candidate)
        } else {
            format!(
                "'{}' is being reassigned in the same batch and cannot be a parent",
                candidate
            )
        }));
    }

    for child in children {
        if descendants(items, child).contains(candidate) {
            return Err(StoreError::Validation(format!(
                "'{}' is a descendant of '{}'; making it the parent would create a cycle",
                candidate, child
            )));
        }
    }
    Ok(())
}

/// Items that could become the parent of every item in `children`
pub fn parent_candidates<'a>(items: &'a [Item], children: &[&str]) -> Vec<&'a Item> {
    let excluded: HashSet<&str> = children.iter().copied().collect();
    let below: Vec<HashSet<String>> = children
        .iter()
        .map(|child| descendants(items, child))
        .collect();

    items
        .iter()
        .filter(|item| {
            !excluded.contains(item.id.as_str()) && !below.iter().any(|d| d.contains(&item.id))
        })
        .collect()
}

/// An item cannot block itself; anything else is allowed
pub fn check_blocks_assignment(blocker: &str, target: &str) -> Result<(), StoreError> {
    if blocker == target {
        return Err(StoreError::Validation(format!(
            "'{}' cannot block itself",
            blocker
        )));
    }
    Ok(())
}

/// Ids that have at least one incoming `blocks` edge from a non-terminal
/// item in the slice. One hop only.
pub fn blocked_ids(items: &[Item], taxonomy: &Taxonomy) -> HashSet<String> {
    items
        .iter()
        .filter(|item| !taxonomy.is_terminal(&item.status))
        .flat_map(|item| item.blocks())
        .map(str::to_string)
        .collect()
}

/// Items with a `blocks` edge pointing at `id`, whatever their status
pub fn blockers_of<'a>(items: &'a [Item], id: &str) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|item| item.blocks().any(|target| target == id))
        .collect()
}

/// Direct children of `id`
pub fn children_of<'a>(items: &'a [Item], id: &str) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|item| item.parent() == Some(id))
        .collect()
}
