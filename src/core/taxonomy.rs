//! Categorical values supplied by configuration
//!
//! Statuses, types and priorities are opaque ordered lists. The store only
//! checks membership; list order drives display ordering.

use std::cmp::Ordering;

use crate::core::error::StoreError;
use crate::entities::item::Item;

/// One ordered enumeration of allowed values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: &'static str,
    values: Vec<String>,
    default: String,
}

impl Category {
    /// Build a category; the default must be one of the values
    pub fn new(
        name: &'static str,
        values: Vec<String>,
        default: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let default = default.into();
        if values.is_empty() {
            return Err(StoreError::Config(format!("no {} values configured", name)));
        }
        if !values.contains(&default) {
            return Err(StoreError::Config(format!(
                "default {} '{}' is not one of: {}",
                name,
                default,
                values.join(", ")
            )));
        }
        Ok(Self {
            name,
            values,
            default,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Position in the configured order; unknown values sort last
    pub fn rank(&self, value: &str) -> usize {
        self.values
            .iter()
            .position(|v| v == value)
            .unwrap_or(self.values.len())
    }

    pub fn validate(&self, value: &str) -> Result<(), StoreError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(StoreError::Validation(format!(
                "invalid {} '{}' (valid: {})",
                self.name,
                value,
                self.values.join(", ")
            )))
        }
    }
}

/// The full set of categorical lists used by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    pub statuses: Category,
    pub kinds: Category,
    pub priorities: Category,
    terminal: Vec<String>,
}

impl Taxonomy {
    pub fn new(
        statuses: Category,
        kinds: Category,
        priorities: Category,
        terminal: Vec<String>,
    ) -> Result<Self, StoreError> {
        if let Some(unknown) = terminal.iter().find(|s| !statuses.contains(s)) {
            return Err(StoreError::Config(format!(
                "terminal status '{}' is not a configured status",
                unknown
            )));
        }
        Ok(Self {
            statuses,
            kinds,
            priorities,
            terminal,
        })
    }

    /// Statuses that mean the item is finished or archived
    pub fn terminal_statuses(&self) -> &[String] {
        &self.terminal
    }

    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal.iter().any(|s| s == status)
    }

    /// Check every categorical field of an item
    pub fn validate(&self, item: &Item) -> Result<(), StoreError> {
        self.statuses.validate(&item.status)?;
        self.kinds.validate(&item.kind)?;
        self.priorities.validate(&item.priority)?;
        Ok(())
    }

    /// Fill empty categorical fields with their defaults
    pub fn apply_defaults(&self, item: &mut Item) {
        if item.status.is_empty() {
            item.status = self.statuses.default_value().to_string();
        }
        if item.kind.is_empty() {
            item.kind = self.kinds.default_value().to_string();
        }
        if item.priority.is_empty() {
            item.priority = self.priorities.default_value().to_string();
        }
    }

    /// Display ordering: status, then priority, then age, then id
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        self.statuses
            .rank(&a.status)
            .cmp(&self.statuses.rank(&b.status))
            .then_with(|| {
                self.priorities
                    .rank(&a.priority)
                    .cmp(&self.priorities.rank(&b.priority))
            })
            .then_with(|| a.created.cmp(&b.created))
            .then_with(|| a.id.cmp(&b.id))
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            statuses: Category {
                name: "status",
                values: owned(&["open", "in-progress", "review", "done", "archived"]),
                default: "open".to_string(),
            },
            kinds: Category {
                name: "type",
                values: owned(&["task", "bug", "feature", "epic", "chore"]),
                default: "task".to_string(),
            },
            priorities: Category {
                name: "priority",
                values: owned(&["critical", "high", "medium", "low"]),
                default: "medium".to_string(),
            },
            terminal: owned(&["done", "archived"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_rejects_unknown_default() {
        let err = Category::new("status", owned(&["open"]), "closed").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_validate_reports_valid_values() {
        let taxonomy = Taxonomy::default();
        let err = taxonomy.statuses.validate("wontfix").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("wontfix"));
        assert!(msg.contains("in-progress"));
    }

    #[test]
    fn test_rank_unknown_sorts_last() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.priorities.rank("critical"), 0);
        assert_eq!(taxonomy.priorities.rank("nope"), 4);
    }

    #[test]
    fn test_terminal_must_be_known_status() {
        let t = Taxonomy::default();
        let err = Taxonomy::new(t.statuses, t.kinds, t.priorities, owned(&["closed"])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_is_terminal() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.is_terminal("done"));
        assert!(!taxonomy.is_terminal("open"));
    }
}
