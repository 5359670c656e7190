//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, ItemStore, Project};

/// Everything a command needs: the project, its layered config and a
/// loaded store
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: ItemStore,
}

impl Workspace {
    /// Find the project (from `--project` or the current directory), load
    /// config and read every item
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load_for(Some(&project));
        let store = ItemStore::open(project.items_dir(), config.store_options()?)?;
        store.load()?;

        Ok(Self {
            project,
            config,
            store,
        })
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Split comma-separated values given to a repeatable flag
///
/// `--tag a,b --tag c` and `--tag a --tag b,c` both give `[a, b, c]`.
pub fn split_values(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("ünïcödé text", 6), "ünï...");
    }

    #[test]
    fn test_split_values() {
        let values = vec!["a,b".to_string(), " c ".to_string(), ",".to_string()];
        assert_eq!(split_values(&values), vec!["a", "b", "c"]);
    }
}
