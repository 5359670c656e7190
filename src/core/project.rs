//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project metadata directory
pub const PROJECT_DIR: &str = ".tkt";

/// Represents a tkt project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .tkt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Nearest directory at or above `start` that holds a `.tkt/` directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let start_abs = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        start_abs
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(|root| Self {
                root: root.to_path_buf(),
            })
            .ok_or_else(|| ProjectError::NotFound {
                searched_from: start.to_path_buf(),
            })
    }

    /// Create `.tkt/` with an empty items directory and a commented config
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = absolute(path);
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create_structure(root)
    }

    /// Initialize even if .tkt/ exists. Existing items are left alone; the
    /// config file is rewritten.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        Self::create_structure(absolute(path))
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.items_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(project)
    }

    pub(crate) fn default_config() -> &'static str {
        r#"# tkt project configuration

# Default author for new items (can be overridden by global config)
# author: ""

# Editor to use for `tkt edit` (default: $EDITOR)
# editor: ""

# Generated ids: prefix plus this many random characters
# id_prefix: ""
# id_length: 4

# Allowed values, in display order
# statuses: [open, in-progress, review, done, archived]
# types: [task, bug, feature, epic, chore]
# priorities: [critical, high, medium, low]
# terminal_statuses: [done, archived]
# default_status: open
# default_type: task
# default_priority: medium

# Quiet period before `tkt watch` reloads after a change
# watch_debounce_ms: 50

# Skip unreadable item files instead of failing the whole load
# skip_malformed: false
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .tkt configuration directory
    pub fn tkt_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Project config file
    pub fn config_path(&self) -> PathBuf {
        self.tkt_dir().join("config.yaml")
    }

    /// Backing directory holding one file per item
    pub fn items_dir(&self) -> PathBuf {
        self.tkt_dir().join("items")
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a tkt project (searched from {searched_from:?}). Run 'tkt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("tkt project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.tkt_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.items_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_init_force_keeps_items() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let item = project.items_dir().join("ab12.md");
        std::fs::write(&item, "---\ntitle: keep me\n---\n").unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert!(item.exists());
    }

    #[test]
    fn test_project_discover_finds_tkt_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_tkt_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
