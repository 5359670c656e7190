//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::StoreError;
use crate::core::identity::{IdGenerator, DEFAULT_ID_LENGTH};
use crate::core::persist::LoadPolicy;
use crate::core::store::StoreOptions;
use crate::core::taxonomy::{Category, Taxonomy};
use crate::core::watcher::DEFAULT_DEBOUNCE;
use crate::core::Project;

/// tkt configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new items
    pub author: Option<String>,

    /// Editor command for `tkt edit`
    pub editor: Option<String>,

    /// Static prefix for generated ids
    pub id_prefix: Option<String>,

    /// Number of random characters in generated ids
    pub id_length: Option<usize>,

    pub statuses: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub priorities: Option<Vec<String>>,
    pub terminal_statuses: Option<Vec<String>>,
    pub default_status: Option<String>,
    pub default_type: Option<String>,
    pub default_priority: Option<String>,

    /// Watcher debounce window in milliseconds
    pub watch_debounce_ms: Option<u64>,

    /// Skip unreadable item files during a load instead of failing it
    pub skip_malformed: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Same as [`Config::load`] but for a known project (or none)
    pub fn load_for(project: Option<&Project>) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/tkt/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.tkt/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(author) = std::env::var("TKT_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(editor) = std::env::var("TKT_EDITOR") {
            config.editor = Some(editor);
        }
        if let Ok(prefix) = std::env::var("TKT_ID_PREFIX") {
            config.id_prefix = Some(prefix);
        }

        config
    }

    /// Parse a config document. A document with only comments is empty.
    pub fn from_yaml(contents: &str) -> Result<Self, StoreError> {
        let has_content = contents.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#') && line != "---"
        });
        if !has_content {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read one config file; a missing file is silently skipped, an invalid
    /// one is skipped with a warning.
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read config file");
                return None;
            }
        };
        match Self::from_yaml(&contents) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tkt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.author, other.author);
        take(&mut self.editor, other.editor);
        take(&mut self.id_prefix, other.id_prefix);
        take(&mut self.id_length, other.id_length);
        take(&mut self.statuses, other.statuses);
        take(&mut self.types, other.types);
        take(&mut self.priorities, other.priorities);
        take(&mut self.terminal_statuses, other.terminal_statuses);
        take(&mut self.default_status, other.default_status);
        take(&mut self.default_type, other.default_type);
        take(&mut self.default_priority, other.default_priority);
        take(&mut self.watch_debounce_ms, other.watch_debounce_ms);
        take(&mut self.skip_malformed, other.skip_malformed);
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        // Try git config
        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        // Fall back to username
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Run the editor on a file, properly handling commands with arguments
    /// (e.g., "emacsclient -nw" or "code --wait")
    pub fn run_editor(&self, file_path: &Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();

        let Some(cmd) = parts.next() else {
            return std::process::Command::new("vi").arg(file_path).status();
        };

        std::process::Command::new(cmd)
            .args(parts)
            .arg(file_path)
            .status()
    }

    /// Categorical lists, falling back to the built-in ones
    pub fn taxonomy(&self) -> Result<Taxonomy, StoreError> {
        let builtin = Taxonomy::default();

        let statuses = category("status", &self.statuses, &self.default_status, &builtin.statuses)?;
        let kinds = category("type", &self.types, &self.default_type, &builtin.kinds)?;
        let priorities = category(
            "priority",
            &self.priorities,
            &self.default_priority,
            &builtin.priorities,
        )?;

        let terminal = match &self.terminal_statuses {
            Some(terminal) => terminal.clone(),
            // keep only built-in terminal statuses that still exist
            None => builtin
                .terminal_statuses()
                .iter()
                .filter(|s| statuses.contains(s))
                .cloned()
                .collect(),
        };

        Taxonomy::new(statuses, kinds, priorities, terminal)
    }

    pub fn id_generator(&self) -> Result<IdGenerator, StoreError> {
        IdGenerator::new(
            self.id_prefix.clone().unwrap_or_default(),
            self.id_length.unwrap_or(DEFAULT_ID_LENGTH),
        )
    }

    pub fn load_policy(&self) -> LoadPolicy {
        if self.skip_malformed.unwrap_or(false) {
            LoadPolicy::Lenient
        } else {
            LoadPolicy::Strict
        }
    }

    pub fn watch_debounce(&self) -> Duration {
        self.watch_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }

    /// Everything an item store needs from configuration
    pub fn store_options(&self) -> Result<StoreOptions, StoreError> {
        Ok(StoreOptions {
            taxonomy: self.taxonomy()?,
            ids: self.id_generator()?,
            load_policy: self.load_policy(),
        })
    }
}

/// Build one category from optional overrides. A configured list without a
/// default uses its first entry.
fn category(
    name: &'static str,
    values: &Option<Vec<String>>,
    default: &Option<String>,
    builtin: &Category,
) -> Result<Category, StoreError> {
    let values = values.clone().unwrap_or_else(|| builtin.values().to_vec());
    let default = match default {
        Some(default) => default.clone(),
        None if values.iter().any(|v| v == builtin.default_value()) => {
            builtin.default_value().to_string()
        }
        None => values.first().cloned().unwrap_or_default(),
    };
    Category::new(name, values, default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        let taxonomy = config.taxonomy().unwrap();
        assert_eq!(taxonomy, Taxonomy::default());
        assert_eq!(config.id_generator().unwrap(), IdGenerator::default());
        assert_eq!(config.load_policy(), LoadPolicy::Strict);
        assert_eq!(config.watch_debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config::from_yaml("author: base\neditor: nano\nid_length: 6\n").unwrap();
        let over = Config::from_yaml("author: over\nskip_malformed: true\n").unwrap();
        base.merge(over);
        assert_eq!(base.author.as_deref(), Some("over"));
        assert_eq!(base.editor.as_deref(), Some("nano"));
        assert_eq!(base.id_length, Some(6));
        assert_eq!(base.load_policy(), LoadPolicy::Lenient);
    }

    #[test]
    fn test_custom_taxonomy() {
        let config = Config::from_yaml(
            "statuses: [todo, doing, closed]\nterminal_statuses: [closed]\npriorities: [p1, p2]\ndefault_priority: p2\n",
        )
        .unwrap();
        let taxonomy = config.taxonomy().unwrap();
        assert_eq!(taxonomy.statuses.default_value(), "todo");
        assert!(taxonomy.is_terminal("closed"));
        assert_eq!(taxonomy.priorities.default_value(), "p2");
        assert_eq!(taxonomy.kinds.default_value(), "task");
    }

    #[test]
    fn test_custom_statuses_drop_unknown_builtin_terminals() {
        let config = Config::from_yaml("statuses: [open, done]\n").unwrap();
        let taxonomy = config.taxonomy().unwrap();
        assert_eq!(taxonomy.terminal_statuses(), &["done".to_string()]);
    }

    #[test]
    fn test_invalid_default_rejected() {
        let config = Config::from_yaml("statuses: [a, b]\ndefault_status: c\n").unwrap();
        assert!(matches!(config.taxonomy(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_invalid_id_prefix_rejected() {
        let config = Config::from_yaml("id_prefix: 'a--b'\n").unwrap();
        assert!(config.id_generator().is_err());
        assert!(config.store_options().is_err());
    }

    #[test]
    fn test_comment_only_document_is_empty() {
        let config = Config::from_yaml(Project::default_config()).unwrap();
        assert!(config.author.is_none());
        assert!(config.statuses.is_none());
        assert!(Config::from_yaml("").unwrap().skip_malformed.is_none());
    }

    #[test]
    fn test_unknown_yaml_is_an_error() {
        assert!(Config::from_yaml("id_length: [not, a, number]\n").is_err());
    }
}
