//! Core module - the item store and everything it is built from

pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod identity;
pub mod links;
pub mod persist;
pub mod project;
pub mod search;
pub mod store;
pub mod taxonomy;
pub mod tree;
pub mod watcher;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use filter::ItemFilter;
pub use identity::{slugify, IdGenerator};
pub use links::{Link, LinkType};
pub use persist::{LoadPolicy, LoadStats};
pub use project::{Project, ProjectError};
pub use search::SearchIndex;
pub use store::{ItemStore, StoreOptions};
pub use taxonomy::{Category, Taxonomy};
pub use tree::{build_forest, flatten, TreeNode};
pub use watcher::{ItemWatcher, StoreEvent};
