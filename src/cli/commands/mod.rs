//! CLI command implementations

pub mod completions;
pub mod delete;
pub mod edit;
pub mod init;
pub mod link;
pub mod list;
pub mod new;
pub mod search;
pub mod show;
pub mod watch;
