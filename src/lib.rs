//! tkt: plain-file item tracking
//!
//! Items (tasks, bugs, epics, ...) live as Markdown files with a YAML
//! header in `.tkt/items/`. The [`core::ItemStore`] keeps them in memory,
//! writes through to disk, searches them and, with [`core::ItemWatcher`],
//! follows edits made by other programs.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
