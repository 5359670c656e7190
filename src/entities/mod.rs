//! Entity type definitions
//!
//! tkt has a single entity, the [`Item`]: one Markdown file with a YAML
//! header.

pub mod item;

pub use item::Item;
