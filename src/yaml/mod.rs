//! YAML front-matter helpers

pub mod diagnostics;

pub use diagnostics::FrontMatterError;
