//! Store error taxonomy

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::yaml::FrontMatterError;

/// Errors produced by the item store and its collaborators
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("no item matches '{0}'")]
    #[diagnostic(code(tkt::store::not_found))]
    NotFound(String),

    #[error("'{prefix}' is ambiguous: matches {}", .matches.join(", "))]
    #[diagnostic(
        code(tkt::store::ambiguous_id),
        help("type more characters of the id to pick one item")
    )]
    AmbiguousId { prefix: String, matches: Vec<String> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] Box<FrontMatterError>),

    #[error("failed to read {path:?}")]
    #[diagnostic(code(tkt::store::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}")]
    #[diagnostic(code(tkt::store::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    #[diagnostic(code(tkt::store::validation))]
    Validation(String),

    #[error("search failed: {0}")]
    #[diagnostic(code(tkt::store::search))]
    Search(String),

    #[error("failed to watch item directory")]
    #[diagnostic(code(tkt::store::watch))]
    Watch(#[from] notify::Error),

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(tkt::config::invalid))]
    Config(String),
}

impl StoreError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Write {
            path: path.into(),
            source,
        }
    }

    /// True for lookups that found nothing (as opposed to I/O or parse failures)
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<FrontMatterError> for StoreError {
    fn from(err: FrontMatterError) -> Self {
        StoreError::Parse(Box::new(err))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Search(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
