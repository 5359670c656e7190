//! Item entity type
//!
//! An item is one Markdown file: a YAML header between `---` lines followed
//! by a free-text body. The id and short name live in the filename, not the
//! header.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::links::{Link, LinkType};
use crate::core::taxonomy::Taxonomy;
use crate::yaml::FrontMatterError;

const DELIMITER: &str = "---";

/// A tracked item (issue, task, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Unique identifier, taken from the filename
    pub id: String,

    /// Slug of the title at creation time, used only in the filename
    pub short_name: Option<String>,

    /// One-line title
    pub title: String,

    /// Workflow state
    pub status: String,

    /// Item type (task, bug, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Urgency
    pub priority: String,

    /// Lowercase free-form tags
    pub tags: BTreeSet<String>,

    /// Typed edges to other items, in file order
    pub links: Vec<Link>,

    /// Who created the item
    pub author: Option<String>,

    /// Creation timestamp, never changed by updates
    pub created: DateTime<Utc>,

    /// Last successful write
    pub updated: DateTime<Utc>,

    /// Markdown body
    pub body: String,
}

/// On-disk header. Every field is optional so that hand-written files load.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    links: Vec<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated: Option<DateTime<Utc>>,
}

impl Item {
    /// Create an unsaved item. Categorical fields are left empty so the
    /// store fills them from the configured defaults.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            short_name: None,
            title: title.into(),
            status: String::new(),
            kind: String::new(),
            priority: String::new(),
            tags: BTreeSet::new(),
            links: Vec::new(),
            author: None,
            created: now,
            updated: now,
            body: String::new(),
        }
    }

    /// Parse file contents.
    ///
    /// Absent categorical fields get the taxonomy defaults, an absent
    /// `created` gets `fallback_time`, an absent `updated` gets `created`.
    /// `id` and `short_name` are left empty for the caller to fill from the
    /// filename.
    pub fn parse(
        text: &str,
        filename: &str,
        taxonomy: &Taxonomy,
        fallback_time: DateTime<Utc>,
    ) -> Result<Self, FrontMatterError> {
        let (header, body) = split_front_matter(text).map_err(|split| match split {
            Split::Missing => FrontMatterError::missing_header(text, filename),
            Split::Unterminated => FrontMatterError::unterminated_header(text, filename),
        })?;

        let front: FrontMatter = if header.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yml::from_str(header)
                .map_err(|e| FrontMatterError::from_serde_error(&e, text, filename, 2))?
        };

        let created = front.created.unwrap_or(fallback_time);
        let updated = front.updated.unwrap_or(created).max(created);

        let mut item = Self {
            id: String::new(),
            short_name: None,
            title: front.title,
            status: front.status.unwrap_or_default(),
            kind: front.kind.unwrap_or_default(),
            priority: front.priority.unwrap_or_default(),
            tags: front.tags,
            links: front.links,
            author: front.author,
            created,
            updated,
            body: body.to_string(),
        };
        taxonomy.apply_defaults(&mut item);
        item.normalize_tags();
        Ok(item)
    }

    /// Render file contents. Non-empty bodies are separated from the header
    /// by a blank line, so a body without a leading newline gains one.
    pub fn render(&self) -> Result<String, serde_yml::Error> {
        let front = FrontMatter {
            title: self.title.clone(),
            status: Some(self.status.clone()),
            kind: Some(self.kind.clone()),
            priority: Some(self.priority.clone()),
            tags: self.tags.clone(),
            links: self.links.clone(),
            author: self.author.clone(),
            created: Some(self.created),
            updated: Some(self.updated),
        };
        let header = serde_yml::to_string(&front)?;

        let mut out = String::with_capacity(header.len() + self.body.len() + 16);
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&header);
        if !header.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        if !self.body.is_empty() {
            if !self.body.starts_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.body);
        }
        Ok(out)
    }

    /// Lowercase, trim and drop empty tags
    pub fn normalize_tags(&mut self) {
        self.tags = self
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_lowercase())
    }

    /// Target of the `parent` edge, if any
    pub fn parent(&self) -> Option<&str> {
        self.links_of(&LinkType::Parent).next()
    }

    /// Targets of outgoing `blocks` edges
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.links_of(&LinkType::Blocks)
    }

    /// Targets of edges of the given type, in file order
    pub fn links_of<'a>(&'a self, kind: &LinkType) -> impl Iterator<Item = &'a str> + 'a {
        let kind = kind.clone();
        self.links
            .iter()
            .filter(move |l| l.kind == kind)
            .map(|l| l.target.as_str())
    }
}

enum Split {
    Missing,
    Unterminated,
}

/// Split `---\n<header>---\n<body>` into header and body
fn split_front_matter(text: &str) -> Result<(&str, &str), Split> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
        .ok_or(Split::Missing)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            return Ok((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(Split::Unterminated)
}
