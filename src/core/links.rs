//! Link types and single-item edge editing
//!
//! Edges are stored on the source item as an ordered list of
//! `(type, target)` pairs. `parent` is single-valued and forms a forest;
//! `blocks` is many-to-many. Any other type name is carried through as-is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::item::Item;

/// Edge type between two items
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkType {
    /// Hierarchy edge, at most one per item
    Parent,
    /// Source must finish before the target can proceed
    Blocks,
    /// Informational, no semantics
    Related,
    /// Any other type found in a file
    Other(String),
}

impl LinkType {
    pub fn as_str(&self) -> &str {
        match self {
            LinkType::Parent => "parent",
            LinkType::Blocks => "blocks",
            LinkType::Related => "related",
            LinkType::Other(name) => name,
        }
    }

    /// Whether an item can hold at most one edge of this type
    pub fn is_single_valued(&self) -> bool {
        matches!(self, LinkType::Parent)
    }

    /// Label for the reverse direction, used when listing incoming edges
    pub fn reverse_label(&self) -> String {
        match self {
            LinkType::Parent => "child".to_string(),
            LinkType::Blocks => "blocked_by".to_string(),
            LinkType::Related => "related".to_string(),
            LinkType::Other(name) => format!("{}_by", name),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "parent" => LinkType::Parent,
            "blocks" => LinkType::Blocks,
            "related" | "related_to" => LinkType::Related,
            other => LinkType::Other(other.to_string()),
        })
    }
}

impl Serialize for LinkType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinkType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One typed edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: LinkType,
    pub target: String,
}

impl Link {
    pub fn new(kind: LinkType, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

impl Item {
    /// Add an edge. Single-valued types replace the existing edge in place;
    /// duplicates of multi-valued edges are ignored. Returns true if the
    /// item changed.
    pub fn add_link(&mut self, kind: LinkType, target: &str) -> bool {
        if kind.is_single_valued() {
            if let Some(existing) = self.links.iter_mut().find(|l| l.kind == kind) {
                if existing.target == target {
                    return false;
                }
                existing.target = target.to_string();
                return true;
            }
        } else if self
            .links
            .iter()
            .any(|l| l.kind == kind && l.target == target)
        {
            return false;
        }
        self.links.push(Link::new(kind, target));
        true
    }

    /// Remove one edge. Returns true if it existed.
    pub fn remove_link(&mut self, kind: &LinkType, target: &str) -> bool {
        let before = self.links.len();
        self.links
            .retain(|l| !(&l.kind == kind && l.target == target));
        self.links.len() != before
    }

    pub fn set_parent(&mut self, parent: &str) -> bool {
        self.add_link(LinkType::Parent, parent)
    }

    pub fn clear_parent(&mut self) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l.kind != LinkType::Parent);
        self.links.len() != before
    }

    /// Drop every edge pointing at `target`, whatever its type.
    /// Used before deleting `target`, since the store does not cascade.
    pub fn remove_links_to(&mut self, target: &str) -> bool {
        let before = self.links.len();
        self.links.retain(|l| l.target != target);
        self.links.len() != before
    }

    pub fn links_to(&self, target: &str) -> bool {
        self.links.iter().any(|l| l.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_type_parse() {
        assert_eq!("parent".parse::<LinkType>().unwrap(), LinkType::Parent);
        assert_eq!("Blocks".parse::<LinkType>().unwrap(), LinkType::Blocks);
        assert_eq!("related_to".parse::<LinkType>().unwrap(), LinkType::Related);
        assert_eq!(
            "duplicates".parse::<LinkType>().unwrap(),
            LinkType::Other("duplicates".to_string())
        );
    }

    #[test]
    fn test_set_parent_replaces_in_place() {
        let mut item = Item::new("child");
        item.add_link(LinkType::Blocks, "b1");
        assert!(item.set_parent("p1"));
        assert!(item.set_parent("p2"));
        assert!(!item.set_parent("p2"));
        assert_eq!(item.parent(), Some("p2"));
        assert_eq!(item.links.len(), 2);
        assert_eq!(item.links[0].kind, LinkType::Blocks);
    }

    #[test]
    fn test_blocks_ignores_duplicates() {
        let mut item = Item::new("a");
        assert!(item.add_link(LinkType::Blocks, "b1"));
        assert!(!item.add_link(LinkType::Blocks, "b1"));
        assert!(item.add_link(LinkType::Blocks, "b2"));
        assert_eq!(item.blocks().count(), 2);
    }

    #[test]
    fn test_remove_links_to() {
        let mut item = Item::new("a");
        item.set_parent("x");
        item.add_link(LinkType::Blocks, "x");
        item.add_link(LinkType::Related, "y");
        assert!(item.remove_links_to("x"));
        assert_eq!(item.links, vec![Link::new(LinkType::Related, "y")]);
        assert!(!item.remove_links_to("x"));
    }

    #[test]
    fn test_clear_parent() {
        let mut item = Item::new("a");
        assert!(!item.clear_parent());
        item.set_parent("p");
        assert!(item.clear_parent());
        assert_eq!(item.parent(), None);
    }

    #[test]
    fn test_reverse_label() {
        assert_eq!(LinkType::Blocks.reverse_label(), "blocked_by");
        assert_eq!(LinkType::Parent.reverse_label(), "child");
    }
}
