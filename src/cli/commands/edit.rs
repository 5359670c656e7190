//! `tkt edit` command - Change fields or open an item in the editor

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{split_values, Workspace};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::persist;
use crate::entities::Item;

#[derive(clap::Args, Debug, Default)]
pub struct EditArgs {
    /// Item ID (or unique prefix)
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New status
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// New type
    #[arg(long, short = 't')]
    pub r#type: Option<String>,

    /// New priority
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Add tags (repeatable or comma-separated)
    #[arg(long)]
    pub add_tag: Vec<String>,

    /// Remove tags
    #[arg(long)]
    pub remove_tag: Vec<String>,

    /// Replace the body
    #[arg(long, short = 'm')]
    pub body: Option<String>,
}

impl EditArgs {
    fn has_field_changes(&self) -> bool {
        self.title.is_some()
            || self.status.is_some()
            || self.r#type.is_some()
            || self.priority.is_some()
            || !self.add_tag.is_empty()
            || !self.remove_tag.is_empty()
            || self.body.is_some()
    }

    /// Apply the field flags to an item
    fn apply(&self, item: &mut Item) -> Result<()> {
        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(miette::miette!("title must not be empty"));
            }
            item.title = title.to_string();
        }
        if let Some(status) = &self.status {
            item.status = status.clone();
        }
        if let Some(kind) = &self.r#type {
            item.kind = kind.clone();
        }
        if let Some(priority) = &self.priority {
            item.priority = priority.clone();
        }
        for tag in split_values(&self.add_tag) {
            item.tags.insert(tag.to_lowercase());
        }
        for tag in split_values(&self.remove_tag) {
            item.tags.remove(&tag.to_lowercase());
        }
        if let Some(body) = &self.body {
            item.body = body.clone();
        }
        Ok(())
    }
}

pub fn run(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut item = ws.store.get(&args.id)?;

    if args.has_field_changes() {
        args.apply(&mut item)?;
    } else {
        item = edit_in_editor(&ws, &item)?;
    }

    let item = ws.store.update(item)?;

    match global.format {
        OutputFormat::Id => println!("{}", item.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&item).into_diagnostic()?);
        }
        _ if !global.quiet => {
            println!(
                "{} Updated {} {}",
                style("✓").green(),
                style(&item.id).cyan(),
                item.title
            );
        }
        _ => {}
    }
    Ok(())
}

/// Open the item file in the configured editor and read it back
fn edit_in_editor(ws: &Workspace, item: &Item) -> Result<Item> {
    let path = persist::item_path(ws.store.dir(), item);
    if !path.exists() {
        return Err(miette::miette!("File not found: {}", path.display()));
    }

    println!(
        "Opening {} in {}...",
        style(&item.id).cyan(),
        style(ws.config.editor()).yellow()
    );
    let status = ws.config.run_editor(&path).into_diagnostic()?;
    if !status.success() {
        return Err(miette::miette!("editor exited with {}", status));
    }

    let edited = persist::load_item(&path, ws.store.taxonomy())?;
    ws.store.taxonomy().validate(&edited)?;
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        let mut item = Item::new("Original");
        item.id = "ab12".to_string();
        item.tags = ["keep".to_string(), "drop".to_string()].into();
        item
    }

    #[test]
    fn test_no_flags_means_editor() {
        let args = EditArgs {
            id: "ab12".to_string(),
            ..EditArgs::default()
        };
        assert!(!args.has_field_changes());
    }

    #[test]
    fn test_apply_fields() {
        let args = EditArgs {
            id: "ab12".to_string(),
            title: Some("  Renamed ".to_string()),
            status: Some("done".to_string()),
            add_tag: vec!["New,Other".to_string()],
            remove_tag: vec!["drop".to_string()],
            ..EditArgs::default()
        };
        assert!(args.has_field_changes());

        let mut item = item();
        args.apply(&mut item).unwrap();
        assert_eq!(item.title, "Renamed");
        assert_eq!(item.status, "done");
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["keep", "new", "other"]);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let args = EditArgs {
            id: "ab12".to_string(),
            title: Some("   ".to_string()),
            ..EditArgs::default()
        };
        assert!(args.apply(&mut item()).is_err());
    }
}
