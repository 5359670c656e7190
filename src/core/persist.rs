//! Item file persistence
//!
//! One Markdown file per item, directly inside the backing directory.
//! Filenames carry the id and optional short name:
//! `{id}--{short_name}.md` or `{id}.md`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::core::error::StoreError;
use crate::core::identity::NAME_SEPARATOR;
use crate::core::taxonomy::Taxonomy;
use crate::entities::item::Item;

/// Suffix of item files
pub const ITEM_SUFFIX: &str = ".md";

/// What to do with a file that fails to parse during a directory load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Abort the whole load on the first bad file
    #[default]
    Strict,
    /// Skip bad files with a warning
    Lenient,
}

/// Statistics from a directory load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files_scanned: usize,
    pub items_loaded: usize,
    pub files_skipped: usize,
    pub duration_ms: u64,
}

/// Compose a filename from id and short name
pub fn build_filename(id: &str, short_name: Option<&str>) -> String {
    match short_name {
        Some(name) if !name.is_empty() => {
            format!("{}{}{}{}", id, NAME_SEPARATOR, name, ITEM_SUFFIX)
        }
        _ => format!("{}{}", id, ITEM_SUFFIX),
    }
}

/// Split a filename into id and short name. Returns `None` for anything that
/// is not an item file.
pub fn parse_filename(name: &str) -> Option<(String, Option<String>)> {
    if name.starts_with('.') {
        return None;
    }
    let stem = name.strip_suffix(ITEM_SUFFIX)?;
    match stem.split_once(NAME_SEPARATOR) {
        Some((id, short)) if !id.is_empty() => {
            let short = (!short.is_empty()).then(|| short.to_string());
            Some((id.to_string(), short))
        }
        Some(_) => None,
        None if stem.is_empty() => None,
        None => Some((stem.to_string(), None)),
    }
}

/// Whether a path looks like an item file
pub fn is_item_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_filename)
        .is_some()
}

/// Path an item is stored at
pub fn item_path(dir: &Path, item: &Item) -> PathBuf {
    dir.join(build_filename(&item.id, item.short_name.as_deref()))
}

/// Load one item file, taking id and short name from the filename
pub fn load_item(path: &Path, taxonomy: &Taxonomy) -> Result<Item, StoreError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let (id, short_name) = parse_filename(&filename).ok_or_else(|| {
        StoreError::read(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not an item filename"),
        )
    })?;

    let content = fs::read_to_string(path).map_err(|e| StoreError::read(path, e))?;
    let fallback = file_mtime(path).unwrap_or_else(Utc::now);

    let mut item = Item::parse(&content, &filename, taxonomy, fallback)?;
    item.id = id;
    item.short_name = short_name;
    Ok(item)
}

/// Write an item atomically (temp file, then rename)
pub fn save_item(dir: &Path, item: &Item) -> Result<PathBuf, StoreError> {
    let path = item_path(dir, item);
    let content = item
        .render()
        .map_err(|e| StoreError::write(&path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    let tmp = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("item")
    ));
    fs::write(&tmp, content).map_err(|e| StoreError::write(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::write(&path, e));
    }
    Ok(path)
}

/// Remove an item's file. A file that is already gone is not an error.
pub fn remove_item(dir: &Path, item: &Item) -> Result<(), StoreError> {
    let path = item_path(dir, item);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::write(&path, e)),
    }
}

/// Load every item file directly inside `dir` (not recursive)
pub fn load_dir(
    dir: &Path,
    taxonomy: &Taxonomy,
    policy: LoadPolicy,
) -> Result<(HashMap<String, Item>, LoadStats), StoreError> {
    let start = Instant::now();
    let mut stats = LoadStats::default();
    let mut items = HashMap::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            StoreError::read(path, e.into())
        })?;
        if !entry.file_type().is_file() || !is_item_file(entry.path()) {
            continue;
        }

        stats.files_scanned += 1;
        match load_item(entry.path(), taxonomy) {
            Ok(item) => {
                if let Some(previous) = items.insert(item.id.clone(), item) {
                    tracing::warn!(
                        id = %previous.id,
                        path = %entry.path().display(),
                        "duplicate item id on disk; keeping the last file read"
                    );
                } else {
                    stats.items_loaded += 1;
                }
            }
            Err(err) if policy == LoadPolicy::Lenient => {
                tracing::warn!(path = %entry.path().display(), error = %err, "skipping unreadable item file");
                stats.files_skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok((items, stats))
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    use crate::core::links::LinkType;

    fn sample(id: &str) -> Item {
        let mut item = Item::new("Write the docs");
        item.id = id.to_string();
        item.short_name = Some("write-the-docs".to_string());
        item.status = "open".to_string();
        item.kind = "task".to_string();
        item.priority = "low".to_string();
        item.tags.insert("docs".to_string());
        item.set_parent("p1");
        item.add_link(LinkType::Blocks, "b1");
        item.created = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        item.updated = Utc.with_ymd_and_hms(2025, 2, 2, 0, 0, 0).unwrap();
        item.body = "Body text".to_string();
        item
    }

    #[test]
    fn test_filename_roundtrip() {
        assert_eq!(build_filename("ab12", Some("fix-it")), "ab12--fix-it.md");
        assert_eq!(build_filename("ab12", None), "ab12.md");
        assert_eq!(
            parse_filename("ab12--fix-it.md"),
            Some(("ab12".to_string(), Some("fix-it".to_string())))
        );
        assert_eq!(parse_filename("ab12.md"), Some(("ab12".to_string(), None)));
        assert_eq!(
            parse_filename("tk-ab12--a--b.md"),
            Some(("tk-ab12".to_string(), Some("a--b".to_string())))
        );
    }

    #[test]
    fn test_parse_filename_rejects_non_items() {
        assert_eq!(parse_filename("notes.txt"), None);
        assert_eq!(parse_filename(".ab12.md.tmp"), None);
        assert_eq!(parse_filename(".hidden.md"), None);
        assert_eq!(parse_filename(".md"), None);
        assert_eq!(parse_filename("--slug.md"), None);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let item = sample("ab12");
        let path = save_item(dir.path(), &item).unwrap();
        assert_eq!(path, dir.path().join("ab12--write-the-docs.md"));

        let loaded = load_item(&path, &Taxonomy::default()).unwrap();
        assert_eq!(loaded.id, item.id);
        assert_eq!(loaded.short_name, item.short_name);
        assert_eq!(loaded.links, item.links);
        assert_eq!(loaded.tags, item.tags);
        assert_eq!(loaded.created, item.created);
        assert_eq!(loaded.updated, item.updated);
        assert_eq!(loaded.body.trim_start_matches('\n'), item.body);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        save_item(dir.path(), &sample("ab12")).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["ab12--write-the-docs.md".to_string()]);
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        assert!(remove_item(dir.path(), &sample("zz99")).is_ok());
    }

    #[test]
    fn test_load_dir_ignores_other_entries() {
        let dir = tempdir().unwrap();
        save_item(dir.path(), &sample("ab12")).unwrap();
        fs::write(dir.path().join("README.txt"), "not an item").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        save_item(&dir.path().join("nested"), &sample("cd34")).unwrap();

        let (items, stats) = load_dir(dir.path(), &Taxonomy::default(), LoadPolicy::Strict).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items.contains_key("ab12"));
        assert_eq!(stats.files_scanned, 1);
    }

    #[test]
    fn test_load_dir_strict_aborts_on_bad_file() {
        let dir = tempdir().unwrap();
        save_item(dir.path(), &sample("ab12")).unwrap();
        fs::write(dir.path().join("bad1.md"), "no header").unwrap();

        let result = load_dir(dir.path(), &Taxonomy::default(), LoadPolicy::Strict);
        assert!(matches!(result, Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_load_dir_lenient_skips_bad_file() {
        let dir = tempdir().unwrap();
        save_item(dir.path(), &sample("ab12")).unwrap();
        fs::write(dir.path().join("bad1.md"), "no header").unwrap();

        let (items, stats) =
            load_dir(dir.path(), &Taxonomy::default(), LoadPolicy::Lenient).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_scanned, 2);
    }

    #[test]
    fn test_load_dir_missing_directory_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = load_dir(&missing, &Taxonomy::default(), LoadPolicy::Strict);
        assert!(matches!(result, Err(StoreError::Read { .. })));
    }

    #[test]
    fn test_load_defaults_created_from_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ef56.md");
        fs::write(&path, "---\ntitle: Hand written\n---\n").unwrap();
        let item = load_item(&path, &Taxonomy::default()).unwrap();
        assert_eq!(item.id, "ef56");
        assert_eq!(item.short_name, None);
        assert_eq!(item.status, "open");
        assert!(item.created <= Utc::now());
        assert_eq!(item.created, item.updated);
    }
}
