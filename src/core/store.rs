//! In-memory item store with write-through persistence
//!
//! `ItemStore` owns the authoritative map of id -> item for one backing
//! directory. Every mutation writes the file first and only then touches
//! memory, so the map never claims a state the disk does not have.
//!
//! A full-text index is kept alongside as derived data: built lazily on the
//! first search, updated on each mutation, rebuilt on reload. Index errors
//! are logged and otherwise ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::core::error::StoreError;
use crate::core::identity::{slugify, validate_id, validate_short_name, IdGenerator};
use crate::core::persist::{self, LoadPolicy, LoadStats};
use crate::core::search::SearchIndex;
use crate::core::taxonomy::Taxonomy;
use crate::entities::item::Item;

/// Settings an `ItemStore` is opened with
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub taxonomy: Taxonomy,
    pub ids: IdGenerator,
    pub load_policy: LoadPolicy,
}

/// Lifecycle of the derived search index
#[derive(Debug, Default)]
enum IndexState {
    #[default]
    Uninitialized,
    Active(Arc<SearchIndex>),
}

#[derive(Debug, Default)]
struct StoreState {
    items: HashMap<String, Item>,
    loaded: bool,
    index: IndexState,
}

/// The item store for one backing directory
#[derive(Debug)]
pub struct ItemStore {
    dir: PathBuf,
    options: StoreOptions,
    state: RwLock<StoreState>,
}

impl ItemStore {
    /// Open a store on `dir`, creating the directory if needed.
    /// The store starts empty; call [`ItemStore::load`] to read the files.
    pub fn open(dir: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::write(&dir, e))?;
        Ok(Self {
            dir,
            options,
            state: RwLock::new(StoreState::default()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.options.taxonomy
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// True once a load has succeeded
    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the search index has been built
    pub fn is_indexed(&self) -> bool {
        matches!(self.read().index, IndexState::Active(_))
    }

    /// Read every item file and replace the in-memory set.
    ///
    /// On failure the previous set stays in place. If the search index was
    /// active it is rebuilt from the new set.
    #[tracing::instrument(name = "tkt.store.load", skip(self), fields(dir = %self.dir.display()))]
    pub fn load(&self) -> Result<LoadStats, StoreError> {
        // held across the scan so a create that lands mid-scan is not lost in the swap
        let mut state = self.write();
        let (items, stats) =
            persist::load_dir(&self.dir, &self.options.taxonomy, self.options.load_policy)?;

        state.items = items;
        state.loaded = true;

        if matches!(state.index, IndexState::Active(_)) {
            state.index = match SearchIndex::build(state.items.values()) {
                Ok(index) => IndexState::Active(Arc::new(index)),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to rebuild search index; will retry on next search");
                    IndexState::Uninitialized
                }
            };
        }

        tracing::debug!(
            files_scanned = stats.files_scanned,
            items_loaded = stats.items_loaded,
            files_skipped = stats.files_skipped,
            duration_ms = stats.duration_ms,
            "loaded items"
        );
        Ok(stats)
    }

    /// Look up by exact id, then by unique id prefix
    pub fn get(&self, id_or_prefix: &str) -> Result<Item, StoreError> {
        let state = self.read();
        resolve(&state.items, id_or_prefix).map(|id| state.items[&id].clone())
    }

    /// Resolve an id or prefix to a full id
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String, StoreError> {
        resolve(&self.read().items, id_or_prefix)
    }

    /// Snapshot of every item, sorted by id
    pub fn all(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.read().items.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Store a new item.
    ///
    /// Empty categorical fields get defaults and an empty id is generated.
    /// A missing short name is derived from the title; a given one must pass
    /// [`validate_short_name`]. Both timestamps are set to now. Returns the
    /// item as stored.
    pub fn create(&self, mut item: Item) -> Result<Item, StoreError> {
        let taxonomy = &self.options.taxonomy;
        taxonomy.apply_defaults(&mut item);
        taxonomy.validate(&item)?;

        if item.id.is_empty() {
            item.id = self.options.ids.generate();
        } else {
            validate_id(&item.id)?;
        }
        if let Some(name) = &item.short_name {
            validate_short_name(name)?;
        } else {
            item.short_name = slugify(&item.title);
        }
        item.normalize_tags();
        let now = Utc::now();
        item.created = now;
        item.updated = now;

        let mut state = self.write();
        if state.items.contains_key(&item.id) {
            return Err(StoreError::Validation(format!(
                "item '{}' already exists",
                item.id
            )));
        }

        persist::save_item(&self.dir, &item)?;
        index_best_effort(&state.index, |index| index.upsert(&item));
        state.items.insert(item.id.clone(), item.clone());

        tracing::debug!(id = %item.id, "created item");
        Ok(item)
    }

    /// Replace an existing item.
    ///
    /// The id must exist exactly. `created` and `short_name` are carried over
    /// from the stored item; `updated` is refreshed and never moves
    /// backwards.
    pub fn update(&self, mut item: Item) -> Result<Item, StoreError> {
        let taxonomy = &self.options.taxonomy;
        taxonomy.apply_defaults(&mut item);
        taxonomy.validate(&item)?;
        item.normalize_tags();

        let mut state = self.write();
        let existing = state
            .items
            .get(&item.id)
            .ok_or_else(|| StoreError::NotFound(item.id.clone()))?;

        item.created = existing.created;
        item.short_name = existing.short_name.clone();
        item.updated = Utc::now().max(existing.updated).max(existing.created);

        persist::save_item(&self.dir, &item)?;
        index_best_effort(&state.index, |index| index.upsert(&item));
        state.items.insert(item.id.clone(), item.clone());

        tracing::debug!(id = %item.id, "updated item");
        Ok(item)
    }

    /// Delete by id or unique prefix. Edges on other items that point at the
    /// deleted item are left alone; callers strip them first.
    pub fn delete(&self, id_or_prefix: &str) -> Result<Item, StoreError> {
        let mut state = self.write();
        let id = resolve(&state.items, id_or_prefix)?;

        persist::remove_item(&self.dir, &state.items[&id])?;
        index_best_effort(&state.index, |index| index.remove(&id));
        let removed = state
            .items
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        tracing::debug!(id = %removed.id, "deleted item");
        Ok(removed)
    }

    /// Full-text search over title, body and short name, best match first.
    ///
    /// Builds the index on first use. The store lock is held only to build
    /// the index and to resolve ids, not while the query runs; ids whose
    /// items have disappeared meanwhile are dropped.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Item>, StoreError> {
        let index = self.ensure_index()?;
        let ids = index.search(query, limit)?;

        let state = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.items.get(id).cloned())
            .collect())
    }

    fn ensure_index(&self) -> Result<Arc<SearchIndex>, StoreError> {
        if let IndexState::Active(index) = &self.read().index {
            return Ok(Arc::clone(index));
        }

        let mut state = self.write();
        if let IndexState::Active(index) = &state.index {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(SearchIndex::build(state.items.values())?);
        state.index = IndexState::Active(Arc::clone(&index));
        tracing::debug!(items = state.items.len(), "built search index");
        Ok(index)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exact id first, then unique prefix
fn resolve(items: &HashMap<String, Item>, id_or_prefix: &str) -> Result<String, StoreError> {
    if items.contains_key(id_or_prefix) {
        return Ok(id_or_prefix.to_string());
    }
    if id_or_prefix.is_empty() {
        return Err(StoreError::NotFound(String::new()));
    }

    let mut matches: Vec<&String> = items
        .keys()
        .filter(|id| id.starts_with(id_or_prefix))
        .collect();
    match matches.len() {
        0 => Err(StoreError::NotFound(id_or_prefix.to_string())),
        1 => Ok(matches[0].clone()),
        _ => {
            matches.sort();
            Err(StoreError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                matches: matches.into_iter().cloned().collect(),
            })
        }
    }
}

fn index_best_effort<F>(index: &IndexState, op: F)
where
    F: FnOnce(&SearchIndex) -> Result<(), StoreError>,
{
    if let IndexState::Active(index) = index {
        if let Err(err) = op(index) {
            tracing::warn!(error = %err, "search index update failed");
        }
    }
}
