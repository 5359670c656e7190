//! Full-text search index over items
//!
//! An in-memory SQLite FTS5 table mirroring title, body and short name.
//! The index is derived data: it can be dropped and rebuilt from the store
//! at any time, and its failures never fail a store mutation.

use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection};

use crate::core::error::StoreError;
use crate::entities::item::Item;

/// Full-text index. Safe to share between threads; the connection is
/// serialized internally.
pub struct SearchIndex {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex").finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Create an empty index
    pub fn new() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            r#"
            CREATE VIRTUAL TABLE items_fts USING fts5(
                id UNINDEXED,
                title,
                body,
                short_name,
                tokenize = 'unicode61 remove_diacritics 2'
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an index containing every given item
    pub fn build<'a>(items: impl IntoIterator<Item = &'a Item>) -> Result<Self, StoreError> {
        let index = Self::new()?;
        {
            let mut conn = index.lock();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO items_fts (id, title, body, short_name) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for item in items {
                    stmt.execute(params![
                        item.id,
                        item.title,
                        item.body,
                        item.short_name.as_deref().unwrap_or("")
                    ])?;
                }
            }
            tx.commit()?;
        }
        Ok(index)
    }

    /// Insert or replace one item
    pub fn upsert(&self, item: &Item) -> Result<(), StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM items_fts WHERE id = ?1", params![item.id])?;
        tx.execute(
            "INSERT INTO items_fts (id, title, body, short_name) VALUES (?1, ?2, ?3, ?4)",
            params![
                item.id,
                item.title,
                item.body,
                item.short_name.as_deref().unwrap_or("")
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Remove one item; removing an unknown id is a no-op
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.lock()
            .execute("DELETE FROM items_fts WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Number of indexed items
    pub fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM items_fts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Ids of matching items, best match first.
    ///
    /// Every whitespace-separated term must match (as a prefix). Terms are
    /// quoted, so FTS operators typed by users are searched literally.
    /// Blank queries and a zero limit return nothing.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let Some(expr) = build_match_expression(query) else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id FROM items_fts WHERE items_fts MATCH ?1 ORDER BY bm25(items_fts), id LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![expr, limit as i64], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Search(format!("query '{}': {}", query, e)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(escape_fts_term)
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"*")
}
