//! In-memory remote store
//!
//! Behaves like the hosted store for a single process: ids are assigned on
//! insert, filters are equality-only, and the "session" is whatever identity was
//! set with [`InMemoryStore::sign_in_as`]. Used by tests and demo runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::Identity;
use crate::ports::{Filter, RemoteStore, Row};

#[derive(Default)]
struct StoreState {
    identity: Option<Identity>,
    tables: HashMap<String, Vec<Row>>,
    next_id: i64,
    fail_tables: bool,
    calls: Vec<String>,
}

/// Process-local implementation of [`RemoteStore`]
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity returned by `current_identity`
    pub fn sign_in_as(&self, identity: Identity) {
        self.lock().identity = Some(identity);
    }

    /// Make every table operation fail with `RemoteFailure` until reset
    pub fn set_fail_tables(&self, fail: bool) {
        self.lock().fail_tables = fail;
    }

    /// Table operations performed so far, as "<op> <table>"
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// All rows of a table, ignoring identity
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        // A panic while holding the lock leaves plain data behind, so keep using it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, op: &str, table: &str) -> Result<std::sync::MutexGuard<'_, StoreState>> {
        let mut state = self.lock();
        state.calls.push(format!("{} {}", op, table));
        if state.fail_tables {
            return Err(Error::remote(format!("{} on '{}' rejected", op, table)));
        }
        Ok(state)
    }
}

fn project(row: &Row, columns: &[&str]) -> Row {
    if columns.is_empty() || columns.contains(&"*") {
        return row.clone();
    }
    columns
        .iter()
        .filter_map(|c| row.get(*c).map(|v| (c.to_string(), v.clone())))
        .collect()
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        Ok(self.lock().identity.clone())
    }

    async fn select(&self, table: &str, columns: &[&str], filters: &[Filter]) -> Result<Vec<Row>> {
        let state = self.begin("select", table)?;
        let rows = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| f.matches(row)))
                    .map(|row| project(row, columns))
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<()> {
        let mut state = self.begin("insert", table)?;
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = row.clone();
            if !row.contains_key("id") {
                state.next_id += 1;
                row.insert("id".to_string(), JsonValue::from(state.next_id));
            }
            stored.push(row);
        }
        state.tables.entry(table.to_string()).or_default().extend(stored);
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
        let mut state = self.begin("delete", table)?;
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        }
        Ok(())
    }

    async fn upsert(&self, table: &str, row: &Row) -> Result<()> {
        let mut state = self.begin("upsert", table)?;
        let key = row
            .get("id")
            .cloned()
            .ok_or_else(|| Error::remote(format!("upsert on '{}' needs an id", table)))?;
        let rows = state.tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|r| r.get("id") == Some(&key)) {
            Some(existing) => {
                for (k, v) in row {
                    existing.insert(k.clone(), v.clone());
                }
            }
            None => rows.push(row.clone()),
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.lock().identity = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn row(value: JsonValue) -> Row {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        store
            .insert("favorites", &[row(json!({ "recipe": "a" })), row(json!({ "recipe": "b" }))])
            .await
            .unwrap();

        let rows = store.select("favorites", &["id"], &[]).await.unwrap();
        assert_eq!(rows, vec![row(json!({ "id": 1 })), row(json!({ "id": 2 }))]);
    }

    #[tokio::test]
    async fn test_delete_requires_all_filters() {
        let store = InMemoryStore::new();
        store
            .insert(
                "favorites",
                &[
                    row(json!({ "recipe": "a", "user_id": "u1" })),
                    row(json!({ "recipe": "b", "user_id": "u2" })),
                ],
            )
            .await
            .unwrap();

        // id 2 belongs to u2, so this matches nothing
        store
            .delete("favorites", &[Filter::eq("user_id", "u1"), Filter::eq("id", 2)])
            .await
            .unwrap();
        assert_eq!(store.rows("favorites").len(), 2);

        store
            .delete("favorites", &[Filter::eq("user_id", "u2"), Filter::eq("id", 2)])
            .await
            .unwrap();
        assert_eq!(store.rows("favorites").len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_merges_by_id() {
        let store = InMemoryStore::new();
        store
            .upsert("profiles", &row(json!({ "id": "p1", "username": "old", "phone": "1" })))
            .await
            .unwrap();
        store
            .upsert("profiles", &row(json!({ "id": "p1", "username": "new" })))
            .await
            .unwrap();

        let rows = store.rows("profiles");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["username"], "new");
        assert_eq!(rows[0]["phone"], "1");
    }

    #[tokio::test]
    async fn test_failing_tables_and_sign_out() {
        let store = InMemoryStore::new();
        store.sign_in_as(Identity::new(Uuid::new_v4()));
        store.set_fail_tables(true);

        let err = store.select("favorites", &[], &[]).await.unwrap_err();
        assert!(matches!(err, Error::RemoteFailure(_)));
        assert_eq!(store.calls(), vec!["select favorites".to_string()]);

        store.sign_out().await.unwrap();
        assert!(store.current_identity().await.unwrap().is_none());
    }
}
