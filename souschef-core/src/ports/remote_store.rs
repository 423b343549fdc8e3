//! Remote store port - hosted auth + table storage

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

use crate::domain::result::Result;
use crate::domain::Identity;

/// One table row as a JSON object
pub type Row = Map<String, JsonValue>;

/// Equality predicate `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: JsonValue,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether a row satisfies this predicate
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }

    /// Value rendered for a query string (strings without quotes)
    pub fn value_string(&self) -> String {
        match &self.value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Hosted store abstraction
///
/// Services only talk to the backend through this trait. The identity returned by
/// `current_identity` comes from whatever session the implementation holds.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// The signed-in user, or `None` when there is no valid session
    async fn current_identity(&self) -> Result<Option<Identity>>;

    /// Select `columns` from `table` where every filter matches
    async fn select(&self, table: &str, columns: &[&str], filters: &[Filter]) -> Result<Vec<Row>>;

    /// Insert rows; the store assigns generated columns such as `id`
    async fn insert(&self, table: &str, rows: &[Row]) -> Result<()>;

    /// Delete every row where all filters match. Matching nothing is not an error.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()>;

    /// Insert or merge a row by primary key
    async fn upsert(&self, table: &str, row: &Row) -> Result<()>;

    /// Drop the current session
    async fn sign_out(&self) -> Result<()>;
}
