//! Row store port - abstracts the provider's table API
//!
//! Rows travel as JSON objects; typed mapping happens in the application layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderError;

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether a JSON row satisfies this filter. Non-string columns compare by
    /// their JSON rendering, so `true` matches `"true"`.
    pub fn matches(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => s == &self.value,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

#[async_trait]
pub trait RecordStorePort: Send + Sync {
    /// `select(*).eq(..).single()`: the one matching row, or `None`.
    async fn select_single(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<Value>, ProviderError>;

    /// All matching rows; an empty filter list selects the whole table.
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, ProviderError>;

    /// Insert rows and return them as stored.
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ProviderError>;

    /// Merge `fields` into every matching row and return the updated rows.
    async fn update(
        &self,
        table: &str,
        fields: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, ProviderError>;

    /// Insert or merge by primary key `id` and return the stored row.
    async fn upsert(&self, table: &str, row: Value) -> Result<Value, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_string_and_scalar_columns() {
        let row = json!({ "id": "u1", "is_celebrity": true, "bio": null });
        assert!(Filter::eq("id", "u1").matches(&row));
        assert!(Filter::eq("is_celebrity", "true").matches(&row));
        assert!(!Filter::eq("bio", "null").matches(&row));
        assert!(!Filter::eq("missing", "x").matches(&row));
    }
}
