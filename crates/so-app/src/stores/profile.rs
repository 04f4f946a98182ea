use std::sync::Arc;

use serde_json::json;
use so_core::ids::UserId;
use so_core::ports::{Filter, ProviderError, RecordStorePort};
use so_core::Profile;
use tracing::debug;

/// Profile rows, keyed by the provider user id.
pub struct ProfileStore {
    records: Arc<dyn RecordStorePort>,
    table: String,
}

impl ProfileStore {
    pub fn new(records: Arc<dyn RecordStorePort>, table: impl Into<String>) -> Self {
        Self {
            records,
            table: table.into(),
        }
    }

    pub async fn find(&self, id: &UserId) -> Result<Option<Profile>, ProviderError> {
        let row = self
            .records
            .select_single(&self.table, &[Filter::eq("id", id.as_str())])
            .await?;
        row.map(serde_json::from_value)
            .transpose()
            .map_err(ProviderError::from)
    }

    /// Insert an empty row for `id` and return it as stored.
    pub async fn create_empty(&self, id: &UserId) -> Result<Profile, ProviderError> {
        debug!(user_id = %id, table = %self.table, "creating empty profile row");
        let rows = self
            .records
            .insert(&self.table, vec![json!({ "id": id })])
            .await?;
        match rows.into_iter().next() {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Ok(Profile::empty(id.clone())),
        }
    }

    /// Insert or merge the row keyed by `profile.id`.
    pub async fn upsert(&self, profile: &Profile) -> Result<Profile, ProviderError> {
        let row = serde_json::to_value(profile)?;
        let stored = self.records.upsert(&self.table, row).await?;
        Ok(serde_json::from_value(stored)?)
    }
}
