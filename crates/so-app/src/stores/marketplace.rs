use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use so_core::ids::{CelebrityId, RequestId, UserId};
use so_core::marketplace::{Celebrity, NewVideoRequest, RequestStatus, VideoRequest};
use so_core::ports::{Filter, ProviderError, RecordStorePort};

/// Celebrity catalog and video requests.
pub struct MarketplaceStore {
    records: Arc<dyn RecordStorePort>,
    requests_table: String,
    celebrities_table: String,
}

impl MarketplaceStore {
    pub fn new(
        records: Arc<dyn RecordStorePort>,
        requests_table: impl Into<String>,
        celebrities_table: impl Into<String>,
    ) -> Self {
        Self {
            records,
            requests_table: requests_table.into(),
            celebrities_table: celebrities_table.into(),
        }
    }

    pub async fn list_celebrities(&self) -> Result<Vec<Celebrity>, ProviderError> {
        let rows = self.records.select(&self.celebrities_table, &[]).await?;
        decode_rows(rows)
    }

    pub async fn find_celebrity(
        &self,
        id: &CelebrityId,
    ) -> Result<Option<Celebrity>, ProviderError> {
        let row = self
            .records
            .select_single(&self.celebrities_table, &[Filter::eq("id", id.as_str())])
            .await?;
        Ok(row.map(serde_json::from_value).transpose()?)
    }

    /// Catalog entry for a celebrity account, keyed by its user id.
    pub async fn register_celebrity(&self, celebrity: &Celebrity) -> Result<Celebrity, ProviderError> {
        let stored = self
            .records
            .upsert(&self.celebrities_table, serde_json::to_value(celebrity)?)
            .await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn create_request(
        &self,
        request: NewVideoRequest,
    ) -> Result<VideoRequest, ProviderError> {
        let rows = self
            .records
            .insert(&self.requests_table, vec![serde_json::to_value(&request)?])
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("insert returned no rows".to_string()))?;
        Ok(serde_json::from_value(row)?)
    }

    /// Requests placed by a fan, newest first.
    pub async fn requests_by_requester(
        &self,
        requester_id: &UserId,
    ) -> Result<Vec<VideoRequest>, ProviderError> {
        self.list_requests(Filter::eq("requester_id", requester_id.as_str()))
            .await
    }

    /// Requests addressed to a celebrity, newest first.
    pub async fn requests_for_celebrity(
        &self,
        celebrity_id: &CelebrityId,
    ) -> Result<Vec<VideoRequest>, ProviderError> {
        self.list_requests(Filter::eq("celebrity_id", celebrity_id.as_str()))
            .await
    }

    pub async fn find_request_for_celebrity(
        &self,
        id: &RequestId,
        celebrity_id: &CelebrityId,
    ) -> Result<Option<VideoRequest>, ProviderError> {
        let row = self
            .records
            .select_single(
                &self.requests_table,
                &[
                    Filter::eq("id", id.as_str()),
                    Filter::eq("celebrity_id", celebrity_id.as_str()),
                ],
            )
            .await?;
        Ok(row.map(serde_json::from_value).transpose()?)
    }

    /// Writes the new status, scoped to the owning celebrity. `None` when no
    /// row matched both the request id and the celebrity.
    pub async fn update_status(
        &self,
        id: &RequestId,
        celebrity_id: &CelebrityId,
        status: RequestStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Option<VideoRequest>, ProviderError> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), json!(status));
        match status {
            RequestStatus::Accepted => {
                fields.insert("accepted_at".to_string(), json!(at));
            }
            RequestStatus::Rejected => {
                fields.insert("rejection_reason".to_string(), json!(reason));
            }
            RequestStatus::Completed => {
                fields.insert("completed_at".to_string(), json!(at));
            }
            RequestStatus::Pending => {}
        }

        let rows = self
            .records
            .update(
                &self.requests_table,
                Value::Object(fields),
                &[
                    Filter::eq("id", id.as_str()),
                    Filter::eq("celebrity_id", celebrity_id.as_str()),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?)
    }

    async fn list_requests(&self, filter: Filter) -> Result<Vec<VideoRequest>, ProviderError> {
        let rows = self.records.select(&self.requests_table, &[filter]).await?;
        let mut requests: Vec<VideoRequest> = decode_rows(rows)?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ProviderError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(ProviderError::from))
        .collect()
}
