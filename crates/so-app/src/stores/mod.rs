//! Typed access to the provider's tables.
//!
//! Rows cross the [`RecordStorePort`](so_core::ports::RecordStorePort) as
//! JSON; these stores own the mapping to domain types.

mod marketplace;
mod profile;

pub use marketplace::MarketplaceStore;
pub use profile::ProfileStore;

/// Table names used by the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub profiles: String,
    pub video_requests: String,
    pub celebrities: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            profiles: "profiles".to_string(),
            video_requests: "video_requests".to_string(),
            celebrities: "celebrities".to_string(),
        }
    }
}
