use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CampaignResult;
use crate::models::{Campaign, CampaignQuery};

/// Repository trait for Campaign persistence
///
/// Campaigns are append-only: there is no update or delete.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn insert(&self, campaign: Campaign) -> CampaignResult<Campaign>;

    async fn get_by_id(&self, id: Uuid) -> CampaignResult<Option<Campaign>>;

    /// One page of campaigns, newest first
    async fn list(&self, query: CampaignQuery) -> CampaignResult<Vec<Campaign>>;

    /// Count campaigns matching a query (paging fields are ignored)
    async fn count(&self, query: CampaignQuery) -> CampaignResult<u64>;
}
