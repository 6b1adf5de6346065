//! Campaign Service - recording and browsing bulk sends

use axum_helpers::pagination::{Page, parse_date_range};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CampaignError, CampaignResult};
use crate::models::{Campaign, CampaignFilter, CampaignPage, CampaignQuery, Channel, NewCampaign};
use crate::repository::CampaignRepository;

pub struct CampaignService<R: CampaignRepository> {
    repository: Arc<R>,
}

impl<R: CampaignRepository> CampaignService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Persists a finished send. Counts are derived from `results`.
    #[instrument(skip(self, input), fields(name = %input.name, provider = %input.provider))]
    pub async fn record(&self, input: NewCampaign) -> CampaignResult<Campaign> {
        input.validate()?;
        self.repository.insert(Campaign::new(input)).await
    }

    #[instrument(skip(self))]
    pub async fn list_campaigns(&self, filter: CampaignFilter) -> CampaignResult<CampaignPage> {
        let page = Page::new(filter.page, filter.limit);
        let (from, to) = parse_date_range(filter.from.as_deref(), filter.to.as_deref())?;

        let channel = match non_blank(&filter.channel) {
            Some(raw) => Some(raw.parse::<Channel>().map_err(|_| {
                CampaignError::Validation(format!("Invalid campaign type: {}", raw))
            })?),
            None => None,
        };

        let query = CampaignQuery {
            country: non_blank(&filter.country).map(str::to_string),
            channel,
            from,
            to,
            skip: page.skip(),
            limit: page.limit,
        };

        let total = self.repository.count(query.clone()).await?;
        let campaigns = self.repository.list(query).await?;

        Ok(CampaignPage {
            campaigns,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_campaign(&self, id: Uuid) -> CampaignResult<Campaign> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CampaignError::NotFound(id))
    }
}

impl<R: CampaignRepository> Clone for CampaignService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
