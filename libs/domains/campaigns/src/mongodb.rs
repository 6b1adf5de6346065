//! MongoDB implementation of CampaignRepository

use async_trait::async_trait;
use database::mongodb::timestamp;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::FindOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::CampaignResult;
use crate::models::{Campaign, CampaignQuery};
use crate::repository::CampaignRepository;

pub const COLLECTION: &str = "campaigns";

#[derive(Clone)]
pub struct MongoCampaignRepository {
    collection: Collection<Campaign>,
}

impl MongoCampaignRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Campaign>(COLLECTION),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> CampaignResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "createdAt": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "country": 1, "createdAt": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "channel": 1, "createdAt": -1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION, "Campaign indexes ensured");
        Ok(())
    }

    fn build_filter(query: &CampaignQuery) -> Document {
        let mut doc = doc! {};

        if let Some(ref country) = query.country {
            doc.insert("country", country);
        }

        if let Some(channel) = query.channel {
            doc.insert("channel", channel.to_string());
        }

        let mut range = doc! {};
        if let Some(from) = query.from {
            range.insert("$gte", timestamp::format(&from));
        }
        if let Some(to) = query.to {
            range.insert("$lte", timestamp::format(&to));
        }
        if !range.is_empty() {
            doc.insert("createdAt", range);
        }

        doc
    }
}

#[async_trait]
impl CampaignRepository for MongoCampaignRepository {
    #[instrument(skip(self, campaign), fields(campaign_id = %campaign.id, provider = %campaign.provider))]
    async fn insert(&self, campaign: Campaign) -> CampaignResult<Campaign> {
        self.collection.insert_one(&campaign).await?;
        tracing::info!(
            campaign_id = %campaign.id,
            total = campaign.total_sent,
            successful = campaign.successful,
            "Campaign recorded"
        );
        Ok(campaign)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CampaignResult<Option<Campaign>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        Ok(self.collection.find_one(filter).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: CampaignQuery) -> CampaignResult<Vec<Campaign>> {
        let options = FindOptions::builder()
            .skip(query.skip)
            .limit(query.limit as i64)
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&query))
            .with_options(options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: CampaignQuery) -> CampaignResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&query))
            .await?)
    }
}
