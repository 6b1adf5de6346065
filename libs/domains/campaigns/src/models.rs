use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Delivery channel of a campaign
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Channel {
    Sms,
    Whatsapp,
}

/// Messaging vendor a campaign was sent through
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    Twilio,
    Bulksmsbd,
    Cheapglobalsms,
    Hablame,
    Esms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Outcome of one recipient within a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryLog {
    pub to: String,
    pub message: String,
    pub status: DeliveryStatus,
    /// Present only for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "database::mongodb::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    /// Provider-side message id, e.g. a Twilio SID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_message_id: Option<String>,
}

impl DeliveryLog {
    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

/// Everything a send route knows once dispatch has finished.
#[derive(Debug, Clone, Validate)]
pub struct NewCampaign {
    #[validate(length(min = 1, message = "Campaign name is required"))]
    pub name: String,
    pub channel: Channel,
    pub provider: ProviderKind,
    pub sender_id: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    pub language: String,
    pub message: String,
    pub characters: u32,
    pub segments: u32,
    pub estimated_cost: u64,
    pub numbers: Vec<String>,
    pub results: Vec<DeliveryLog>,
}

/// A recorded bulk send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub channel: Channel,
    pub provider: ProviderKind,
    pub sender_id: String,
    pub country: String,
    pub language: String,
    pub message: String,
    pub characters: u32,
    pub segments: u32,
    pub estimated_cost: u64,
    pub numbers: Vec<String>,
    pub results: Vec<DeliveryLog>,
    pub total_sent: u64,
    pub successful: u64,
    pub failed: u64,
    #[serde(with = "database::mongodb::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Builds the stored record; aggregate counts always come from `results`.
    pub fn new(input: NewCampaign) -> Self {
        let total_sent = input.results.len() as u64;
        let successful = input.results.iter().filter(|r| r.is_sent()).count() as u64;

        Self {
            id: Uuid::now_v7(),
            name: input.name,
            channel: input.channel,
            provider: input.provider,
            sender_id: input.sender_id,
            country: input.country,
            language: input.language,
            message: input.message,
            characters: input.characters,
            segments: input.segments,
            estimated_cost: input.estimated_cost,
            numbers: input.numbers,
            results: input.results,
            total_sent,
            successful,
            failed: total_sent - successful,
            created_at: Utc::now(),
        }
    }
}

/// Query parameters for listing campaigns
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CampaignFilter {
    /// 1-based page (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, max 100)
    pub limit: Option<u64>,
    pub country: Option<String>,
    /// Channel: `sms` or `whatsapp`
    #[serde(rename = "type")]
    pub channel: Option<String>,
    /// Created at or after (RFC 3339 or YYYY-MM-DD)
    pub from: Option<String>,
    /// Created at or before (RFC 3339 or YYYY-MM-DD)
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignQuery {
    pub country: Option<String>,
    pub channel: Option<Channel>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignPage {
    pub campaigns: Vec<Campaign>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignEnvelope {
    pub campaign: Campaign,
}
