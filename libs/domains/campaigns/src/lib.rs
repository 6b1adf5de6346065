//! Campaigns Domain
//!
//! A campaign is the stored outcome of one bulk send: what was sent, through
//! which provider, and one [`DeliveryLog`] per recipient. Campaigns are
//! written once by the messaging routes and only read afterwards.
//!
//! ```text
//! messaging ─► CampaignService::record ─► CampaignRepository ─► MongoCampaignRepository
//! handlers  ─► CampaignService::{list_campaigns, get_campaign}
//! ```

pub mod cost;
pub mod error;
pub mod handlers;
pub mod log;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use cost::{CostEstimate, estimate_cost};
pub use error::{CampaignError, CampaignResult};
pub use handlers::ApiDoc;
pub use log::build_log;
pub use models::{
    Campaign, CampaignFilter, CampaignPage, Channel, DeliveryLog, DeliveryStatus, NewCampaign,
    ProviderKind,
};
pub use mongodb::MongoCampaignRepository;
pub use repository::CampaignRepository;
pub use service::CampaignService;
