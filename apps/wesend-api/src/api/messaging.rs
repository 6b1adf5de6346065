//! `/sms/*` and `/whatsapp*` routes; each send is recorded through the
//! campaigns collection.

use axum::Router;
use domain_campaigns::{CampaignService, MongoCampaignRepository};
use domain_messaging::{MessagingService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let campaigns = CampaignService::new(MongoCampaignRepository::new(&state.db));
    let service = MessagingService::new(
        state.providers.clone(),
        campaigns,
        state.config.dispatch.clone(),
    );
    handlers::router(service)
}
