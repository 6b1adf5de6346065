use axum::Router;
use domain_campaigns::{CampaignService, MongoCampaignRepository, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoCampaignRepository::new(&state.db);
    handlers::router(CampaignService::new(repository))
}
