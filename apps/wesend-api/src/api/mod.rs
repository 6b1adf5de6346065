//! API routes, nested under /api by `axum_helpers::create_router`

pub mod campaigns;
pub mod contacts;
pub mod health;
pub mod messaging;

use axum::Router;
use domain_campaigns::MongoCampaignRepository;
use domain_contacts::MongoContactRepository;
use mongodb::Database;
use tracing::info;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/contacts", contacts::router(state))
        .nest("/campaigns", campaigns::router(state))
        .merge(messaging::router(state))
        .merge(health::router(state.clone()))
}

pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoContactRepository::new(db).create_indexes().await?;
    MongoCampaignRepository::new(db).create_indexes().await?;
    info!("MongoDB indexes ensured");
    Ok(())
}
