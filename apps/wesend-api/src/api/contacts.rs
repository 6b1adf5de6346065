use axum::Router;
use domain_contacts::{ContactService, MongoContactRepository, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoContactRepository::new(&state.db);
    handlers::router(ContactService::new(repository))
}
