//! Shared application state, built once in `main` and handed to the
//! route builders.

use domain_messaging::ProviderRegistry;
use mongodb::{Client, Database};

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Shares the underlying connection pool when cloned
    pub mongo_client: Client,
    pub db: Database,
    /// Providers whose credentials were found at startup
    pub providers: ProviderRegistry,
}
