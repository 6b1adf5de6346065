use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_messaging::DispatchConfig;

pub use core_config::Environment;

/// Settings for the whole process. Provider credentials are read separately
/// by [`domain_messaging::ProviderRegistry::from_env`].
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub dispatch: DispatchConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let dispatch = DispatchConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            dispatch,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("wesend")),
                ("PORT", Some("9090")),
                ("DISPATCH_STREAM_DELAY_MS", Some("50")),
                ("APP_ENV", Some("production")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.database(), "wesend");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.dispatch.stream_delay, Duration::from_millis(50));
                assert!(config.environment.is_production());
                assert_eq!(config.app.name, "wesend_api");
            },
        );
    }

    #[test]
    fn test_config_requires_mongodb() {
        temp_env::with_vars_unset(
            ["MONGODB_URL", "MONGO_URL", "MONGODB_DATABASE", "MONGO_DATABASE"],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
