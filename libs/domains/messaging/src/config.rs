use core_config::{ConfigError, FromEnv, env_parse};
use std::time::Duration;

/// Pacing and fan-out for bulk sends.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Pause between recipients on streaming routes
    pub stream_delay: Duration,
    /// Concurrent provider calls for WhatsApp sends
    pub max_in_flight: usize,
    /// Per-request timeout of the provider HTTP clients
    pub provider_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            stream_delay: Duration::from_millis(300),
            max_in_flight: 16,
            provider_timeout: Duration::from_secs(30),
        }
    }
}

impl FromEnv for DispatchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let stream_delay_ms = env_parse("DISPATCH_STREAM_DELAY_MS", 300u64)?;
        let max_in_flight = env_parse("DISPATCH_MAX_IN_FLIGHT", 16usize)?;
        let timeout_secs = env_parse("PROVIDER_TIMEOUT_SECS", 30u64)?;

        if max_in_flight == 0 {
            return Err(ConfigError::ParseError {
                key: "DISPATCH_MAX_IN_FLIGHT".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            stream_delay: Duration::from_millis(stream_delay_ms),
            max_in_flight,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
