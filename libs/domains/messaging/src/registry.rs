//! Providers available to this process, keyed by [`ProviderKind`].

use core_config::{ConfigError, FromEnv};
use domain_campaigns::ProviderKind;
use eyre::{Result, WrapErr};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{MessagingError, MessagingResult};
use crate::providers::{
    BulkSmsBdConfig, BulkSmsBdProvider, CheapGlobalSmsConfig, CheapGlobalSmsProvider, EsmsConfig,
    EsmsProvider, HablameConfig, HablameProvider, SmsProvider, TwilioClient, TwilioConfig,
    http_client,
};

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    sms: HashMap<ProviderKind, Arc<dyn SmsProvider>>,
    twilio: Option<Arc<TwilioClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every provider whose credentials are present.
    ///
    /// A missing credential group only skips that provider; a malformed one
    /// is an error.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let mut registry = Self::new();

        if let Some(config) = optional(TwilioConfig::from_env(), ProviderKind::Twilio)? {
            let client = http_client(timeout).wrap_err("Failed to build Twilio HTTP client")?;
            registry = registry.with_twilio(TwilioClient::new(config, client));
        }

        if let Some(config) = optional(BulkSmsBdConfig::from_env(), ProviderKind::Bulksmsbd)? {
            let client = http_client(timeout).wrap_err("Failed to build BulkSMSBD HTTP client")?;
            registry = registry.with_provider(BulkSmsBdProvider::new(config, client));
        }

        if let Some(config) =
            optional(CheapGlobalSmsConfig::from_env(), ProviderKind::Cheapglobalsms)?
        {
            let client =
                http_client(timeout).wrap_err("Failed to build CheapGlobalSMS HTTP client")?;
            registry = registry.with_provider(CheapGlobalSmsProvider::new(config, client));
        }

        if let Some(config) = optional(HablameConfig::from_env(), ProviderKind::Hablame)? {
            let client = http_client(timeout).wrap_err("Failed to build Hablame HTTP client")?;
            registry = registry.with_provider(HablameProvider::new(config, client));
        }

        if let Some(config) = optional(EsmsConfig::from_env(), ProviderKind::Esms)? {
            let client = http_client(timeout).wrap_err("Failed to build ESMS HTTP client")?;
            registry = registry.with_provider(EsmsProvider::new(config, client));
        }

        info!(providers = ?registry.configured(), "Messaging providers registered");
        Ok(registry)
    }

    pub fn with_provider(mut self, provider: impl SmsProvider + 'static) -> Self {
        self.sms.insert(provider.kind(), Arc::new(provider));
        self
    }

    /// Registers Twilio for SMS as well as WhatsApp.
    pub fn with_twilio(mut self, client: TwilioClient) -> Self {
        let client = Arc::new(client);
        self.sms
            .insert(ProviderKind::Twilio, client.clone() as Arc<dyn SmsProvider>);
        self.twilio = Some(client);
        self
    }

    /// Resolves the `{provider}` path segment.
    pub fn sms(&self, name: &str) -> MessagingResult<Arc<dyn SmsProvider>> {
        let kind: ProviderKind = name
            .parse()
            .map_err(|_| MessagingError::UnknownProvider(name.to_string()))?;

        self.sms
            .get(&kind)
            .cloned()
            .ok_or(MessagingError::NotConfigured(kind))
    }

    pub fn twilio(&self) -> MessagingResult<Arc<TwilioClient>> {
        self.twilio
            .clone()
            .ok_or(MessagingError::NotConfigured(ProviderKind::Twilio))
    }

    pub fn configured(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.sms.keys().copied().collect();
        kinds.sort_by_key(|k| k.to_string());
        kinds
    }
}

fn optional<T>(config: Result<T, ConfigError>, kind: ProviderKind) -> Result<Option<T>> {
    match config {
        Ok(config) => Ok(Some(config)),
        Err(ConfigError::MissingEnvVar(var)) => {
            warn!(provider = %kind, missing = %var, "Provider not configured; its routes will answer 503");
            Ok(None)
        }
        Err(e) => Err(eyre::Report::new(e).wrap_err(format!("Invalid {} configuration", kind))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockSmsProvider;

    const ALL_VARS: [&str; 11] = [
        "TWILIO_ACCOUNT_SID",
        "TWILIO_AUTH_TOKEN",
        "BULKSMSBD_API_KEY",
        "CHEAPGLOBALSMS_SUB_ACCOUNT",
        "CHEAPGLOBALSMS_PASSWORD",
        "CHEAPGLOBALSMS_SENDER_ID",
        "HABLAME_API_KEY",
        "ESMS_API_TOKEN",
        "ESMS_SENDER_ID",
        "TWILIO_PHONE_NUMBER",
        "TWILIO_WHATSAPP_FROM",
    ];

    #[test]
    fn test_from_env_registers_only_complete_groups() {
        temp_env::with_vars_unset(ALL_VARS, || {
            temp_env::with_vars(
                [
                    ("BULKSMSBD_API_KEY", Some("k")),
                    ("ESMS_API_TOKEN", Some("t")),
                    ("CHEAPGLOBALSMS_SUB_ACCOUNT", Some("acct")),
                ],
                || {
                    let registry = ProviderRegistry::from_env(Duration::from_secs(1)).unwrap();
                    assert_eq!(registry.configured(), vec![ProviderKind::Bulksmsbd]);
                },
            );
        });
    }

    #[test]
    fn test_sms_lookup_errors() {
        let registry = ProviderRegistry::new();

        assert!(matches!(
            registry.sms("sinch"),
            Err(MessagingError::UnknownProvider(ref p)) if p == "sinch"
        ));
        assert!(matches!(
            registry.sms("hablame"),
            Err(MessagingError::NotConfigured(ProviderKind::Hablame))
        ));
        assert!(registry.twilio().is_err());
    }

    #[test]
    fn test_with_provider_keys_by_kind() {
        let mut provider = MockSmsProvider::new();
        provider.expect_kind().return_const(ProviderKind::Esms);

        let registry = ProviderRegistry::new().with_provider(provider);
        assert_eq!(registry.sms("ESMS").unwrap().kind(), ProviderKind::Esms);
    }
}
