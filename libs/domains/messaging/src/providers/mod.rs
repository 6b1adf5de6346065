//! Messaging vendor clients.
//!
//! Every SMS vendor implements [`SmsProvider`]; Twilio additionally exposes
//! WhatsApp template sends and the Content API template listing.

pub mod bulksmsbd;
pub mod cheapglobalsms;
pub mod esms;
pub mod hablame;
pub mod twilio;

pub use bulksmsbd::{BulkSmsBdConfig, BulkSmsBdProvider};
pub use cheapglobalsms::{CheapGlobalSmsConfig, CheapGlobalSmsProvider};
pub use esms::{EsmsConfig, EsmsProvider};
pub use hablame::{HablameConfig, HablameProvider};
pub use twilio::{TwilioClient, TwilioConfig, WhatsAppTemplate};

use async_trait::async_trait;
use core_config::{ConfigError, env_optional};
use domain_campaigns::ProviderKind;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::ProviderError;

/// One message to one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: String,
    pub body: String,
    /// Sender override; providers fall back to their configured sender
    pub from: Option<String>,
    /// Campaign name, for vendors that group sends by campaign
    pub campaign: String,
}

/// What a provider reports back for an accepted message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentMessage {
    pub channel_message_id: Option<String>,
}

impl SentMessage {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            channel_message_id: Some(id.into()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Sender recorded on the campaign when the request names none.
    fn default_sender(&self) -> Option<String>;

    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ProviderError>;
}

/// HTTP client shared by all requests of one provider.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("wesend/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// A credential that must be present and non-blank.
pub(crate) fn credential(key: &str) -> Result<String, ConfigError> {
    env_optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Vendor base URL, overridable with `<PREFIX>_API_URL`.
pub(crate) fn base_url(prefix: &str, default: &str) -> String {
    env_optional(&format!("{}_API_URL", prefix))
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Text of a JSON scalar id or code; vendors send these as strings or
/// numbers. Blank strings and non-scalars yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads the whole body, mapping transport failures to `Network error: …`.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, ProviderError> {
    Ok(response.text().await?)
}
