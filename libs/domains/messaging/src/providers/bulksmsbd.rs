//! BulkSMSBD (Bangladesh) HTTP GET API.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default};
use domain_campaigns::ProviderKind;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    OutboundMessage, SentMessage, SmsProvider, base_url, credential, read_body, scalar_text,
};
use crate::error::ProviderError;

pub const DEFAULT_API_URL: &str = "http://bulksmsbd.net";
pub const DEFAULT_SENDER_ID: &str = "WeTrainEdu";

const ACCEPTED: &str = "202";

#[derive(Clone)]
pub struct BulkSmsBdConfig {
    pub api_key: String,
    pub sender_id: String,
    pub api_url: String,
}

impl BulkSmsBdConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            sender_id: DEFAULT_SENDER_ID.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl FromEnv for BulkSmsBdConfig {
    /// Requires `BULKSMSBD_API_KEY`; `BULKSMSBD_SENDER_ID` defaults to `WeTrainEdu`.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: credential("BULKSMSBD_API_KEY")?,
            sender_id: env_or_default("BULKSMSBD_SENDER_ID", DEFAULT_SENDER_ID),
            api_url: base_url("BULKSMSBD", DEFAULT_API_URL),
        })
    }
}

/// Human-readable text for a BulkSMSBD response code.
pub fn error_reason(code: &str) -> Option<&'static str> {
    let reason = match code {
        "202" => "SMS submitted successfully",
        "1001" => "Invalid number format",
        "1002" => "Sender ID is incorrect or disabled",
        "1003" => "Missing required fields. Please check your inputs.",
        "1005" => "Internal server error",
        "1006" => "Balance validity not available",
        "1007" => "Insufficient balance",
        "1011" => "User ID not found",
        "1012" => "Bengali masking required for Bangla SMS",
        "1013" => "Sender ID not linked to this API key",
        "1014" => "Sender type name not found for this API key",
        "1015" => "No valid gateway found for sender ID",
        "1016" => "Price info not found for this sender ID",
        "1017" => "Active price info not found for this sender ID",
        "1018" => "Account owner is disabled",
        "1019" => "Sender type pricing is disabled for this account",
        "1020" => "Parent account not found",
        "1021" => "Parent sender pricing not found",
        "1031" => "Account not verified. Contact administrator.",
        "1032" => "IP address not whitelisted",
        _ => return None,
    };
    Some(reason)
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    response_code: Option<Value>,
    message_id: Option<Value>,
    error_message: Option<String>,
}

/// Accepts either the JSON envelope or a bare response code.
fn interpret(body: &str) -> Result<SentMessage, ProviderError> {
    let body = body.trim();
    let (code, vendor_error, message_id) = match serde_json::from_str::<SendResponse>(body) {
        Ok(r) => (
            r.response_code.as_ref().and_then(scalar_text).unwrap_or_default(),
            r.error_message.filter(|m| !m.trim().is_empty()),
            r.message_id.as_ref().and_then(scalar_text),
        ),
        Err(_) => (body.to_string(), None, None),
    };

    if code == ACCEPTED {
        return Ok(SentMessage {
            channel_message_id: message_id,
        });
    }

    let reason = error_reason(&code)
        .map(str::to_string)
        .or(vendor_error)
        .unwrap_or_else(|| format!("Unknown error ({})", code));
    Err(ProviderError::Rejected(reason))
}

pub struct BulkSmsBdProvider {
    config: BulkSmsBdConfig,
    client: Client,
}

impl BulkSmsBdProvider {
    pub fn new(config: BulkSmsBdConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SmsProvider for BulkSmsBdProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bulksmsbd
    }

    fn default_sender(&self) -> Option<String> {
        Some(self.config.sender_id.clone())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ProviderError> {
        let sender = message.from.as_deref().unwrap_or(&self.config.sender_id);

        let response = self
            .client
            .get(format!("{}/api/smsapi", self.config.api_url))
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("type", "text"),
                ("number", message.to.as_str()),
                ("senderid", sender),
                ("message", message.body.as_str()),
            ])
            .send()
            .await?;

        let body = read_body(response).await?;
        debug!(to = %message.to, response = %body, "BulkSMSBD response");
        interpret(&body)
    }
}
