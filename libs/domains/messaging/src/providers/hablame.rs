//! Hablame (Colombia) SMS v5 API.

use async_trait::async_trait;
use chrono::Utc;
use core_config::{ConfigError, FromEnv, env_or_default};
use domain_campaigns::ProviderKind;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{
    OutboundMessage, SentMessage, SmsProvider, base_url, credential, read_body, scalar_text,
};
use crate::error::ProviderError;

pub const DEFAULT_API_URL: &str = "https://www.hablame.co";
pub const DEFAULT_SENDER: &str = "WMT_Promo";

#[derive(Clone)]
pub struct HablameConfig {
    pub api_key: String,
    pub sender: String,
    pub api_url: String,
}

impl HablameConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            sender: DEFAULT_SENDER.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl FromEnv for HablameConfig {
    /// Requires `HABLAME_API_KEY`; `HABLAME_SENDER` defaults to `WMT_Promo`.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: credential("HABLAME_API_KEY")?,
            sender: env_or_default("HABLAME_SENDER", DEFAULT_SENDER),
            api_url: base_url("HABLAME", DEFAULT_API_URL),
        })
    }
}

/// Reason text for a Hablame delivery status id.
pub fn status_reason(status_id: Option<u32>) -> String {
    let Some(id) = status_id.filter(|id| *id != 0) else {
        return "Unknown delivery status".to_string();
    };

    let reason = match id {
        100 => "Message sent successfully",
        101 => "Message queued for delivery",
        102 => "Message rejected, invalid number or blocked",
        103 => "Message failed, unknown error",
        104 => "Delivery error, carrier unreachable",
        105 => "Message expired, not delivered in time",
        106 => "Message rejected due to spam filters",
        107 => "Encoding issue, check special characters",
        108 => "Exceeded daily or campaign limit",
        other => return format!("Unhandled status code: {}", other),
    };
    reason.to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    priority: bool,
    certificate: bool,
    /// `YYYY-MM-DD HH:mm`, UTC
    send_date: String,
    campaign_name: &'a str,
    from: &'a str,
    flash: bool,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    to: &'a str,
    text: &'a str,
}

/// Accepted only when the HTTP status is 2xx and `statusCode` is 200; ids
/// and status ids are read from the first `payLoad.messages` entry.
fn interpret(http_ok: bool, body: &str) -> Result<SentMessage, ProviderError> {
    let response: Value = serde_json::from_str(body.trim()).unwrap_or(Value::Null);
    let first = response.pointer("/payLoad/messages/0");

    let status_code = response.get("statusCode").and_then(scalar_text);
    if http_ok && status_code.as_deref() == Some("200") {
        return Ok(SentMessage {
            channel_message_id: first
                .and_then(|m| m.get("messageId"))
                .and_then(scalar_text),
        });
    }

    let reason = response
        .get("statusMessage")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            first
                .and_then(|m| m.get("statusId"))
                .and_then(scalar_text)
                .and_then(|id| id.parse::<u32>().ok())
                .map(|id| status_reason(Some(id)))
        })
        .unwrap_or_else(|| "Unknown error".to_string());
    Err(ProviderError::Rejected(reason))
}

pub struct HablameProvider {
    config: HablameConfig,
    client: Client,
}

impl HablameProvider {
    pub fn new(config: HablameConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SmsProvider for HablameProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Hablame
    }

    fn default_sender(&self) -> Option<String> {
        Some(self.config.sender.clone())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ProviderError> {
        let request = SendRequest {
            priority: true,
            certificate: false,
            send_date: Utc::now().format("%Y-%m-%d %H:%M").to_string(),
            campaign_name: &message.campaign,
            from: message.from.as_deref().unwrap_or(&self.config.sender),
            flash: false,
            messages: vec![RequestMessage {
                to: &message.to,
                text: &message.body,
            }],
        };

        let response = self
            .client
            .post(format!("{}/api/sms/v5/send", self.config.api_url))
            .header("X-Hablame-Key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;
        debug!(to = %message.to, status = %status, "Hablame response");
        interpret(status.is_success(), &body)
    }
}
