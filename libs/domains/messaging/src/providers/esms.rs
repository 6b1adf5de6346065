//! ESMS (positiveapi) v3 send endpoint.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv};
use domain_campaigns::ProviderKind;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{
    OutboundMessage, SentMessage, SmsProvider, base_url, credential, read_body, scalar_text,
};
use crate::error::ProviderError;

pub const DEFAULT_API_URL: &str = "https://xend.positiveapi.com";

#[derive(Clone)]
pub struct EsmsConfig {
    pub api_token: String,
    pub sender_id: String,
    pub api_url: String,
}

impl EsmsConfig {
    pub fn new(api_token: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            sender_id: sender_id.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl FromEnv for EsmsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_token: credential("ESMS_API_TOKEN")?,
            sender_id: credential("ESMS_SENDER_ID")?,
            api_url: base_url("ESMS", DEFAULT_API_URL),
        })
    }
}

/// `status == "success"` (any case) means accepted; `data.uid` is optional.
fn interpret(body: &str) -> Result<SentMessage, ProviderError> {
    let response: Value = serde_json::from_str(body.trim()).unwrap_or(Value::Null);

    let accepted = response
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("success"));

    if accepted {
        return Ok(SentMessage {
            channel_message_id: response.pointer("/data/uid").and_then(scalar_text),
        });
    }

    let reason = response
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("Unknown error");
    Err(ProviderError::Rejected(reason.to_string()))
}

pub struct EsmsProvider {
    config: EsmsConfig,
    client: Client,
}

impl EsmsProvider {
    pub fn new(config: EsmsConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SmsProvider for EsmsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Esms
    }

    fn default_sender(&self) -> Option<String> {
        Some(self.config.sender_id.clone())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ProviderError> {
        let sender = message.from.as_deref().unwrap_or(&self.config.sender_id);

        let response = self
            .client
            .post(format!("{}/api/v3/sms/send", self.config.api_url))
            .bearer_auth(&self.config.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("recipient", message.to.as_str()),
                ("sender_id", sender),
                ("type", "plain"),
                ("message", message.body.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;
        debug!(to = %message.to, status = %status, "ESMS response");
        interpret(&body)
    }
}
