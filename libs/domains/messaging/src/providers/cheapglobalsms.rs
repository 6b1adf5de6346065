//! CheapGlobalSMS sub-account API.

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

pub const DEFAULT_API_URL: &str = "http://cheapglobalsms.com";

#[derive(Clone)]
pub struct CheapGlobalSmsConfig {
    pub sub_account: String,
    pub password: String,
    pub sender_id: String,
    pub api_url: String,
}

impl CheapGlobalSmsConfig {
    pub fn new(
        sub_account: impl Into<String>,
        password: impl Into<String>,
        sender_id: impl Into<String>,
    ) -> Self {
        Self {
            sub_account: sub_account.into(),
            password: password.into(),
            sender_id: sender_id.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl FromEnv for CheapGlobalSmsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sub_account: credential("CHEAPGLOBALSMS_SUB_ACCOUNT")?,
            password: credential("CHEAPGLOBALSMS_PASSWORD")?,
            sender_id: credential("CHEAPGLOBALSMS_SENDER_ID")?,
            api_url: base_url("CHEAPGLOBALSMS", DEFAULT_API_URL),
        })
    }
}

/// A non-empty string or non-zero numeric `batch_id` means the message
/// was queued.
fn interpret(body: &str) -> Result<SentMessage, ProviderError> {
    let data: Value = serde_json::from_str(body.trim())
        .map_err(|_| ProviderError::Rejected("Invalid JSON response".into()))?;

    let batch_id = data
        .get("batch_id")
        .filter(|id| id.as_f64() != Some(0.0))
        .and_then(scalar_text);
    if let Some(id) = batch_id {
        return Ok(SentMessage::with_id(id));
    }

    let reason = data
        .get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .unwrap_or("Unknown error");
    Err(ProviderError::Rejected(reason.to_string()))
}

pub struct CheapGlobalSmsProvider {
    config: CheapGlobalSmsConfig,
    client: Client,
}

impl CheapGlobalSmsProvider {
    pub fn new(config: CheapGlobalSmsConfig, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl SmsProvider for CheapGlobalSmsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cheapglobalsms
    }

    fn default_sender(&self) -> Option<String> {
        Some(self.config.sender_id.clone())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ProviderError> {
        let sender = message.from.as_deref().unwrap_or(&self.config.sender_id);
        let recipient = message.to.strip_prefix('+').unwrap_or(&message.to);

        let response = self
            .client
            .get(format!("{}/api_v1/", self.config.api_url))
            .query(&[
                ("sub_account", self.config.sub_account.as_str()),
                ("sub_account_pass", self.config.password.as_str()),
                ("action", "send_sms"),
                ("sender_id", sender),
                ("message", message.body.as_str()),
                ("recipients", recipient),
            ])
            .send()
            .await?;

        let body = read_body(response).await?;
        debug!(to = %message.to, response = %body, "CheapGlobalSMS response");
        interpret(&body)
    }
}
