//! Twilio Programmable Messaging (SMS + WhatsApp) and Content API templates.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional};
use domain_campaigns::ProviderKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{OutboundMessage, SentMessage, SmsProvider, base_url, credential, read_body};
use crate::error::ProviderError;

pub const DEFAULT_API_URL: &str = "https://api.twilio.com";
pub const DEFAULT_CONTENT_API_URL: &str = "https://content.twilio.com";

const WHATSAPP_PREFIX: &str = "whatsapp:";
const NO_BODY: &str = "No body content found";

#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Default SMS sender (`TWILIO_PHONE_NUMBER`)
    pub phone_number: Option<String>,
    /// WhatsApp sender (`TWILIO_WHATSAPP_FROM`)
    pub whatsapp_from: Option<String>,
    pub api_url: String,
    pub content_api_url: String,
}

impl TwilioConfig {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            phone_number: None,
            whatsapp_from: None,
            api_url: DEFAULT_API_URL.to_string(),
            content_api_url: DEFAULT_CONTENT_API_URL.to_string(),
        }
    }

    pub fn with_phone_number(mut self, number: impl Into<String>) -> Self {
        self.phone_number = Some(number.into());
        self
    }

    pub fn with_whatsapp_from(mut self, from: impl Into<String>) -> Self {
        self.whatsapp_from = Some(from.into());
        self
    }

    /// Points both the messaging and the content API at `url`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_url = url.clone();
        self.content_api_url = url;
        self
    }
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"***")
            .field("phone_number", &self.phone_number)
            .field("whatsapp_from", &self.whatsapp_from)
            .field("api_url", &self.api_url)
            .field("content_api_url", &self.content_api_url)
            .finish()
    }
}

impl FromEnv for TwilioConfig {
    /// Requires `TWILIO_ACCOUNT_SID` and `TWILIO_AUTH_TOKEN`.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            account_sid: credential("TWILIO_ACCOUNT_SID")?,
            auth_token: credential("TWILIO_AUTH_TOKEN")?,
            phone_number: env_optional("TWILIO_PHONE_NUMBER"),
            whatsapp_from: env_optional("TWILIO_WHATSAPP_FROM"),
            api_url: base_url("TWILIO", DEFAULT_API_URL),
            content_api_url: base_url("TWILIO_CONTENT", DEFAULT_CONTENT_API_URL),
        })
    }
}

/// Error body returned by the Twilio REST API.
#[derive(Debug, Deserialize)]
struct TwilioApiError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentList {
    #[serde(default)]
    contents: Vec<ContentResource>,
}

#[derive(Debug, Deserialize)]
struct ContentResource {
    sid: String,
    #[serde(default)]
    friendly_name: String,
    language: Option<String>,
    #[serde(rename = "whatsApp")]
    whatsapp: Option<WhatsAppApproval>,
    #[serde(default)]
    components: Vec<ContentComponent>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppApproval {
    #[serde(default)]
    approved: bool,
}

#[derive(Debug, Deserialize)]
struct ContentComponent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// An approved WhatsApp message template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppTemplate {
    pub sid: String,
    pub friendly_name: String,
    pub language: String,
    pub content: TemplateContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemplateContent {
    pub text: String,
}

impl From<ContentResource> for WhatsAppTemplate {
    fn from(resource: ContentResource) -> Self {
        let text = resource
            .components
            .into_iter()
            .find(|c| c.kind == "body")
            .and_then(|c| c.text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_BODY.to_string());

        Self {
            sid: resource.sid,
            friendly_name: resource.friendly_name,
            language: resource
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "en".to_string()),
            content: TemplateContent { text },
        }
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

pub struct TwilioClient {
    config: TwilioConfig,
    client: Client,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    /// Sender used for WhatsApp sends, if configured.
    pub fn whatsapp_sender(&self) -> Option<String> {
        self.config.whatsapp_from.as_deref().map(whatsapp_address)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_url, self.config.account_sid
        )
    }

    async fn create_message(&self, params: &[(&str, &str)]) -> Result<SentMessage, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(params)
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;

        if status.is_success() {
            let sid = serde_json::from_str::<MessageResource>(&body)
                .ok()
                .and_then(|m| m.sid);
            debug!(sid = ?sid, "Twilio accepted message");
            return Ok(SentMessage {
                channel_message_id: sid,
            });
        }

        let message = serde_json::from_str::<TwilioApiError>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "Twilio API error".to_string());
        warn!(status = %status, error = %message, "Twilio rejected message");
        Err(ProviderError::Rejected(message))
    }

    /// Sends an approved template to one WhatsApp number.
    ///
    /// `name` fills template variable `{{1}}`.
    pub async fn send_whatsapp(
        &self,
        to: &str,
        template_sid: &str,
        name: &str,
    ) -> Result<SentMessage, ProviderError> {
        let from = self
            .whatsapp_sender()
            .ok_or_else(|| ProviderError::Rejected("WhatsApp sender is not configured".into()))?;
        let to = whatsapp_address(to);
        let variables = serde_json::json!({ "1": name }).to_string();

        self.create_message(&[
            ("To", to.as_str()),
            ("From", from.as_str()),
            ("ContentSid", template_sid),
            ("ContentVariables", variables.as_str()),
        ])
        .await
    }

    /// WhatsApp-approved templates from the Content API.
    pub async fn list_templates(&self) -> Result<Vec<WhatsAppTemplate>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/Content", self.config.content_api_url))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        let status = response.status();
        let body = read_body(response).await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TwilioApiError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Twilio Content API returned {}", status));
            return Err(ProviderError::Rejected(message));
        }

        let list: ContentList = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Rejected(format!("Invalid Content API response: {}", e)))?;

        Ok(list
            .contents
            .into_iter()
            .filter(|c| c.whatsapp.as_ref().is_some_and(|w| w.approved))
            .map(WhatsAppTemplate::from)
            .collect())
    }
}

#[async_trait]
impl SmsProvider for TwilioClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Twilio
    }

    fn default_sender(&self) -> Option<String> {
        self.config.phone_number.clone()
    }

    async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, ProviderError> {
        let from = message
            .from
            .clone()
            .or_else(|| self.default_sender())
            .ok_or_else(|| ProviderError::Rejected("fromNumber is required for Twilio".into()))?;

        self.create_message(&[
            ("To", message.to.as_str()),
            ("From", from.as_str()),
            ("Body", message.body.as_str()),
        ])
        .await
    }
}
