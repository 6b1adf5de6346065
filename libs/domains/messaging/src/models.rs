use domain_campaigns::DeliveryLog;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::providers::WhatsAppTemplate;

pub const DEFAULT_LANGUAGE: &str = "english";
pub const DEFAULT_RECIPIENT_NAME: &str = "sir";

/// Body of `POST /sms/{provider}` and its streaming variant.
///
/// Absent fields deserialize to empty values so they fail validation with a
/// 400 rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SendSmsRequest {
    #[validate(custom(function = "non_blank", message = "Missing required campaign fields."))]
    pub name: String,
    #[validate(custom(function = "non_blank", message = "Missing required campaign fields."))]
    pub country: String,
    #[validate(length(min = 1, message = "Missing required campaign fields."))]
    pub numbers: Vec<String>,
    #[validate(custom(function = "non_blank", message = "Missing required campaign fields."))]
    pub message: String,
    pub language: Option<String>,
    /// Sender override; required for Twilio unless `TWILIO_PHONE_NUMBER` is set
    pub from_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SendWhatsAppRequest {
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub numbers: Vec<String>,
    #[validate(custom(function = "non_blank", message = "Missing required fields"))]
    pub template_sid: String,
    #[validate(custom(function = "non_blank", message = "Missing required fields"))]
    pub campaign_name: String,
    #[validate(custom(function = "non_blank", message = "Missing required fields"))]
    pub country: String,
    /// Fills template variable `{{1}}`, defaults to `sir`
    pub name: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub results: Vec<DeliveryLog>,
    pub campaign_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TemplatesResponse {
    pub templates: Vec<WhatsAppTemplate>,
}

/// What a streaming send reports, in order: one `Progress` per recipient,
/// then exactly one `Done` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Progress { index: usize, log: DeliveryLog },
    Done(Uuid),
    Error(String),
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// `Some(trimmed)` unless absent or blank.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
