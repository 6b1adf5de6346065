use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::country::Country;

/// A stored phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Normalized `+<digits>`, unique across the directory
    pub phone: String,
    pub country: Country,
    #[serde(with = "database::mongodb::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Builds a contact from an already-normalized phone.
    pub fn new(phone: String, country: Country) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            phone,
            country,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One entry of a bulk import, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContactInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ContactInput {
    pub fn new(phone: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            country: Some(country.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateContactsRequest {
    #[serde(default)]
    pub contacts: Option<Vec<ContactInput>>,
}

/// An import entry that was not stored, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkippedContact {
    #[serde(flatten)]
    pub input: ContactInput,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateContactsResponse {
    pub success: bool,
    pub created: Vec<Contact>,
    pub skipped: Vec<SkippedContact>,
}

/// Partial update; omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateContact {
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ByCountryRequest {
    pub country: Option<String>,
}

/// Phones of one country joined with `\n`, ready for a recipients box.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ByCountryResponse {
    pub numbers: String,
}

/// Query parameters for listing contacts
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ContactFilter {
    /// 1-based page (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, max 100)
    pub limit: Option<u64>,
    /// Substring of the phone number
    pub search: Option<String>,
    pub country: Option<String>,
    /// Created at or after (RFC 3339 or YYYY-MM-DD)
    pub from: Option<String>,
    /// Created at or before (RFC 3339 or YYYY-MM-DD)
    pub to: Option<String>,
}

/// Repository-level query, after parsing and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactQuery {
    pub search: Option<String>,
    pub country: Option<Country>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactEnvelope {
    pub contact: Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateContactResponse {
    pub success: bool,
    pub contact: Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteContactResponse {
    pub success: bool,
}
