use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_campaigns::{CampaignError, ProviderKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Unsupported provider: {0}")]
    UnknownProvider(String),

    #[error("Provider '{0}' is not configured")]
    NotConfigured(ProviderKind),

    #[error("{0} is not configured")]
    MissingSetting(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Failed to fetch templates")]
    Templates(#[source] ProviderError),

    #[error(transparent)]
    Campaign(#[from] CampaignError),
}

pub type MessagingResult<T> = Result<T, MessagingError>;

impl From<MessagingError> for AppError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::UnknownProvider(_) | MessagingError::Validation(_) => {
                AppError::BadRequest(err.to_string())
            }
            MessagingError::NotConfigured(_) | MessagingError::MissingSetting(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            MessagingError::Templates(ref source) => {
                tracing::error!(error = %source, "Template lookup failed");
                AppError::Provider(err.to_string())
            }
            MessagingError::Campaign(e) => e.into(),
        }
    }
}

impl IntoResponse for MessagingError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Why a single provider call did not deliver.
///
/// The `Display` text is what ends up in the recipient's delivery log.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Connect, timeout or unreadable body
    #[error("Network error: {0}")]
    Network(String),

    /// The vendor answered and refused the message
    #[error("{0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.to_string())
    }
}
