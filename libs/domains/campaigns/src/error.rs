use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Campaign not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CampaignResult<T> = Result<T, CampaignError>;

impl From<CampaignError> for AppError {
    fn from(err: CampaignError) -> Self {
        match err {
            CampaignError::NotFound(_) => AppError::NotFound(err.to_string()),
            CampaignError::Validation(msg) => AppError::BadRequest(msg),
            CampaignError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CampaignError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<mongodb::error::Error> for CampaignError {
    fn from(err: mongodb::error::Error) -> Self {
        CampaignError::Database(err.to_string())
    }
}

impl From<AppError> for CampaignError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => CampaignError::Validation(msg),
            other => CampaignError::Database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for CampaignError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| err.to_string());
        CampaignError::Validation(message)
    }
}
