use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::mongodb::is_duplicate_key;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Contact not found")]
    NotFound(Uuid),

    #[error("Duplicate contact number.")]
    Duplicate,

    #[error("Unsupported country: {0}")]
    UnsupportedCountry(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ContactResult<T> = Result<T, ContactError>;

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound(_) => AppError::NotFound(err.to_string()),
            ContactError::Duplicate => AppError::Conflict(err.to_string()),
            ContactError::UnsupportedCountry(_) | ContactError::Validation(_) => {
                AppError::BadRequest(err.to_string())
            }
            ContactError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<mongodb::error::Error> for ContactError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            ContactError::Duplicate
        } else {
            ContactError::Database(err.to_string())
        }
    }
}

impl From<AppError> for ContactError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ContactError::Validation(msg),
            other => ContactError::Database(other.to_string()),
        }
    }
}
