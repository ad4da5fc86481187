use axum::http::StatusCode;
use thiserror::Error;

/// Rejections raised by the update layer. A rejected update never touches the state.
#[derive(Debug, Error, PartialEq)]
pub enum UpdateError {
    #[error("campaign name must not be empty")]
    EmptyName,
    #[error("campaign '{0}' already exists")]
    DuplicateCampaign(String),
    #[error("campaign '{0}' does not exist")]
    UnknownCampaign(String),
    #[error("unknown {group} field '{name}'")]
    UnknownField { group: &'static str, name: String },
    #[error("'{field}' is derived and cannot be edited")]
    DerivedField { field: String },
    #[error("clicked ({clicked}) exceeds delivered ({delivered})")]
    ClickedExceedsDelivered { clicked: u64, delivered: u64 },
    #[error("age buckets total {total} exceeds {registrants} registrants")]
    PopulationExceeded { total: u64, registrants: u64 },
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<UpdateError> for AppError {
    fn from(err: UpdateError) -> Self {
        let status = match err {
            UpdateError::DuplicateCampaign(_) => StatusCode::CONFLICT,
            UpdateError::UnknownCampaign(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
