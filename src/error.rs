use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failure taxonomy. Every variant is terminal for its
/// request; the service performs no retries anywhere.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or both (team, year) lookups returned zero rows.
    #[error("One or both teams not found")]
    TeamNotFound,

    /// A statistic column the model was trained on is absent from a fetched
    /// row. The store schema has drifted from the model's feature list.
    #[error("statistic column '{column}' missing from store row")]
    MissingStat { column: String },

    /// The feature vector did not match what the loaded model expects.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Backing store unreachable, or returned an unusable response.
    #[error(transparent)]
    StoreUnavailable(#[from] anyhow::Error),

    /// num_simulations must be a positive integer.
    #[error("num_simulations must be at least 1")]
    InvalidSimulations,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::TeamNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidSimulations => StatusCode::BAD_REQUEST,
            ApiError::MissingStat { .. }
            | ApiError::Inference(_)
            | ApiError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures keep their detail in the
    /// logs and surface only a generic description to the caller.
    fn public_message(&self) -> String {
        match self {
            ApiError::TeamNotFound | ApiError::InvalidSimulations => self.to_string(),
            ApiError::MissingStat { .. } | ApiError::Inference(_) => {
                "Prediction failed due to a server-side configuration error".to_string()
            }
            ApiError::StoreUnavailable(_) => "Failed to query the statistics store".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
