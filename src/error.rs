use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Everything that can go wrong in the link core.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Malformed target URL or custom code. Carries the user-facing message.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Short code already exists")]
    CodeConflict,

    /// Never-created and deleted codes are reported the same way.
    #[error("Link not found")]
    NotFound,

    /// Every generated candidate collided.
    #[error("no free short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("link store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl LinkError {
    pub fn status(&self) -> StatusCode {
        match self {
            LinkError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LinkError::CodeConflict => StatusCode::CONFLICT,
            LinkError::NotFound => StatusCode::NOT_FOUND,
            LinkError::CodeSpaceExhausted { .. } | LinkError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to a client. Internal failures are generic.
    pub fn public_message(&self) -> String {
        match self {
            LinkError::CodeSpaceExhausted { .. } | LinkError::StoreUnavailable(_) => {
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
