//! Error taxonomy for the generation pipeline
//!
//! Every failure a request can hit maps to exactly one variant here, and
//! every variant maps to one HTTP status. Inner components return these
//! directly so the route handlers never have to re-wrap anything.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-side validation failure. Never retried, never reaches the provider.
    #[error("{0}")]
    InvalidInput(String),

    /// ANTHROPIC_API_KEY missing from the environment. Surfaced at request
    /// time rather than startup so the list endpoint keeps working without it.
    #[error("API key not configured")]
    MissingApiKey,

    /// Provider kept answering 529 until the retry budget ran out.
    #[error("Provider overloaded (status 529): retries exhausted after {attempts} attempts")]
    Overloaded { attempts: u32 },

    /// Non-overload provider failure, surfaced immediately without retry.
    #[error("Anthropic API error! status: {status}")]
    Upstream { status: u16 },

    /// Transport-level failure on the final attempt.
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Retry loop exited without producing a response or a specific error.
    #[error("Max retries reached")]
    RetriesExhausted,

    /// The model stopped at the token ceiling. Keyword "truncated" is stable:
    /// clients pattern-match it to show a friendlier message.
    #[error("Response truncated: increase max_tokens or simplify the prompt")]
    Truncated,

    /// Provider returned a well-formed reply with no generated text in it.
    #[error("No content generated by the provider")]
    EmptyResponse,

    /// No recoverable JSON in the model output.
    #[error("{0}")]
    Parse(String),

    /// Required files absent even after backfill.
    #[error("Missing required files: {}", .0.join(", "))]
    MissingFiles(Vec<String>),

    /// Conversation store unavailable or a write failed.
    #[error("Storage error: {0}")]
    Store(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body shape shared by every failure response: `{ "error": "..." }`
#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Rejected request: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
