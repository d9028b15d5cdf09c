//! Generation endpoint: request orchestration
//!
//! One inbound request walks the stages Validate -> Compose -> Call ->
//! Extract -> Persist; a failure in any stage maps straight to an HTTP error
//! response. Persistence runs only after successful extraction, so a partial
//! conversation is never written.

use crate::error::ApiError;
use crate::extract;
use crate::models::{GenerateRequest, GenerateResponse, ListResponse};
use crate::prompt;
use crate::server::ServerAppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

/// `POST /generate`
///
/// The body extractor's rejection is folded into the error taxonomy so a
/// malformed body gets the same `{ "error": ... }` shape as every other
/// failure.
pub async fn generate_handler(
    State(state): State<ServerAppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|rejection| ApiError::InvalidInput(format!("Invalid request body: {}", rejection.body_text())))?;
    run_generation(&state, request).await.map(Json)
}

/// Full orchestration for one generation request. Public so integration
/// tests can drive it without going through HTTP.
pub async fn run_generation(
    state: &ServerAppState,
    request: GenerateRequest,
) -> Result<GenerateResponse, ApiError> {
    let user_id = validate_request(&request)?;

    let user_prompt = request.prompt.clone().unwrap_or_default();
    let composed = prompt::build_prompt(&user_prompt, request.existing_files.as_ref());

    let reply = state.client.create_message(&composed).await?;

    if reply.is_truncated() {
        log::warn!("Response truncated due to max_tokens limit");
        return Err(ApiError::Truncated);
    }
    let text = reply.text().ok_or(ApiError::EmptyResponse)?;

    let files = extract::extract_files(text)?;

    let conversation_id = state
        .store
        .create(
            &user_id,
            request.prompt.as_deref(),
            &request.uploaded_files,
            &files,
        )
        .await?;

    Ok(GenerateResponse {
        files,
        conversation_id,
        user_id,
    })
}

/// Input validation. Runs before anything leaves the process: a rejected
/// request never reaches the provider.
fn validate_request(request: &GenerateRequest) -> Result<String, ApiError> {
    let prompt_blank = request
        .prompt
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .is_empty();
    if prompt_blank && request.uploaded_files.is_empty() {
        return Err(ApiError::InvalidInput(
            "Prompt or uploaded files are required".to_string(),
        ));
    }

    match request.user_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ApiError::InvalidInput("userId is required".to_string())),
    }
}

/// Query parameters of `GET /generate`
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// `GET /generate?userId=` — a user's conversation history, newest first
pub async fn list_handler(
    State(state): State<ServerAppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let user_id = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("userId is required".to_string()))?
        .to_string();

    let conversations = state.store.list_by_user(&user_id).await?;
    Ok(Json(ListResponse { conversations }))
}
