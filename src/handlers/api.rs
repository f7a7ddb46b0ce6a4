use crate::{
    directory::CodeChoice,
    error::LinkError,
    models::{CreateLinkRequest, Link},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// POST /api/links
///
/// Body: `{ "targetUrl": string, "code"?: string }`. Replies 201 with the new
/// link, 400 on validation failure, 409 when a custom code is taken.
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Link>), LinkError> {
    let Json(req) = payload.map_err(|rejection| LinkError::InvalidInput(rejection.body_text()))?;

    let target_url = req
        .target_url
        .ok_or_else(|| LinkError::InvalidInput("targetUrl is required".into()))?;

    let link = state
        .directory
        .create_link(&target_url, CodeChoice::from_optional(req.code.as_deref()))
        .await?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// GET /api/links
pub async fn list_links(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Link>>, LinkError> {
    Ok(Json(state.directory.list_links().await?))
}

/// GET /api/links/:code
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Link>, LinkError> {
    Ok(Json(state.directory.get_link(&code).await?))
}

/// DELETE /api/links/:code
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<Value>, LinkError> {
    state.directory.delete_link(&code).await?;
    Ok(Json(json!({ "message": "Link deleted successfully" })))
}
