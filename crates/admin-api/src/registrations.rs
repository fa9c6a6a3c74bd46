use std::str::FromStr as _;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use model::registration::RegistrationStatus;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{parse_id, ApiError},
    AppState, Principal,
};

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn set_status(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let status = RegistrationStatus::from_str(request.status.trim())
        .map_err(|_| ApiError::bad_request("status must be pending or paid"))?;
    let mut session = state.roster.db.start_session().await?;
    state
        .roster
        .admission
        .set_status(&mut session, id, status)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct RemoveQuery {
    pub class_id: String,
    pub client_id: String,
}

/// Unregisters a client from a class; the registration row is keyed by the
/// pair, not by its own id, matching how the roster table addresses it.
pub async fn remove(
    _admin: Principal,
    State(state): State<AppState>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let class_id = parse_id(&query.class_id)?;
    let client_id = parse_id(&query.client_id)?;
    let mut session = state.roster.db.start_session().await?;
    state
        .roster
        .admission
        .remove(&mut session, class_id, client_id)
        .await?;
    Ok(Json(json!({ "success": true })))
}
