use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use model::client::ClientFields;
use serde::Deserialize;
use serde_json::json;

use crate::{
    classes::ClassQuery,
    context::CurrentAdmin,
    error::{parse_id, ApiError},
    AppState, Principal,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub fields: ClientFields,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Public registration endpoint. Without a class_id it only captures the
/// contact; `force` (seat past capacity) is reserved for signed-in staff.
pub async fn register(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentAdmin>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.force && current.0.is_none() {
        return Err(ApiError::Unauthorized);
    }
    let class_id = request
        .class_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(parse_id)
        .transpose()?;

    let mut session = state.roster.db.start_session().await?;
    let admitted = state
        .roster
        .admission
        .admit(&mut session, request.fields, class_id, request.force)
        .await?;
    Ok(Json(json!({
        "success": true,
        "client_id": admitted.client_id.to_hex(),
        "created_new_client": admitted.created_new_client,
        "already_registered": admitted.already_registered,
        "forced": admitted.forced,
    })))
}

pub async fn list(
    _admin: Principal,
    State(state): State<AppState>,
    Query(query): Query<ClassQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = query.to_filter()?;
    let mut session = state.roster.db.start_session().await?;
    let rows = state.roster.directory.list(&mut session, &filter).await?;
    Ok(Json(json!({ "success": true, "clients": rows })))
}

pub async fn update(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<ClientFields>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    state
        .roster
        .directory
        .update(&mut session, id, fields)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn remove(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    state.roster.directory.delete(&mut session, id).await?;
    Ok(Json(json!({ "success": true })))
}
