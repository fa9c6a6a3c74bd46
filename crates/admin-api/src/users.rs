use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{parse_id, ApiError},
    AppState, Principal,
};

pub async fn list(
    _admin: Principal,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = state.roster.db.start_session().await?;
    let users = state.roster.admins.list(&mut session).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn create(
    _admin: Principal,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = state.roster.db.start_session().await?;
    let id = state
        .roster
        .admins
        .create(&mut session, &request.email, &request.password)
        .await?;
    Ok(Json(json!({ "success": true, "id": id.to_hex() })))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn update(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    state
        .roster
        .admins
        .update(
            &mut session,
            id,
            request.email.as_deref(),
            request.password.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn remove(
    Principal(actor): Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    session.set_actor(actor.id);
    state.roster.admins.delete(&mut session, id).await?;
    Ok(Json(json!({ "success": true })))
}
