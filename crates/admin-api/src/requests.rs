use std::str::FromStr as _;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use model::group_request::{GroupRequest, GroupRequestForm, GroupRequestStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::group_requests::GroupRequestFilter;

use crate::{
    classes::ClassQuery,
    error::{parse_id, ApiError},
    AppState, Principal,
};

/// Public intake from the "train my team" form.
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<GroupRequestForm>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = state.roster.db.start_session().await?;
    let id = state.roster.requests.submit(&mut session, form).await?;
    Ok(Json(json!({ "success": true, "id": id.to_hex() })))
}

#[derive(Deserialize, Default)]
pub struct RequestQuery {
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Serialize)]
pub struct RequestView {
    pub id: ObjectId,
    pub org_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub course_type: String,
    pub participants: u32,
    pub location_pref: Option<String>,
    pub address: Option<String>,
    pub preferred_dates: Option<String>,
    pub notes: Option<String>,
    pub status: GroupRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupRequest> for RequestView {
    fn from(request: GroupRequest) -> RequestView {
        RequestView {
            id: request.id,
            org_name: request.org_name,
            contact_name: request.contact_name,
            email: request.email,
            phone: request.phone,
            course_type: request.course_type,
            participants: request.participants,
            location_pref: request.location_pref,
            address: request.address,
            preferred_dates: request.preferred_dates,
            notes: request.notes,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

pub(crate) fn parse_filter(query: &RequestQuery) -> Result<GroupRequestFilter, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            GroupRequestStatus::from_str(value)
                .map_err(|_| ApiError::bad_request("Unknown status"))
        })
        .transpose()?;
    let dates = ClassQuery {
        from: query.from.clone(),
        to: query.to.clone(),
        course_type: None,
    }
    .to_filter()?;
    Ok(GroupRequestFilter {
        status,
        from: dates.from,
        to: dates.to,
    })
}

pub async fn list(
    _admin: Principal,
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = parse_filter(&query)?;
    let mut session = state.roster.db.start_session().await?;
    let requests: Vec<RequestView> = state
        .roster
        .requests
        .list(&mut session, &filter)
        .await?
        .into_iter()
        .map(RequestView::from)
        .collect();
    Ok(Json(json!({ "success": true, "requests": requests })))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn update(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let status = request
        .status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            GroupRequestStatus::from_str(value)
                .map_err(|_| ApiError::bad_request("Unknown status"))
        })
        .transpose()?;
    let mut session = state.roster.db.start_session().await?;
    state
        .roster
        .requests
        .update(&mut session, id, status, request.notes)
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_status_and_dates() {
        let filter = parse_filter(&RequestQuery {
            status: Some("contacted".to_string()),
            from: Some("2026-01-01".to_string()),
            to: None,
        })
        .unwrap();
        assert_eq!(filter.status, Some(GroupRequestStatus::Contacted));
        assert!(filter.from.is_some());
        assert!(filter.to.is_none());
    }

    #[test]
    fn unknown_status_rejected() {
        let result = parse_filter(&RequestQuery {
            status: Some("archived".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
