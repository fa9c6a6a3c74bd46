use axum::{
    extract::{Path, Query, State},
    Json,
};
use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use model::class::{Class, ClassFields};
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::classes::ClassFilter;

use crate::{
    error::{parse_id, ApiError},
    AppState, Principal,
};

#[derive(Deserialize, Default)]
pub struct ClassQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub course_type: Option<String>,
}

impl ClassQuery {
    /// `from` and `to` arrive as plain dates; the filter spans the whole of
    /// both days.
    pub(crate) fn to_filter(&self) -> Result<ClassFilter, ApiError> {
        Ok(ClassFilter {
            from: self
                .from
                .as_deref()
                .map(|date| day_bound(date, false))
                .transpose()?,
            to: self
                .to
                .as_deref()
                .map(|date| day_bound(date, true))
                .transpose()?,
            course_type: self
                .course_type
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        })
    }
}

fn day_bound(date: &str, end_of_day: bool) -> Result<DateTime<Utc>, ApiError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Dates must be YYYY-MM-DD"))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    match time {
        Some(time) => Ok(time.and_utc()),
        None => Err(ApiError::bad_request("Dates must be YYYY-MM-DD")),
    }
}

/// JSON shape for the dashboard; stored dates render as RFC 3339 here
/// instead of the extended-JSON form the database layer uses.
#[derive(Serialize)]
pub struct ClassView {
    pub id: ObjectId,
    pub course_type: String,
    pub start_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<u32>,
    pub notes: Option<String>,
    pub registrations: u64,
    pub spots_left: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl ClassView {
    fn new(class: Class, registrations: u64) -> Self {
        let spots_left = class.spots_left(registrations);
        ClassView {
            id: class.id,
            course_type: class.course_type,
            start_at: class.start_at,
            location: class.location,
            price: class.price,
            capacity: class.capacity,
            notes: class.notes,
            registrations,
            spots_left,
            created_at: class.created_at,
        }
    }
}

pub async fn list(
    _admin: Principal,
    State(state): State<AppState>,
    Query(query): Query<ClassQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let filter = query.to_filter()?;
    let mut session = state.roster.db.start_session().await?;
    let classes: Vec<ClassView> = state
        .roster
        .catalog
        .list_with_counts(&mut session, &filter)
        .await?
        .into_iter()
        .map(|(class, registered)| ClassView::new(class, registered))
        .collect();
    Ok(Json(json!({ "success": true, "classes": classes })))
}

pub async fn create(
    _admin: Principal,
    State(state): State<AppState>,
    Json(fields): Json<ClassFields>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = state.roster.db.start_session().await?;
    let id = state.roster.catalog.create(&mut session, fields).await?;
    Ok(Json(json!({ "success": true, "id": id.to_hex() })))
}

pub async fn update(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<ClassFields>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    state.roster.catalog.update(&mut session, id, fields).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn remove(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    state.roster.catalog.delete(&mut session, id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Unauthenticated view backing the public registration page.
pub async fn public_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    let class = state.roster.catalog.public_view(&mut session, id).await?;
    Ok(Json(json!({ "success": true, "class": class })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_span_the_whole_day() {
        let from = day_bound("2026-03-01", false).unwrap();
        let to = day_bound("2026-03-01", true).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-03-01T23:59:59+00:00");
    }

    #[test]
    fn bad_dates_rejected() {
        assert!(day_bound("03/01/2026", false).is_err());
        assert!(day_bound("2026-13-40", true).is_err());
    }

    #[test]
    fn blank_course_type_filter_is_dropped() {
        let query = ClassQuery {
            course_type: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(query.to_filter().unwrap().is_empty());
    }
}
