use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use roster::export::{group_requests_csv, roster_csv};

use crate::{
    error::{parse_id, ApiError},
    requests::{parse_filter, RequestQuery},
    AppState, Principal,
};

fn csv_download(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}

pub async fn group_requests(
    _admin: Principal,
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = parse_filter(&query)?;
    let mut session = state.roster.db.start_session().await?;
    let requests = state.roster.requests.list(&mut session, &filter).await?;
    let csv = group_requests_csv(&requests)?;
    Ok(csv_download("group_requests.csv", csv))
}

pub async fn roster(
    _admin: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let class_id = parse_id(&id)?;
    let mut session = state.roster.db.start_session().await?;
    let rows = state.roster.admission.roster(&mut session, class_id).await?;
    let csv = roster_csv(&rows)?;
    Ok(csv_download(&format!("roster_{}.csv", class_id.to_hex()), csv))
}
