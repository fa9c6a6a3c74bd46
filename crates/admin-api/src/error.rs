use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bson::oid::ObjectId;
use serde_json::json;

use roster::Error;

/// Wire-level error: `{"success": false, "message": ...}` plus count detail
/// on conflicts so the dashboard can offer an informed override.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Domain(Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Domain(Error::Validation(message.into()))
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        ApiError::Domain(value)
    }
}

impl From<eyre::Error> for ApiError {
    fn from(value: eyre::Error) -> Self {
        ApiError::Domain(Error::Common(value))
    }
}

pub(crate) fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::ClassNotFound
        | Error::ClientNotFound
        | Error::RegistrationNotFound
        | Error::RequestNotFound
        | Error::AdminNotFound => StatusCode::NOT_FOUND,
        Error::ClassFull { .. }
        | Error::DeleteBlocked { .. }
        | Error::CapacityBelowRegistered { .. }
        | Error::EmailTaken
        | Error::SelfDelete
        | Error::LastAdmin => StatusCode::CONFLICT,
        Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
        Error::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Unauthorized" }),
            ),
            ApiError::Domain(err) => {
                let status = status_for(&err);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    log::error!("request failed: {:?}", err);
                }
                let mut body = json!({ "success": false, "message": err.to_string() });
                match &err {
                    Error::ClassFull {
                        capacity,
                        registered,
                    } => {
                        body["capacity"] = json!(capacity);
                        body["registered"] = json!(registered);
                    }
                    Error::DeleteBlocked { registrations } => {
                        body["registrations"] = json!(registrations);
                    }
                    Error::CapacityBelowRegistered {
                        capacity,
                        registered,
                    } => {
                        body["capacity"] = json!(capacity);
                        body["registered"] = json!(registered);
                    }
                    _ => {}
                }
                (status, body)
            }
        };
        (status, Json(body)).into_response()
    }
}

pub(crate) fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::bad_request("Valid id required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_family_maps_to_409() {
        for err in [
            Error::ClassFull {
                capacity: 2,
                registered: 2,
            },
            Error::DeleteBlocked { registrations: 3 },
            Error::CapacityBelowRegistered {
                capacity: 1,
                registered: 4,
            },
            Error::EmailTaken,
            Error::LastAdmin,
        ] {
            assert_eq!(status_for(&err), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn not_found_and_validation_are_distinct() {
        assert_eq!(status_for(&Error::ClassNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&Error::Validation("email required".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_failures_are_500() {
        assert_eq!(
            status_for(&Error::Common(eyre::eyre!("connection reset"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-an-oid").is_err());
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);
    }
}
