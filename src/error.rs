use std::collections::BTreeMap;

use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Per-field validation messages, keyed by the offending request field.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(details) => HttpResponse::BadRequest().json(json!({
                "error": "Validation failed",
                "details": details,
            })),
            ApiError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg,
            })),
            ApiError::Conflict(msg) => HttpResponse::Conflict().json(json!({
                "error": msg,
            })),
            // Internals stay server-side; the client gets a generic body.
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Request failed with database error");
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal Server Error",
                }))
            }
        }
    }
}

/// MySQL reports every unique-index violation under SQLSTATE 23000.
/// Inserts that race a pre-check use this to fall back to a 409 instead of
/// surfacing a raw driver error.
pub fn is_duplicate_entry(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use actix_web::body::MessageBody;

    use super::*;

    fn body_json(err: &ApiError) -> serde_json::Value {
        let resp = err.error_response();
        let bytes = resp.into_body().try_into_bytes().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let mut details = FieldErrors::new();
        details.insert("email", "This field is required.".into());

        assert_eq!(
            ApiError::Validation(details).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Employee not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("duplicate".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolClosed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_body_carries_per_field_details() {
        let mut details = FieldErrors::new();
        details.insert("full_name", "This field is required.".into());
        details.insert("email", "Enter a valid email address.".into());

        let body = body_json(&ApiError::Validation(details));
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"]["full_name"], "This field is required.");
        assert_eq!(body["details"]["email"], "Enter a valid email address.");
    }

    #[test]
    fn database_body_does_not_leak_driver_detail() {
        let body = body_json(&ApiError::Database(sqlx::Error::PoolClosed));
        assert_eq!(body["error"], "Internal Server Error");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn non_database_errors_are_not_duplicates() {
        assert!(!is_duplicate_entry(&sqlx::Error::RowNotFound));
        assert!(!is_duplicate_entry(&sqlx::Error::PoolClosed));
    }
}
