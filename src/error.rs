use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Same operation is already running
    #[error("{0}")]
    Busy(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}

const ER_DUP_ENTRY: u16 = 1062;
const ER_NO_REFERENCED_ROW_2: u16 = 1452;

/// Integrity failures an insert can hit. SQLSTATE 23000 covers both, so the
/// MySQL error number tells them apart.
#[derive(Debug, PartialEq, Eq)]
enum Integrity {
    Duplicate,
    MissingReference,
}

fn integrity_kind(number: u16) -> Option<Integrity> {
    match number {
        ER_DUP_ENTRY => Some(Integrity::Duplicate),
        ER_NO_REFERENCED_ROW_2 => Some(Integrity::MissingReference),
        _ => None,
    }
}

fn mysql_error_number(e: &sqlx::Error) -> Option<u16> {
    match e {
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(MySqlDatabaseError::number),
        _ => None,
    }
}

fn integrity_of(e: &sqlx::Error) -> Option<Integrity> {
    mysql_error_number(e).and_then(integrity_kind)
}

pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    integrity_of(e) == Some(Integrity::Duplicate)
}

impl AppError {
    /// Maps a failed insert: unique key clash to `Conflict`, dangling foreign
    /// key to `NotFound`, anything else to `Database`.
    pub fn from_insert(e: sqlx::Error, duplicate: &str, missing: &str) -> Self {
        match integrity_of(&e) {
            Some(Integrity::Duplicate) => AppError::Conflict(duplicate.to_string()),
            Some(Integrity::MissingReference) => AppError::NotFound(missing.to_string()),
            None => AppError::Database(e),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Busy(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal Server Error".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!(error = %e, "Serialization failed");
                "Internal Server Error".to_string()
            }
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "Upstream call failed");
                "Remote service unavailable, try again later".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            AppError::validation("bad month").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Busy("running".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Upstream("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_is_not_a_duplicate() {
        assert!(!is_duplicate_key(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn mysql_error_numbers_split_duplicates_from_missing_references() {
        assert_eq!(integrity_kind(1062), Some(Integrity::Duplicate));
        assert_eq!(integrity_kind(1452), Some(Integrity::MissingReference));
        // NOT NULL violations share SQLSTATE 23000 but are neither
        assert_eq!(integrity_kind(1048), None);
    }

    #[test]
    fn serialization_failures_are_internal_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(json_err);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_integrity_insert_failures_stay_database_errors() {
        let err = AppError::from_insert(sqlx::Error::RowNotFound, "taken", "User not found");
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
