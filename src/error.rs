//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It covers the domain failures of registration, login, token verification and the
//! ownership-scoped task/list operations, plus the infrastructure failures (database,
//! validation, hashing) that can surface underneath them.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly convert
//! application errors into appropriate HTTP responses with JSON bodies.
//! It also provides `From` trait implementations for `sqlx::Error`,
//! `validator::ValidationErrors` and `bcrypt::BcryptError`, allowing for easy
//! conversion using the `?` operator.

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// A username or email is already taken by another account.
    DuplicateIdentity,
    /// Login failed. Unknown usernames and wrong passwords both map here.
    InvalidCredentials,
    /// The bearer token is missing, malformed, or its signature does not verify.
    InvalidToken(String),
    /// The bearer token verified but its expiry instant has passed.
    TokenExpired,
    /// The token subject no longer resolves to an active user.
    UserNotFound,
    /// A task or list does not exist for the requesting user (HTTP 404).
    NotFound(String),
    /// A task refers to a list the requesting user does not own.
    InvalidReference(String),
    /// The user already has a task list with this name.
    DuplicateName(String),
    /// The request body, query string or path could not be parsed (HTTP 400).
    BadRequest(String),
    /// Represents an error due to failed input validation (HTTP 422 Unprocessable Entity).
    /// Wraps errors from the `validator` crate.
    ValidationError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// Wraps errors from the `sqlx` crate.
    DatabaseError(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::DuplicateIdentity => write!(f, "Username or email already registered"),
            AppError::InvalidCredentials => write!(f, "Invalid username or password"),
            AppError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AppError::TokenExpired => write!(f, "Token expired"),
            AppError::UserNotFound => write!(f, "User not found"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InvalidReference(msg) => write!(f, "Invalid reference: {}", msg),
            AppError::DuplicateName(msg) => write!(f, "Duplicate name: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl AppError {
    /// Message placed in the JSON body. Internal details of database and server
    /// errors stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidToken(_) => "Invalid token".to_string(),
            AppError::NotFound(msg)
            | AppError::InvalidReference(msg)
            | AppError::DuplicateName(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg) => msg.clone(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            AppError::InternalServerError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Authentication failures all surface as 401 with a `WWW-Authenticate: Bearer`
/// challenge, ownership misses as 404, and bad references or duplicates as 400.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::InvalidToken(_)
            | AppError::TokenExpired
            | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateIdentity
            | AppError::InvalidReference(_)
            | AppError::DuplicateName(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }

        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::DatabaseError`. Unique-constraint violations are mapped by
/// the Postgres store itself since only it knows which constraint fired.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_responses() {
        let error = AppError::InvalidCredentials;
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::InvalidToken("bad signature".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::TokenExpired;
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::UserNotFound;
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::NotFound("Task not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::DuplicateIdentity;
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::InvalidReference("Invalid list ID".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::DuplicateName("List name already exists".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::BadRequest("Json deserialize error".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::ValidationError("title: length".into());
        assert_eq!(error.error_response().status(), 422);

        let error = AppError::DatabaseError("connection reset".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = AppError::TokenExpired.error_response();
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok());
        assert_eq!(challenge, Some("Bearer"));

        let response = AppError::NotFound("Task not found".into()).error_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let error = AppError::DatabaseError("relation \"users\" does not exist".into());
        assert_eq!(error.public_message(), "Database error");

        let error = AppError::InvalidToken("InvalidSignature".into());
        assert_eq!(error.public_message(), "Invalid token");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));
    }
}
