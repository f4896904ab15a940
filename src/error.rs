/// Error Handling Module
///
/// Domain error types for the authentication subsystem and the single
/// place where they are mapped to HTTP responses.
/// 1. Domain-Specific Error Types
/// 2. Unified Application Error Type
/// 3. HTTP Response Mapping

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for request payloads
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Storage failures reported by the persistence collaborator
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    QueryExecution(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::QueryExecution(msg) => write!(f, "Query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
                DatabaseError::UniqueConstraintViolation(unique_violation_message(
                    db_err.constraint(),
                ))
            }
            sqlx::Error::Database(_) => DatabaseError::QueryExecution(err.to_string()),
            _ => DatabaseError::UnexpectedError(err.to_string()),
        }
    }
}

/// Client-facing message for a unique constraint violation
fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_email_key") => "Email already registered".to_string(),
        Some(name) => format!("Duplicate key on {}", name),
        None => "Duplicate key".to_string(),
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Authentication errors
///
/// `UserNotFound` exists for server-side diagnostics only. It is reported
/// to clients exactly like `InvalidCredentials`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    MalformedHeader,
    InvalidCredentials,
    UserNotFound,
    InvalidToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingHeader => write!(f, "No authorization header"),
            AuthError::MalformedHeader => write!(f, "Malformed authorization header"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
        }
    }
}

impl StdError for AuthError {}

/// Refresh token store failures.
///
/// `NotFound`, `Expired` and `Revoked` are kept distinct for logging; at
/// the service boundary they all become `AuthError::InvalidToken`.
#[derive(Debug)]
pub enum RefreshTokenError {
    NotFound,
    Expired,
    Revoked,
    Storage(DatabaseError),
}

impl fmt::Display for RefreshTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTokenError::NotFound => write!(f, "Refresh token not found"),
            RefreshTokenError::Expired => write!(f, "Refresh token has expired"),
            RefreshTokenError::Revoked => write!(f, "Refresh token has been revoked"),
            RefreshTokenError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl StdError for RefreshTokenError {}

impl From<DatabaseError> for RefreshTokenError {
    fn from(err: DatabaseError) -> Self {
        RefreshTokenError::Storage(err)
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Database(DatabaseError),
    Hashing(String),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "Password hashing failed: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        match err {
            RefreshTokenError::Storage(e) => AppError::Database(e),
            _ => AppError::Auth(AuthError::InvalidToken),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                e.to_string(),
            ),

            // Nothing here may reveal which check rejected the request
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials | AuthError::UserNotFound => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    "Incorrect email or password".to_string(),
                ),
                AuthError::InvalidToken | AuthError::MissingHeader | AuthError::MalformedHeader => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Unauthorized".to_string(),
                ),
            },

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_ENTRY",
                    e.to_string(),
                ),
                DatabaseError::ConnectionPool(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Something went wrong".to_string(),
                ),
            },

            AppError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Something went wrong".to_string(),
            ),

            AppError::Hashing(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Something went wrong".to_string(),
            ),
        };

        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication rejected");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Forbidden(msg) => {
                tracing::warn!(request_id = request_id, reason = %msg, "Forbidden operation");
            }
            AppError::Hashing(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Password hashing error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
                DatabaseError::ConnectionPool(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Hashing(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email");
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_unique_violation_names_the_constraint() {
        assert_eq!(
            unique_violation_message(Some("users_email_key")),
            "Email already registered"
        );
        assert_eq!(
            unique_violation_message(Some("refresh_tokens_pkey")),
            "Duplicate key on refresh_tokens_pkey"
        );
        assert_eq!(unique_violation_message(None), "Duplicate key");
    }

    #[test]
    fn test_refresh_token_errors_collapse_to_invalid_token() {
        for err in [
            RefreshTokenError::NotFound,
            RefreshTokenError::Expired,
            RefreshTokenError::Revoked,
        ] {
            match AppError::from(err) {
                AppError::Auth(AuthError::InvalidToken) => (),
                other => panic!("Expected InvalidToken, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_refresh_token_storage_error_stays_infrastructure() {
        let err = RefreshTokenError::Storage(DatabaseError::QueryExecution("boom".to_string()));
        assert!(matches!(AppError::from(err), AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_http_response_carries_error_id() {
        let response =
            ResponseError::error_response(&AppError::Auth(AuthError::InvalidCredentials));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(uuid::Uuid::parse_str(body["error_id"].as_str().unwrap()).is_ok());
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[test]
    fn test_user_not_found_looks_like_wrong_password() {
        let missing = AppError::Auth(AuthError::UserNotFound);
        let wrong = AppError::Auth(AuthError::InvalidCredentials);

        let (status_a, body_a) = ErrorHandler::error_response(&missing, "a");
        let (status_b, body_b) = ErrorHandler::error_response(&wrong, "b");

        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_a, status_b);
        assert_eq!(body_a.code, body_b.code);
        assert_eq!(body_a.message, body_b.message);
    }

    #[test]
    fn test_token_failures_are_indistinguishable() {
        let kinds = [
            AuthError::InvalidToken,
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
        ];
        let bodies: Vec<_> = kinds
            .iter()
            .map(|k| ErrorHandler::error_response(&AppError::Auth(k.clone()), "id").1)
            .collect();

        assert!(bodies.iter().all(|b| b.status == 401));
        assert!(bodies.iter().all(|b| b.message == bodies[0].message));
    }

    #[test]
    fn test_infrastructure_errors_are_generic() {
        let err = AppError::Hashing("entropy source exhausted".to_string());
        let (status, body) = ErrorHandler::error_response(&err, "id");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("entropy"));
    }
}
