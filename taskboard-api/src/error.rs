/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, so every request ends in
/// exactly one JSON response.
///
/// Database failures are logged server-side and surface to clients only as
/// the route's fixed message (`Query execution failed` or `Update failed`).
///
/// # Example
///
/// ```
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(id: i64) -> ApiResult<Json<Value>> {
///     if id < 0 {
///         return Err(ApiError::BadRequest("Negative id".to_string()));
///     }
///     Ok(Json(json!({ "data": id })))
/// }
/// ```
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::auth::authorization::AuthzError;
use taskboard_shared::auth::jwt::JwtError;
use taskboard_shared::auth::middleware::AuthError;
use taskboard_shared::error::BoardError;

/// Public message for failed reads and inserts
pub const QUERY_FAILED: &str = "Query execution failed";

/// Public message for failed card updates
pub const UPDATE_FAILED: &str = "Update failed";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    ///
    /// `message` is returned to the client, `detail` is only logged.
    Internal {
        message: &'static str,
        detail: String,
    },
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Maps a failed read or insert
    pub fn query_failed(err: BoardError) -> Self {
        Self::from_board(err, QUERY_FAILED)
    }

    /// Maps a failed card update
    pub fn update_failed(err: BoardError) -> Self {
        Self::from_board(err, UPDATE_FAILED)
    }

    fn from_board(err: BoardError, message: &'static str) -> Self {
        match err {
            BoardError::Authz(AuthzError::NotAuthorized) => {
                ApiError::Forbidden(AuthzError::NotAuthorized.to_string())
            }
            BoardError::Authz(err @ AuthzError::CardNotFound(_))
            | BoardError::Authz(err @ AuthzError::TaskNotFound(_)) => {
                ApiError::NotFound(err.to_string())
            }
            other => ApiError::Internal {
                message,
                detail: other.to_string(),
            },
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Internal { message, detail } => write!(f, "{}: {}", message, detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Internal { message, detail } => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %detail, "{}", message);
                ("internal_error", message.to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert validator failures to a 422 with one entry per field error
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

/// Convert JSON body rejections so malformed bodies still get a JSON response
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "body".to_string(),
                    message: err.body_text(),
                }])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert path parameter rejections (e.g. a non-numeric id)
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert request authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing authorization header".to_string())
            }
            AuthError::InvalidFormat => ApiError::Unauthorized("Expected Bearer token".to_string()),
            AuthError::InvalidToken(err) => err.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,

        #[validate(range(min = 0, message = "Position must be non-negative"))]
        position: i32,
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Card 3 not found".to_string());
        assert_eq!(err.to_string(), "Not found: Card 3 not found");
    }

    #[test]
    fn test_board_error_mapping() {
        let err = ApiError::query_failed(BoardError::from(AuthzError::NotAuthorized));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = ApiError::update_failed(BoardError::from(AuthzError::CardNotFound(9)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("Card 9 not found"));

        let err = ApiError::query_failed(BoardError::from(AuthzError::TaskNotFound(2)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_database_errors_hide_details() {
        let err = ApiError::update_failed(BoardError::from(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(
            err,
            ApiError::Internal {
                message: UPDATE_FAILED,
                ..
            }
        ));

        let err = ApiError::query_failed(BoardError::from(AuthzError::DatabaseError(
            sqlx::Error::PoolClosed,
        )));
        assert!(matches!(
            err,
            ApiError::Internal {
                message: QUERY_FAILED,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_internal_error_body() {
        let err = ApiError::query_failed(BoardError::from(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.error, "internal_error");
        assert_eq!(body.message, "Query execution failed");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_validation_error() {
        let sample = Sample {
            name: String::new(),
            position: -1,
        };

        let err = ApiError::from(sample.validate().unwrap_err());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");

        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details[0].field, "name");
                assert_eq!(details[0].message, "Name is required");
                assert_eq!(details[1].field, "position");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        let err = ApiError::from(AuthError::MissingCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = ApiError::from(AuthError::InvalidToken(JwtError::Expired));
        assert_eq!(err.to_string(), "Unauthorized: Token expired");
    }
}
