/// Task endpoints
///
/// Tasks are exposed under `/todos`. Both endpoints require JWT
/// authentication and check that the caller owns every card involved.
///
/// # Endpoints
///
/// - `POST /todos` - Create task
/// - `PUT /todos/:todo` - Overwrite task description, position and card
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{DataResponse, IdPath, Payload},
};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    board::{self, NewTask},
    models::task::{Task, UpdateTask},
};
use validator::Validate;

/// Create or update task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    #[serde(default)]
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: String,

    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: i32,

    pub card_id: i64,
}

/// Create task
///
/// # Endpoint
///
/// ```text
/// POST /todos
/// Authorization: Bearer <jwt_token>
///
/// { "description": "Write docs", "position": 0, "cardId": 1 }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Card belongs to someone else
/// - `404 Not Found`: Card not found
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: `Query execution failed`
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Payload(req): Payload<TodoRequest>,
) -> ApiResult<Json<DataResponse<Task>>> {
    req.validate()?;

    let task = board::create_task(
        &state.db,
        &auth,
        NewTask {
            description: req.description,
            position: req.position,
            card_id: req.card_id,
        },
    )
    .await
    .map_err(ApiError::query_failed)?;

    Ok(Json(DataResponse::new(task)))
}

/// Update task
///
/// # Endpoint
///
/// ```text
/// PUT /todos/:todo
/// Authorization: Bearer <jwt_token>
///
/// { "description": "Write docs", "position": 3, "cardId": 2 }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Task or target card belongs to someone else
/// - `404 Not Found`: Task or target card not found
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: `Query execution failed`
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(todo_id): IdPath<i64>,
    Payload(req): Payload<TodoRequest>,
) -> ApiResult<Json<DataResponse<Task>>> {
    req.validate()?;

    let task = board::update_task(
        &state.db,
        &auth,
        todo_id,
        UpdateTask {
            description: req.description,
            position: req.position,
            card_id: req.card_id,
        },
    )
    .await
    .map_err(ApiError::query_failed)?;

    Ok(Json(DataResponse::new(task)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_request_uses_camel_case() {
        let req: TodoRequest =
            serde_json::from_str(r#"{"description": "Write docs", "position": 1, "cardId": 7}"#)
                .unwrap();

        assert_eq!(req.card_id, 7);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_todo_request_rejects_negative_position() {
        let req: TodoRequest =
            serde_json::from_str(r#"{"position": -2, "cardId": 7}"#).unwrap();

        assert_eq!(req.description, "");
        assert!(req.validate().is_err());
    }
}
