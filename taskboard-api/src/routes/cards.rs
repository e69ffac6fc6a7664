/// Card endpoints
///
/// All endpoints require JWT authentication and only touch the caller's cards.
///
/// # Endpoints
///
/// - `GET /cards` - List cards with their tasks
/// - `POST /cards` - Create card
/// - `PUT /cards/:id` - Update card, optionally reconciling its task list
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::{DataResponse, IdPath, Payload},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    board::{self, reconcile::IncomingTask, CardChanges, CardUpdate, NewCard},
    models::card::{Card, CardWithTasks},
};
use validator::Validate;

/// Longest accepted task status
pub const MAX_STATUS_LEN: usize = 50;

/// Create card request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    /// Owner; defaults to the caller
    pub user_id: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: i32,
}

/// Update card request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCardRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(range(min = 0, message = "Position must be non-negative"))]
    pub position: i32,

    /// Full task list of the card; omit to update only name and position
    #[serde(default)]
    pub tasks: Option<Vec<IncomingTask>>,
}

impl UpdateCardRequest {
    /// Runs field validation plus per-task checks
    fn check(&self) -> ApiResult<()> {
        self.validate()?;

        let details: Vec<ValidationErrorDetail> = self
            .tasks
            .iter()
            .flatten()
            .enumerate()
            .flat_map(|(i, task)| task_errors(i, task))
            .collect();

        if details.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(details))
        }
    }
}

fn task_errors(index: usize, task: &IncomingTask) -> Vec<ValidationErrorDetail> {
    let mut errors = Vec::new();
    let field = |name: &str| format!("tasks[{}].{}", index, name);

    if task.status.is_empty() || task.status.chars().count() > MAX_STATUS_LEN {
        errors.push(ValidationErrorDetail {
            field: field("status"),
            message: format!("Status must be 1-{} characters", MAX_STATUS_LEN),
        });
    }

    if task.position < 0 {
        errors.push(ValidationErrorDetail {
            field: field("position"),
            message: "Position must be non-negative".to_string(),
        });
    }

    errors
}

/// Update card response
///
/// Reconciliation counts are present only when the request carried tasks.
#[derive(Debug, Serialize)]
pub struct UpdateCardResponse {
    pub message: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unchanged: Option<usize>,
}

impl From<CardUpdate> for UpdateCardResponse {
    fn from(update: CardUpdate) -> Self {
        match update {
            CardUpdate::CardOnly => Self {
                message: "Card updated successfully",
                updated: None,
                created: None,
                unchanged: None,
            },
            CardUpdate::WithTasks(outcome) => Self {
                message: "Card and tasks updated successfully",
                updated: Some(outcome.updated),
                created: Some(outcome.created),
                unchanged: Some(outcome.unchanged),
            },
        }
    }
}

/// List cards
///
/// # Endpoint
///
/// ```text
/// GET /cards
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "data": [
///     {
///       "id": 1,
///       "name": "Backlog",
///       "position": 0,
///       "tasks": [{ "id": 4, "status": "todo", "description": "Write docs", "position": 0 }]
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid JWT token
/// - `500 Internal Server Error`: `Query execution failed`
pub async fn list_cards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DataResponse<Vec<CardWithTasks>>>> {
    let cards = board::list_cards(&state.db, &auth)
        .await
        .map_err(ApiError::query_failed)?;

    Ok(Json(DataResponse::new(cards)))
}

/// Create card
///
/// # Endpoint
///
/// ```text
/// POST /cards
/// Authorization: Bearer <jwt_token>
///
/// { "name": "Backlog", "position": 0 }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: `userId` names someone other than the caller
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: `Query execution failed`
pub async fn create_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Payload(req): Payload<CreateCardRequest>,
) -> ApiResult<Json<DataResponse<Card>>> {
    req.validate()?;

    let card = board::create_card(
        &state.db,
        &auth,
        NewCard {
            user_id: req.user_id,
            name: req.name,
            position: req.position,
        },
    )
    .await
    .map_err(ApiError::query_failed)?;

    Ok(Json(DataResponse::new(card)))
}

/// Update card
///
/// Overwrites name and position. When `tasks` is present, every listed task
/// is moved into this card and only tasks whose status or position changed
/// are written; tasks without a stored counterpart are created. Everything
/// happens in one transaction.
///
/// # Endpoint
///
/// ```text
/// PUT /cards/:id
/// Authorization: Bearer <jwt_token>
///
/// {
///   "name": "Doing",
///   "position": 1,
///   "tasks": [
///     { "id": 1, "status": "todo", "position": 0 },
///     { "id": 2, "status": "done", "position": 1 }
///   ]
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Card and tasks updated successfully", "updated": [2], "created": [], "unchanged": 1 }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: The card or a listed task belongs to someone else
/// - `404 Not Found`: Card not found
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: `Update failed`
pub async fn update_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(card_id): IdPath<i64>,
    Payload(req): Payload<UpdateCardRequest>,
) -> ApiResult<Json<UpdateCardResponse>> {
    req.check()?;

    let update = board::update_card(
        &state.db,
        &auth,
        card_id,
        CardChanges {
            name: req.name,
            position: req.position,
            tasks: req.tasks,
        },
    )
    .await
    .map_err(ApiError::update_failed)?;

    Ok(Json(update.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_shared::board::reconcile::ReconcileOutcome;

    fn task(status: &str, position: i32) -> IncomingTask {
        IncomingTask {
            id: Some(1),
            status: status.to_string(),
            position,
            description: None,
        }
    }

    #[test]
    fn test_create_card_request_uses_camel_case() {
        let req: CreateCardRequest =
            serde_json::from_str(r#"{"userId": 4, "name": "Backlog", "position": 0}"#).unwrap();
        assert_eq!(req.user_id, Some(4));

        let req: CreateCardRequest =
            serde_json::from_str(r#"{"name": "Backlog", "position": 0}"#).unwrap();
        assert!(req.user_id.is_none());
    }

    #[test]
    fn test_update_card_request_checks_tasks() {
        let req = UpdateCardRequest {
            name: "Doing".to_string(),
            position: 0,
            tasks: Some(vec![task("todo", 0), task("", -1), task(&"x".repeat(51), 2)]),
        };

        match req.check() {
            Err(ApiError::ValidationError(details)) => {
                let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec!["tasks[1].status", "tasks[1].position", "tasks[2].status"]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_update_card_request_without_tasks() {
        let req: UpdateCardRequest =
            serde_json::from_str(r#"{"name": "Doing", "position": 2}"#).unwrap();
        assert!(req.tasks.is_none());
        assert!(req.check().is_ok());
    }

    #[test]
    fn test_update_response_shapes() {
        let body = serde_json::to_value(UpdateCardResponse::from(CardUpdate::CardOnly)).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Card updated successfully" }));

        let outcome = ReconcileOutcome {
            updated: vec![2],
            created: vec![],
            unchanged: 1,
        };
        let body =
            serde_json::to_value(UpdateCardResponse::from(CardUpdate::WithTasks(outcome))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "message": "Card and tasks updated successfully",
                "updated": [2],
                "created": [],
                "unchanged": 1
            })
        );
    }
}
