//! Client tests against a local stand-in server

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard_client::{
    BoardClient, ClientError, HttpIdentityProvider, IdentityProvider, SessionDisplay,
};
use taskboard_shared::board::reconcile::IncomingTask;
use tokio::net::TcpListener;

const TOKEN: &str = "test-access-token";

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn userinfo(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_token", "error_description": "Access token is invalid" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({ "sub": "42", "email": "ada@example.com", "username": "ada" })),
    )
}

fn board_stub() -> Router {
    Router::new()
        .route(
            "/cards",
            get(|| async {
                Json(json!({
                    "data": [{
                        "id": 1,
                        "name": "Backlog",
                        "position": 0,
                        "tasks": [{ "id": 4, "status": "todo", "description": "Write docs", "position": 0 }]
                    }]
                }))
            }),
        )
        .route(
            "/cards/:id",
            put(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                if id != 1 {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "error": "not_found", "message": format!("Card {} not found", id) })),
                    );
                }
                let reply = match body.get("tasks") {
                    Some(_) => json!({
                        "message": "Card and tasks updated successfully",
                        "updated": [4],
                        "created": [],
                        "unchanged": 0
                    }),
                    None => json!({ "message": "Card updated successfully" }),
                };
                (StatusCode::OK, Json(reply))
            }),
        )
        .route(
            "/todos",
            axum::routing::post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if !authorized(&headers) {
                    return (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "error": "unauthorized", "message": "Missing authorization header" })),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "data": {
                            "id": 9,
                            "description": body["description"],
                            "status": "todo",
                            "position": body["position"],
                            "card_id": body["cardId"],
                            "created_at": "2025-01-01T00:00:00Z",
                            "updated_at": "2025-01-01T00:00:00Z"
                        }
                    })),
                )
            }),
        )
}

#[tokio::test]
async fn test_http_provider_reads_userinfo() {
    let base = serve(Router::new().route("/userinfo", get(userinfo))).await;
    let provider = HttpIdentityProvider::new(format!("{}/userinfo", base), TOKEN);

    let session = provider.current_session().await.unwrap();

    assert_eq!(session.sub, "42");
    assert_eq!(session.user_id(), Some(42));
    assert_eq!(session.email.as_deref(), Some("ada@example.com"));
    assert_eq!(session.preferred_username.as_deref(), Some("ada"));
}

#[tokio::test]
async fn test_http_provider_after_sign_out() {
    let base = serve(Router::new().route("/userinfo", get(userinfo))).await;
    let provider = HttpIdentityProvider::new(format!("{}/userinfo", base), TOKEN);

    provider.sign_out().await.unwrap();

    assert!(provider.access_token().await.is_none());
    assert!(matches!(
        provider.current_session().await,
        Err(ClientError::SignedOut)
    ));
}

#[tokio::test]
async fn test_display_shows_subject_from_provider() {
    let base = serve(Router::new().route("/userinfo", get(userinfo))).await;
    let provider = Arc::new(HttpIdentityProvider::new(format!("{}/userinfo", base), TOKEN));
    let display = SessionDisplay::new(provider.clone());

    display.mount().await.unwrap();
    assert_eq!(display.text(), "42");

    display.sign_out().await.unwrap();
    assert_eq!(display.text(), "");
    assert!(provider.access_token().await.is_none());
}

#[tokio::test]
async fn test_display_stays_blank_on_rejected_token() {
    let base = serve(Router::new().route("/userinfo", get(userinfo))).await;
    let provider = HttpIdentityProvider::new(format!("{}/userinfo", base), "stale-token");

    let err = provider.current_session().await.unwrap_err();
    assert!(err.is_unauthorized());
    match err {
        ClientError::Api { error, message, .. } => {
            assert_eq!(error, "invalid_token");
            assert_eq!(message, "Access token is invalid");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let display = SessionDisplay::new(Arc::new(provider));
    display.mount().await.unwrap();
    assert_eq!(display.text(), "");
}

#[tokio::test]
async fn test_display_stays_blank_when_provider_unreachable() {
    // Nothing listens on the discard port
    let provider = HttpIdentityProvider::new("http://127.0.0.1:9/userinfo", TOKEN);
    let display = SessionDisplay::new(Arc::new(provider));

    display.mount().await.unwrap();

    assert_eq!(display.text(), "");
}

#[tokio::test]
async fn test_board_client_routes() {
    let base = serve(board_stub()).await;
    let client = BoardClient::new(base, TOKEN);

    let cards = client.list_cards().await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].tasks[0].description, "Write docs");

    let task = client.create_task("Review", 1, 1).await.unwrap();
    assert_eq!(task.id, 9);
    assert_eq!(task.card_id, 1);
    assert_eq!(task.description, "Review");

    let update = client.update_card(1, "Backlog", 0, None).await.unwrap();
    assert_eq!(update.message, "Card updated successfully");
    assert!(update.outcome().is_none());

    let tasks = [IncomingTask {
        id: Some(4),
        status: "done".to_string(),
        position: 0,
        description: None,
    }];
    let update = client.update_card(1, "Backlog", 0, Some(&tasks)).await.unwrap();
    assert_eq!(update.outcome().unwrap().updated, vec![4]);
}

#[tokio::test]
async fn test_board_client_surfaces_api_errors() {
    let base = serve(board_stub()).await;

    let err = BoardClient::new(base.clone(), TOKEN)
        .update_card(2, "Ghost", 0, None)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, error, message } => {
            assert_eq!(status, 404);
            assert_eq!(error, "not_found");
            assert_eq!(message, "Card 2 not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = BoardClient::new(base, "wrong-token")
        .create_task("Nope", 0, 1)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}
