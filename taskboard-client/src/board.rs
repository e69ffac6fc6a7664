/// Typed HTTP client for the board API
///
/// One method per route. Every request carries the caller's bearer token;
/// error answers come back as [`ClientError::Api`] with the server's
/// `error` code and `message`.
///
/// # Example
///
/// ```no_run
/// use taskboard_client::BoardClient;
///
/// # async fn example() -> Result<(), taskboard_client::ClientError> {
/// let client = BoardClient::new("http://localhost:8080", "access-token");
///
/// let card = client.create_card("Backlog", 0).await?;
/// client.create_task("Write docs", 0, card.id).await?;
///
/// for card in client.list_cards().await? {
///     println!("{}: {} tasks", card.name, card.tasks.len());
/// }
/// # Ok(())
/// # }
/// ```
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use taskboard_shared::board::reconcile::{IncomingTask, ReconcileOutcome};
use taskboard_shared::models::card::{Card, CardWithTasks};
use taskboard_shared::models::task::Task;
use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    name: &'a str,
    position: i32,
}

#[derive(Debug, Serialize)]
struct CardUpdateBody<'a> {
    name: &'a str,
    position: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    tasks: Option<&'a [IncomingTask]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TodoBody<'a> {
    description: &'a str,
    position: i32,
    card_id: i64,
}

/// Answer to a card update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardUpdateResponse {
    pub message: String,

    #[serde(default)]
    pub updated: Option<Vec<i64>>,

    #[serde(default)]
    pub created: Option<Vec<i64>>,

    #[serde(default)]
    pub unchanged: Option<usize>,
}

impl CardUpdateResponse {
    /// Reconciliation counts, present when the update carried tasks
    pub fn outcome(&self) -> Option<ReconcileOutcome> {
        Some(ReconcileOutcome {
            updated: self.updated.clone()?,
            created: self.created.clone()?,
            unchanged: self.unchanged?,
        })
    }
}

/// Board API client
#[derive(Clone)]
pub struct BoardClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BoardClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, token)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ClientError> {
        let response = request.bearer_auth(&self.token).send().await?;

        if !response.status().is_success() {
            let err = ClientError::from_response(response).await;
            debug!(error = %err, "Board API request failed");
            return Err(err);
        }

        Ok(response.json::<T>().await?)
    }

    /// `GET /cards`
    pub async fn list_cards(&self) -> Result<Vec<CardWithTasks>, ClientError> {
        let envelope: DataEnvelope<Vec<CardWithTasks>> =
            self.send(self.client.get(self.url("/cards"))).await?;
        Ok(envelope.data)
    }

    /// `POST /cards`, owned by the caller
    pub async fn create_card(&self, name: &str, position: i32) -> Result<Card, ClientError> {
        let body = CardBody {
            user_id: None,
            name,
            position,
        };

        let envelope: DataEnvelope<Card> = self
            .send(self.client.post(self.url("/cards")).json(&body))
            .await?;
        Ok(envelope.data)
    }

    /// `PUT /cards/:id`; pass `tasks` to reconcile the card's task list
    pub async fn update_card(
        &self,
        card_id: i64,
        name: &str,
        position: i32,
        tasks: Option<&[IncomingTask]>,
    ) -> Result<CardUpdateResponse, ClientError> {
        let body = CardUpdateBody {
            name,
            position,
            tasks,
        };

        self.send(
            self.client
                .put(self.url(&format!("/cards/{}", card_id)))
                .json(&body),
        )
        .await
    }

    /// `POST /todos`
    pub async fn create_task(
        &self,
        description: &str,
        position: i32,
        card_id: i64,
    ) -> Result<Task, ClientError> {
        let body = TodoBody {
            description,
            position,
            card_id,
        };

        let envelope: DataEnvelope<Task> = self
            .send(self.client.post(self.url("/todos")).json(&body))
            .await?;
        Ok(envelope.data)
    }

    /// `PUT /todos/:todo`
    pub async fn update_task(
        &self,
        task_id: i64,
        description: &str,
        position: i32,
        card_id: i64,
    ) -> Result<Task, ClientError> {
        let body = TodoBody {
            description,
            position,
            card_id,
        };

        let envelope: DataEnvelope<Task> = self
            .send(
                self.client
                    .put(self.url(&format!("/todos/{}", task_id)))
                    .json(&body),
            )
            .await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_bodies_use_api_field_names() {
        let body = serde_json::to_value(TodoBody {
            description: "Write docs",
            position: 1,
            card_id: 3,
        })
        .unwrap();
        assert_eq!(body, json!({ "description": "Write docs", "position": 1, "cardId": 3 }));

        let body = serde_json::to_value(CardBody {
            user_id: None,
            name: "Backlog",
            position: 0,
        })
        .unwrap();
        assert_eq!(body, json!({ "name": "Backlog", "position": 0 }));

        let body = serde_json::to_value(CardUpdateBody {
            name: "Doing",
            position: 2,
            tasks: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "name": "Doing", "position": 2 }));
    }

    #[test]
    fn test_card_update_outcome() {
        let plain: CardUpdateResponse =
            serde_json::from_value(json!({ "message": "Card updated successfully" })).unwrap();
        assert!(plain.outcome().is_none());

        let reconciled: CardUpdateResponse = serde_json::from_value(json!({
            "message": "Card and tasks updated successfully",
            "updated": [2],
            "created": [7],
            "unchanged": 1
        }))
        .unwrap();
        assert_eq!(
            reconciled.outcome(),
            Some(ReconcileOutcome {
                updated: vec![2],
                created: vec![7],
                unchanged: 1,
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = BoardClient::new("http://localhost:8080/", "token");
        assert_eq!(client.url("/cards"), "http://localhost:8080/cards");
    }
}
