/// Board operations
///
/// Every operation takes the caller's [`AuthContext`] and checks ownership
/// before touching a row. Each operation acquires what it needs from the pool
/// (a connection or a transaction) and releases it when it returns.
///
/// # Operations
///
/// - [`list_cards`]: the caller's cards with nested tasks
/// - [`create_card`], [`create_task`]: inserts
/// - [`update_task`]: overwrite of description, position and card
/// - [`update_card`]: overwrite of name and position, with optional
///   reconciliation of the card's task list in one transaction
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::board::{self, NewCard};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthContext::new(1);
/// let card = board::create_card(&pool, &auth, NewCard {
///     user_id: None,
///     name: "Backlog".to_string(),
///     position: 0,
/// }).await?;
///
/// let cards = board::list_cards(&pool, &auth).await?;
/// # Ok(())
/// # }
/// ```
pub mod reconcile;

use serde::{Deserialize, Serialize};

use reconcile::{IncomingTask, ReconcileOutcome};

#[cfg(feature = "server")]
mod ops;

#[cfg(feature = "server")]
pub use ops::{create_card, create_task, list_cards, update_card, update_task};

/// Input for [`create_card`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    /// Owner; defaults to the caller and must match it when given
    pub user_id: Option<i64>,
    pub name: String,
    pub position: i32,
}

/// Input for [`create_task`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub description: String,
    pub position: i32,
    pub card_id: i64,
}

/// Input for [`update_card`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardChanges {
    pub name: String,
    pub position: i32,

    /// Full task list of the card, when the client sends one
    pub tasks: Option<Vec<IncomingTask>>,
}

/// What [`update_card`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardUpdate {
    /// Only name and position were written
    CardOnly,

    /// The task list was reconciled as well
    WithTasks(ReconcileOutcome),
}
