/// Task model and database operations
///
/// A task is a positionable unit of work that belongs to exactly one card.
/// `status` is free text (`todo`, `in-progress`, `done`, ...) and is not
/// checked against a fixed set.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     description TEXT NOT NULL DEFAULT '',
///     status VARCHAR(50) NOT NULL DEFAULT 'todo',
///     position INTEGER NOT NULL DEFAULT 0,
///     card_id BIGINT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "server")]
use sqlx::PgExecutor;

#[cfg(feature = "server")]
use crate::board::reconcile::StoredTaskState;

/// Status given to tasks created without one
pub const DEFAULT_STATUS: &str = "todo";

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Task {
    pub id: i64,

    pub description: String,

    pub status: String,

    /// Ordering key within the owning card
    pub position: i32,

    /// Owning card
    pub card_id: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub description: String,

    /// Defaults to [`DEFAULT_STATUS`]
    pub status: Option<String>,

    pub position: i32,

    pub card_id: i64,
}

/// Input for overwriting a task's description, position and card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub description: String,
    pub position: i32,
    pub card_id: i64,
}

#[cfg(feature = "server")]
impl Task {
    /// Inserts a task
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (description, status, position, card_id)
            VALUES ($1, COALESCE($2, $5), $3, $4)
            RETURNING id, description, status, position, card_id, created_at, updated_at
            "#,
        )
        .bind(data.description)
        .bind(data.status)
        .bind(data.position)
        .bind(data.card_id)
        .bind(DEFAULT_STATUS)
        .fetch_one(executor)
        .await
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, description, status, position, card_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a card's tasks ordered by position
    pub async fn list_by_card<'e, E>(executor: E, card_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, description, status, position, card_id, created_at, updated_at
            FROM tasks
            WHERE card_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(card_id)
        .fetch_all(executor)
        .await
    }

    /// Returns the owning user of a task's card
    pub async fn owner_of<'e, E>(executor: E, id: i64) -> Result<Option<i64>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT cards.user_id
            FROM tasks
            JOIN cards ON cards.id = tasks.card_id
            WHERE tasks.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Overwrites description, position and owning card
    ///
    /// Returns `None` if the task doesn't exist.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET description = $2,
                position = $3,
                card_id = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, description, status, position, card_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.description)
        .bind(data.position)
        .bind(data.card_id)
        .fetch_optional(executor)
        .await
    }

    /// Reads the reconcilable state of the given tasks and locks their rows
    ///
    /// Must run inside a transaction; unknown IDs are simply absent from the result.
    pub async fn lock_states<'e, E>(
        executor: E,
        ids: &[i64],
    ) -> Result<Vec<StoredTaskState>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, StoredTaskState>(
            r#"
            SELECT id, status, position, card_id
            FROM tasks
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await
    }

    /// Writes status, position and owning card of one task
    ///
    /// Returns whether a row was updated.
    pub async fn write_state<'e, E>(
        executor: E,
        id: i64,
        status: &str,
        position: i32,
        card_id: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $2,
                position = $3,
                card_id = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(position)
        .bind(card_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
