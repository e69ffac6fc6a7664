/// Card model and database operations
///
/// A card is a named, positionable column of the board that groups tasks and
/// belongs to one user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cards (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     position INTEGER NOT NULL DEFAULT 0,
///     user_id BIGINT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::card::{Card, CreateCard};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let card = Card::create(&pool, CreateCard {
///     user_id: 1,
///     name: "Backlog".to_string(),
///     position: 0,
/// }).await?;
///
/// let board = Card::list_with_tasks(&pool, 1).await?;
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "server")]
use sqlx::{types::Json, PgExecutor};

/// Card row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Card {
    pub id: i64,

    pub name: String,

    /// Ordering key among the owner's cards
    pub position: i32,

    /// Owning user
    pub user_id: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Task as nested in a board listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: i64,
    pub status: String,
    pub description: String,
    pub position: i32,
}

/// Card with its tasks ordered by position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardWithTasks {
    pub id: i64,
    pub name: String,
    pub position: i32,
    pub tasks: Vec<TaskSummary>,
}

#[cfg(feature = "server")]
#[derive(sqlx::FromRow)]
struct CardWithTasksRow {
    id: i64,
    name: String,
    position: i32,
    tasks: Json<Vec<TaskSummary>>,
}

#[cfg(feature = "server")]
impl From<CardWithTasksRow> for CardWithTasks {
    fn from(row: CardWithTasksRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            position: row.position,
            tasks: row.tasks.0,
        }
    }
}

/// Input for creating a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCard {
    pub user_id: i64,
    pub name: String,
    pub position: i32,
}

/// Input for overwriting a card's name and position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCard {
    pub name: String,
    pub position: i32,
}

#[cfg(feature = "server")]
impl Card {
    /// Inserts a card
    pub async fn create<'e, E>(executor: E, data: CreateCard) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (user_id, name, position)
            VALUES ($1, $2, $3)
            RETURNING id, name, position, user_id, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.position)
        .fetch_one(executor)
        .await
    }

    /// Finds a card by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Card>(
            r#"
            SELECT id, name, position, user_id, created_at, updated_at
            FROM cards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a card by ID and locks its row until the transaction ends
    ///
    /// Concurrent updates of the same card serialize on this lock. The lock
    /// leaves the key alone, so foreign key checks of tasks moving into the
    /// card (`FOR KEY SHARE`) are not blocked by it.
    pub async fn lock_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Card>(
            r#"
            SELECT id, name, position, user_id, created_at, updated_at
            FROM cards
            WHERE id = $1
            FOR NO KEY UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a user's cards with their tasks in a single aggregating read
    ///
    /// Cards are ordered by position, tasks by position within their card.
    /// A card without tasks has an empty `tasks` list.
    pub async fn list_with_tasks<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<Vec<CardWithTasks>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, CardWithTasksRow>(
            r#"
            SELECT cards.id, cards.name, cards.position,
                   COALESCE(
                       json_agg(
                           json_build_object(
                               'id', tasks.id,
                               'status', tasks.status,
                               'description', tasks.description,
                               'position', tasks.position
                           ) ORDER BY tasks.position, tasks.id
                       ) FILTER (WHERE tasks.id IS NOT NULL),
                       '[]'::json
                   ) AS tasks
            FROM cards
            LEFT JOIN tasks ON tasks.card_id = cards.id
            WHERE cards.user_id = $1
            GROUP BY cards.id, cards.name, cards.position
            ORDER BY cards.position, cards.id
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(CardWithTasks::from).collect())
    }

    /// Overwrites a card's name and position
    ///
    /// Returns `None` if the card doesn't exist.
    pub async fn update_meta<'e, E>(
        executor: E,
        id: i64,
        data: UpdateCard,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET name = $2,
                position = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, position, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.position)
        .fetch_optional(executor)
        .await
    }

    /// Returns `(card_id, user_id)` for every existing card in `ids`
    pub async fn owners<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<(i64, i64)>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, (i64, i64)>("SELECT id, user_id FROM cards WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }
}
