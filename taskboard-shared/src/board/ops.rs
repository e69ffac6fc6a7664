use sqlx::PgPool;
use tracing::{debug, info};

use super::reconcile::{self, ReconcileOutcome};
use super::{CardChanges, CardUpdate, NewCard, NewTask};
use crate::auth::authorization::{
    require_card_owner, require_card_owner_locked, require_cards_owned, require_ownership,
    require_task_owner, AuthzError,
};
use crate::auth::middleware::AuthContext;
use crate::error::BoardError;
use crate::models::card::{Card, CardWithTasks, CreateCard, UpdateCard};
use crate::models::task::{CreateTask, Task, UpdateTask};

/// Lists the caller's cards with their tasks ordered by position
pub async fn list_cards(pool: &PgPool, auth: &AuthContext) -> Result<Vec<CardWithTasks>, BoardError> {
    let cards = Card::list_with_tasks(pool, auth.user_id).await?;

    debug!(user_id = auth.user_id, cards = cards.len(), "Listed cards");
    Ok(cards)
}

/// Creates a card owned by the caller
pub async fn create_card(pool: &PgPool, auth: &AuthContext, data: NewCard) -> Result<Card, BoardError> {
    let user_id = data.user_id.unwrap_or(auth.user_id);
    require_ownership(auth, user_id)?;

    let card = Card::create(
        pool,
        CreateCard {
            user_id,
            name: data.name,
            position: data.position,
        },
    )
    .await?;

    info!(card_id = card.id, user_id, "Card created");
    Ok(card)
}

/// Creates a task in one of the caller's cards
pub async fn create_task(pool: &PgPool, auth: &AuthContext, data: NewTask) -> Result<Task, BoardError> {
    let mut conn = pool.acquire().await?;

    require_card_owner(&mut *conn, auth, data.card_id).await?;

    let task = Task::create(
        &mut *conn,
        CreateTask {
            description: data.description,
            status: None,
            position: data.position,
            card_id: data.card_id,
        },
    )
    .await?;

    info!(task_id = task.id, card_id = task.card_id, "Task created");
    Ok(task)
}

/// Overwrites a task's description, position and card
///
/// The caller must own both the task's current card and the target card.
pub async fn update_task(
    pool: &PgPool,
    auth: &AuthContext,
    task_id: i64,
    data: UpdateTask,
) -> Result<Task, BoardError> {
    let mut tx = pool.begin().await?;

    require_task_owner(&mut *tx, auth, task_id).await?;
    require_card_owner(&mut *tx, auth, data.card_id).await?;

    let task = Task::update(&mut *tx, task_id, data)
        .await?
        .ok_or(AuthzError::TaskNotFound(task_id))?;

    tx.commit().await?;

    info!(task_id, card_id = task.card_id, "Task updated");
    Ok(task)
}

/// Overwrites a card's name and position and reconciles its task list
///
/// Runs in one transaction: either the card and every planned task write
/// commit together, or nothing does.
pub async fn update_card(
    pool: &PgPool,
    auth: &AuthContext,
    card_id: i64,
    changes: CardChanges,
) -> Result<CardUpdate, BoardError> {
    let mut tx = pool.begin().await?;

    let card = require_card_owner_locked(&mut *tx, auth, card_id).await?;

    Card::update_meta(
        &mut *tx,
        card.id,
        UpdateCard {
            name: changes.name,
            position: changes.position,
        },
    )
    .await?;

    let Some(incoming) = changes.tasks else {
        tx.commit().await?;
        info!(card_id, "Card updated");
        return Ok(CardUpdate::CardOnly);
    };

    let ids: Vec<i64> = incoming.iter().filter_map(|task| task.id).collect();
    let stored = Task::lock_states(&mut *tx, &ids).await?;

    // Tasks pulled in from other cards must belong to the caller too
    let mut source_cards: Vec<i64> = stored
        .iter()
        .map(|task| task.card_id)
        .filter(|id| *id != card_id)
        .collect();
    source_cards.sort_unstable();
    source_cards.dedup();
    require_cards_owned(&mut *tx, auth, &source_cards).await?;

    let plan = reconcile::plan(&stored, &incoming, card_id);
    debug!(
        card_id,
        updates = plan.updates.len(),
        creates = plan.creates.len(),
        unchanged = plan.unchanged,
        "Planned task reconciliation"
    );

    let mut outcome = ReconcileOutcome {
        unchanged: plan.unchanged,
        ..Default::default()
    };

    for task in &plan.updates {
        let Some(id) = task.id else { continue };
        Task::write_state(&mut *tx, id, &task.status, task.position, card_id).await?;
        outcome.updated.push(id);
    }

    for task in &plan.creates {
        let created = Task::create(
            &mut *tx,
            CreateTask {
                description: task.description.clone().unwrap_or_default(),
                status: Some(task.status.clone()),
                position: task.position,
                card_id,
            },
        )
        .await?;
        outcome.created.push(created.id);
    }

    tx.commit().await?;

    info!(
        card_id,
        updated = outcome.updated.len(),
        created = outcome.created.len(),
        unchanged = outcome.unchanged,
        "Card and tasks updated"
    );
    Ok(CardUpdate::WithTasks(outcome))
}
