/// Ownership checks
///
/// The identity provider authenticates callers; these helpers make sure the
/// card or task a request touches belongs to the caller before any write.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::require_card_owner;
/// use taskboard_shared::auth::middleware::AuthContext;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let auth = AuthContext::new(1);
/// let card = require_card_owner(&pool, &auth, 10).await?;
/// # Ok(())
/// # }
/// ```
use sqlx::PgExecutor;

use super::middleware::AuthContext;
use crate::models::card::Card;
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Card {0} not found")]
    CardNotFound(i64),

    #[error("Task {0} not found")]
    TaskNotFound(i64),

    /// Caller doesn't own the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that `owner_id` is the caller
pub fn require_ownership(auth: &AuthContext, owner_id: i64) -> Result<(), AuthzError> {
    if auth.user_id != owner_id {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

fn owned_card(auth: &AuthContext, card_id: i64, card: Option<Card>) -> Result<Card, AuthzError> {
    let card = card.ok_or(AuthzError::CardNotFound(card_id))?;
    require_ownership(auth, card.user_id)?;
    Ok(card)
}

/// Loads a card and checks the caller owns it
pub async fn require_card_owner<'e, E>(
    executor: E,
    auth: &AuthContext,
    card_id: i64,
) -> Result<Card, AuthzError>
where
    E: PgExecutor<'e>,
{
    let card = Card::find_by_id(executor, card_id).await?;
    owned_card(auth, card_id, card)
}

/// Like [`require_card_owner`], but locks the card row for the enclosing transaction
pub async fn require_card_owner_locked<'e, E>(
    executor: E,
    auth: &AuthContext,
    card_id: i64,
) -> Result<Card, AuthzError>
where
    E: PgExecutor<'e>,
{
    let card = Card::lock_by_id(executor, card_id).await?;
    owned_card(auth, card_id, card)
}

/// Checks the caller owns the card a task currently belongs to
pub async fn require_task_owner<'e, E>(
    executor: E,
    auth: &AuthContext,
    task_id: i64,
) -> Result<(), AuthzError>
where
    E: PgExecutor<'e>,
{
    let owner = Task::owner_of(executor, task_id)
        .await?
        .ok_or(AuthzError::TaskNotFound(task_id))?;

    require_ownership(auth, owner)
}

/// Checks the caller owns every card in `card_ids`
pub async fn require_cards_owned<'e, E>(
    executor: E,
    auth: &AuthContext,
    card_ids: &[i64],
) -> Result<(), AuthzError>
where
    E: PgExecutor<'e>,
{
    if card_ids.is_empty() {
        return Ok(());
    }

    let owners = Card::owners(executor, card_ids).await?;

    if let Some(missing) = card_ids
        .iter()
        .find(|id| !owners.iter().any(|(card_id, _)| card_id == *id))
    {
        return Err(AuthzError::CardNotFound(*missing));
    }

    owners
        .iter()
        .try_for_each(|(_, owner)| require_ownership(auth, *owner))
}
