/// Error type for board operations
///
/// Every board operation returns `Result<T, BoardError>`. The API layer maps
/// authorization failures to 403/404 and flattens everything else to a
/// generic 500 with a fixed message.
use crate::auth::authorization::AuthzError;

/// Board operation error
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Caller may not touch the card or task, or it does not exist
    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// Statement or transaction failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BoardError {
    /// True when the failure came from the database rather than an access check
    pub fn is_database(&self) -> bool {
        matches!(
            self,
            BoardError::Database(_) | BoardError::Authz(AuthzError::DatabaseError(_))
        )
    }
}
