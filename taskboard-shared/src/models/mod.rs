/// Database models for Taskboard
///
/// # Models
///
/// - `card`: Board cards and the aggregated board listing
/// - `task`: Tasks belonging to cards
///
/// Query functions take any `PgExecutor`, so they run against the pool, a
/// pooled connection or an open transaction alike.

pub mod card;
pub mod task;
