/// Task reconciliation planning
///
/// A card update may carry the full task list of the card as the client sees
/// it, typically after a drag-and-drop reorder. Only tasks whose observable
/// state differs from the stored row are written:
///
/// - no stored row with that ID (or no ID at all): created
/// - status, position or owning card differs: updated
/// - otherwise: left untouched
///
/// Planning is pure; [`crate::board::update_card`] executes the plan inside a
/// transaction.
///
/// # Example
///
/// ```
/// use taskboard_shared::board::reconcile::{plan, IncomingTask, StoredTaskState};
///
/// let stored = vec![
///     StoredTaskState { id: 1, status: "todo".into(), position: 0, card_id: 7 },
///     StoredTaskState { id: 2, status: "done".into(), position: 1, card_id: 7 },
/// ];
/// let incoming = vec![
///     IncomingTask { id: Some(1), status: "todo".into(), position: 0, description: None },
///     IncomingTask { id: Some(2), status: "in-progress".into(), position: 1, description: None },
/// ];
///
/// let plan = plan(&stored, &incoming, 7);
/// assert_eq!(plan.updates.len(), 1);
/// assert_eq!(plan.updates[0].id, Some(2));
/// assert_eq!(plan.unchanged, 1);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A task as submitted with a card update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingTask {
    /// Stored task ID; absent for tasks the client has not saved yet
    #[serde(default)]
    pub id: Option<i64>,

    pub status: String,

    pub position: i32,

    /// Only used when the task has to be created
    #[serde(default)]
    pub description: Option<String>,
}

/// The stored fields reconciliation compares against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct StoredTaskState {
    pub id: i64,
    pub status: String,
    pub position: i32,
    pub card_id: i64,
}

/// Writes needed to bring storage in line with a submitted task list
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan<'a> {
    /// Existing tasks whose status, position or card changed
    pub updates: Vec<&'a IncomingTask>,

    /// Tasks with no stored counterpart
    pub creates: Vec<&'a IncomingTask>,

    /// Tasks that need no write
    pub unchanged: usize,
}

impl ReconcilePlan<'_> {
    /// True when nothing has to be written
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty()
    }
}

/// Result of an executed reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// IDs of rewritten tasks
    pub updated: Vec<i64>,

    /// IDs assigned to created tasks
    pub created: Vec<i64>,

    /// Number of submitted tasks left untouched
    pub unchanged: usize,
}

/// Compares submitted tasks against their stored rows by ID
///
/// `card_id` is the card being updated; every submitted task ends up in it.
pub fn plan<'a>(
    stored: &[StoredTaskState],
    incoming: &'a [IncomingTask],
    card_id: i64,
) -> ReconcilePlan<'a> {
    let by_id: HashMap<i64, &StoredTaskState> = stored.iter().map(|s| (s.id, s)).collect();

    let mut plan = ReconcilePlan::default();

    for task in incoming {
        match task.id.and_then(|id| by_id.get(&id)) {
            None => plan.creates.push(task),
            Some(current) if needs_write(current, task, card_id) => plan.updates.push(task),
            Some(_) => plan.unchanged += 1,
        }
    }

    plan
}

fn needs_write(current: &StoredTaskState, task: &IncomingTask, card_id: i64) -> bool {
    current.status != task.status || current.position != task.position || current.card_id != card_id
}
