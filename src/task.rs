use serde::{Deserialize, Serialize};

/// One chore instance assigned to one person for one week.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub chore_id: String,
    pub assignee: String,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        chore_id: impl Into<String>,
        assignee: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            chore_id: chore_id.into(),
            assignee: assignee.into(),
        }
    }

    /// Base id for a task before collision suffixes are applied.
    pub fn base_id(assignee: &str, chore_id: &str, month_seed: i64, week: usize) -> String {
        format!("task-{assignee}-{chore_id}-m{month_seed}-w{week}")
    }
}
