use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::not_blank;

/// A named grouping of tasks, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TaskList {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a task list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskListInput {
    /// Must be between 1 and 100 characters and not only whitespace.
    #[validate(length(min = 1, max = 100), custom = "not_blank")]
    pub name: String,
}
