pub mod task;
pub mod task_list;
pub mod user;

use validator::ValidationError;

pub use task::{Task, TaskChanges, TaskInput, TaskQuery, TaskUpdate};
pub use task_list::{TaskList, TaskListInput};
pub use user::{NewUser, User, UserResponse};

/// Rejects strings made only of whitespace. Length limits are checked separately.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
