//! Storage seams for the credential and resource stores.
//!
//! The `Authenticator` only sees a `CredentialStore` and the `TaskService` only
//! sees a `ResourceStore`. Every `ResourceStore` method takes the owning user
//! id and must filter or assert on it; there is no unscoped accessor.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, TaskInput, TaskList, TaskQuery, User};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user. Fails with `AppError::DuplicateIdentity` if the
    /// username or email is already taken, even under concurrent inserts.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Whether a user with this username or this email exists.
    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn lists_for_user(&self, user_id: i32) -> Result<Vec<TaskList>, AppError>;

    async fn find_list(&self, user_id: i32, list_id: i32) -> Result<Option<TaskList>, AppError>;

    async fn find_list_by_name(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<Option<TaskList>, AppError>;

    /// Fails with `AppError::DuplicateName` if the user already has a list
    /// with this name.
    async fn insert_list(&self, user_id: i32, name: &str) -> Result<TaskList, AppError>;

    /// Clears `list_id` on every task filed under the list, then removes the
    /// list, as a single unit. Returns `false` if the user owns no such list.
    async fn delete_list(&self, user_id: i32, list_id: i32) -> Result<bool, AppError>;

    async fn tasks_for_user(&self, user_id: i32, query: &TaskQuery)
        -> Result<Vec<Task>, AppError>;

    async fn find_task(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError>;

    /// Fails with `AppError::InvalidReference` if the referenced list has
    /// disappeared since the caller checked it.
    async fn insert_task(&self, user_id: i32, input: TaskInput) -> Result<Task, AppError>;

    /// Applies `changes` and refreshes `updated_at`. Returns `None` if the
    /// user owns no such task.
    async fn update_task(
        &self,
        user_id: i32,
        task_id: i32,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    async fn delete_task(&self, user_id: i32, task_id: i32) -> Result<bool, AppError>;
}
