use std::sync::Arc;

use log::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskChanges, TaskInput, TaskList, TaskListInput, TaskQuery, TaskUpdate};
use crate::store::ResourceStore;

/// Ownership-scoped operations over tasks and task lists.
///
/// Every method takes the authenticated user's id and never reads or writes
/// another user's rows. Validation and reference checks run before any write.
pub struct TaskService {
    store: Arc<dyn ResourceStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    pub async fn list_lists(&self, user_id: i32) -> Result<Vec<TaskList>, AppError> {
        self.store.lists_for_user(user_id).await
    }

    pub async fn create_list(
        &self,
        user_id: i32,
        input: TaskListInput,
    ) -> Result<TaskList, AppError> {
        input.validate()?;

        if self
            .store
            .find_list_by_name(user_id, &input.name)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateName("List name already exists".into()));
        }

        let list = self.store.insert_list(user_id, &input.name).await?;
        info!("user {} created list {}", user_id, list.id);
        Ok(list)
    }

    /// Deletes a list. Tasks filed under it are kept with their list cleared.
    pub async fn delete_list(&self, user_id: i32, list_id: i32) -> Result<(), AppError> {
        if !self.store.delete_list(user_id, list_id).await? {
            return Err(AppError::NotFound("List not found".into()));
        }
        info!("user {} deleted list {}", user_id, list_id);
        Ok(())
    }

    pub async fn list_tasks(&self, user_id: i32, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        self.store.tasks_for_user(user_id, query).await
    }

    pub async fn get_task(&self, user_id: i32, task_id: i32) -> Result<Task, AppError> {
        self.store
            .find_task(user_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    pub async fn create_task(&self, user_id: i32, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        if let Some(list_id) = input.list_reference() {
            self.ensure_list_owned(user_id, list_id).await?;
        }

        let task = self.store.insert_task(user_id, input).await?;
        info!("user {} created task {}", user_id, task.id);
        Ok(task)
    }

    /// Applies a partial update. Absent fields are left untouched; `updated_at`
    /// is always refreshed.
    pub async fn update_task(
        &self,
        user_id: i32,
        task_id: i32,
        update: TaskUpdate,
    ) -> Result<Task, AppError> {
        update.validate()?;
        // Ownership first: a foreign task is "not found" whatever the payload.
        self.get_task(user_id, task_id).await?;

        let changes = TaskChanges::from(update);
        if let Some(Some(list_id)) = changes.list_id {
            self.ensure_list_owned(user_id, list_id).await?;
        }

        let task = self
            .store
            .update_task(user_id, task_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
        info!("user {} updated task {}", user_id, task.id);
        Ok(task)
    }

    pub async fn delete_task(&self, user_id: i32, task_id: i32) -> Result<(), AppError> {
        if !self.store.delete_task(user_id, task_id).await? {
            return Err(AppError::NotFound("Task not found".into()));
        }
        info!("user {} deleted task {}", user_id, task_id);
        Ok(())
    }

    async fn ensure_list_owned(&self, user_id: i32, list_id: i32) -> Result<(), AppError> {
        match self.store.find_list(user_id, list_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::InvalidReference("Invalid list ID".into())),
        }
    }
}
