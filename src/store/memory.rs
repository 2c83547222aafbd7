use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CredentialStore, ResourceStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, TaskInput, TaskList, TaskQuery, User};

/// Non-persistent store used when no `DATABASE_URL` is configured, and by the tests.
///
/// All state sits behind one lock, so each write (including the
/// detach-then-delete of a list) is observed either fully or not at all.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i32, User>,
    lists: BTreeMap<i32, TaskList>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: i32,
    last_list_id: i32,
    last_task_id: i32,
}

impl Inner {
    fn owns_list(&self, user_id: i32, list_id: i32) -> bool {
        self.lists
            .get(&list_id)
            .map(|list| list.user_id == user_id)
            .unwrap_or(false)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        let taken = inner
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(AppError::DuplicateIdentity);
        }

        inner.last_user_id += 1;
        let record = User {
            id: inner.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            created_at: Utc::now(),
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn lists_for_user(&self, user_id: i32) -> Result<Vec<TaskList>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_list(&self, user_id: i32, list_id: i32) -> Result<Option<TaskList>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .get(&list_id)
            .filter(|l| l.user_id == user_id)
            .cloned())
    }

    async fn find_list_by_name(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<Option<TaskList>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .lists
            .values()
            .find(|l| l.user_id == user_id && l.name == name)
            .cloned())
    }

    async fn insert_list(&self, user_id: i32, name: &str) -> Result<TaskList, AppError> {
        let mut inner = self.inner.write().await;
        if inner
            .lists
            .values()
            .any(|l| l.user_id == user_id && l.name == name)
        {
            return Err(AppError::DuplicateName("List name already exists".into()));
        }

        inner.last_list_id += 1;
        let list = TaskList {
            id: inner.last_list_id,
            name: name.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        inner.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn delete_list(&self, user_id: i32, list_id: i32) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.owns_list(user_id, list_id) {
            return Ok(false);
        }

        for task in inner.tasks.values_mut() {
            if task.user_id == user_id && task.list_id == Some(list_id) {
                task.list_id = None;
            }
        }
        inner.lists.remove(&list_id);
        Ok(true)
    }

    async fn tasks_for_user(
        &self,
        user_id: i32,
        query: &TaskQuery,
    ) -> Result<Vec<Task>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|t| t.user_id == user_id && query.matches(t))
            .skip(query.offset() as usize)
            .take(query.page_size() as usize)
            .cloned()
            .collect())
    }

    async fn find_task(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&task_id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn insert_task(&self, user_id: i32, input: TaskInput) -> Result<Task, AppError> {
        let mut inner = self.inner.write().await;
        let list_id = input.list_reference();
        if let Some(list_id) = list_id {
            if !inner.owns_list(user_id, list_id) {
                return Err(AppError::InvalidReference("Invalid list ID".into()));
            }
        }

        inner.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.last_task_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            due_date: input.due_date,
            list_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        user_id: i32,
        task_id: i32,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut inner = self.inner.write().await;
        if let Some(Some(list_id)) = changes.list_id {
            if !inner.owns_list(user_id, list_id) {
                return Err(AppError::InvalidReference("Invalid list ID".into()));
            }
        }

        match inner.tasks.get_mut(&task_id) {
            Some(task) if task.user_id == user_id => {
                changes.apply(task, Utc::now());
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_task(&self, user_id: i32, task_id: i32) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .tasks
            .get(&task_id)
            .map(|t| t.user_id == user_id)
            .unwrap_or(false);
        if owned {
            inner.tasks.remove(&task_id);
        }
        Ok(owned)
    }
}
