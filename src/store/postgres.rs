use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{CredentialStore, ResourceStore};
use crate::error::AppError;
use crate::models::{NewUser, Task, TaskChanges, TaskInput, TaskList, TaskQuery, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, created_at";
const LIST_COLUMNS: &str = "id, name, user_id, created_at";
const TASK_COLUMNS: &str =
    "id, title, description, completed, due_date, list_id, user_id, created_at, updated_at";

/// PostgreSQL-backed credential and resource store.
///
/// Uniqueness of usernames, emails and per-user list names is enforced by the
/// schema (see `migrations/`); violations are translated into domain errors
/// by constraint name.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps constraint violations raised by writes onto domain errors.
fn map_write_error(error: sqlx::Error) -> AppError {
    if let Some(db_error) = error.as_database_error() {
        match db_error.constraint() {
            Some("users_username_key") | Some("users_email_key") => {
                return AppError::DuplicateIdentity
            }
            Some("task_lists_user_id_name_key") => {
                return AppError::DuplicateName("List name already exists".into())
            }
            Some("tasks_list_id_fkey") => {
                return AppError::InvalidReference("Invalid list ID".into())
            }
            _ => {}
        }
    }
    error.into()
}

/// Escapes `%`, `_` and `\` so the term matches literally inside `ILIKE`.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AppError> {
        let existing = sqlx::query_as::<_, (i32,)>(
            "SELECT id FROM users WHERE username = $1 OR email = $2 LIMIT 1",
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(existing.is_some())
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn lists_for_user(&self, user_id: i32) -> Result<Vec<TaskList>, AppError> {
        let sql = format!(
            "SELECT {} FROM task_lists WHERE user_id = $1 ORDER BY id",
            LIST_COLUMNS
        );
        let lists = sqlx::query_as::<_, TaskList>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(lists)
    }

    async fn find_list(&self, user_id: i32, list_id: i32) -> Result<Option<TaskList>, AppError> {
        let sql = format!(
            "SELECT {} FROM task_lists WHERE id = $1 AND user_id = $2",
            LIST_COLUMNS
        );
        let list = sqlx::query_as::<_, TaskList>(&sql)
            .bind(list_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(list)
    }

    async fn find_list_by_name(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<Option<TaskList>, AppError> {
        let sql = format!(
            "SELECT {} FROM task_lists WHERE user_id = $1 AND name = $2",
            LIST_COLUMNS
        );
        let list = sqlx::query_as::<_, TaskList>(&sql)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(list)
    }

    async fn insert_list(&self, user_id: i32, name: &str) -> Result<TaskList, AppError> {
        let sql = format!(
            "INSERT INTO task_lists (name, user_id) VALUES ($1, $2) RETURNING {}",
            LIST_COLUMNS
        );
        sqlx::query_as::<_, TaskList>(&sql)
            .bind(name)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_list(&self, user_id: i32, list_id: i32) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE tasks SET list_id = NULL WHERE list_id = $1 AND user_id = $2")
            .bind(list_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM task_lists WHERE id = $1 AND user_id = $2")
            .bind(list_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn tasks_for_user(
        &self,
        user_id: i32,
        query: &TaskQuery,
    ) -> Result<Vec<Task>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder.push(TASK_COLUMNS);
        builder.push(" FROM tasks WHERE user_id = ");
        builder.push_bind(user_id);

        if let Some(completed) = query.completed {
            builder.push(" AND completed = ").push_bind(completed);
        }
        if let Some(list_id) = query.list_id {
            builder.push(" AND list_id = ").push_bind(list_id);
        }
        if let Some(term) = query.search_term() {
            let pattern = like_pattern(term);
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder.push(" ORDER BY id OFFSET ").push_bind(query.offset());
        builder.push(" LIMIT ").push_bind(query.page_size());

        let tasks = builder
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_task(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert_task(&self, user_id: i32, input: TaskInput) -> Result<Task, AppError> {
        let list_id = input.list_reference();
        let sql = format!(
            "INSERT INTO tasks (title, description, completed, due_date, list_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(input.title)
            .bind(input.description)
            .bind(input.completed)
            .bind(input.due_date)
            .bind(list_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update_task(
        &self,
        user_id: i32,
        task_id: i32,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(title) = &changes.title {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(completed) = changes.completed {
            builder.push(", completed = ").push_bind(completed);
        }
        if let Some(due_date) = changes.due_date {
            builder.push(", due_date = ").push_bind(due_date);
        }
        if let Some(list_id) = changes.list_id {
            builder.push(", list_id = ").push_bind(list_id);
        }

        builder.push(" WHERE id = ").push_bind(task_id);
        builder.push(" AND user_id = ").push_bind(user_id);
        builder.push(" RETURNING ").push(TASK_COLUMNS);

        builder
            .build_query_as::<Task>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_task(&self, user_id: i32, task_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("milk"), "%milk%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
