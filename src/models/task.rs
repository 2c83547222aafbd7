use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{validate_length, Validate, ValidationError, ValidationErrors};

use super::not_blank;

const TITLE_MAX: u64 = 255;
const DESCRIPTION_MAX: u64 = 1000;
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    /// The list this task belongs to. Always a list owned by `user_id`.
    pub list_id: Option<i32>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: bool,

    pub due_date: Option<NaiveDate>,

    /// Optional list to file the task under. Zero or negative means no list.
    pub list_id: Option<i32>,
}

impl TaskInput {
    /// The list reference to validate and store, with non-positive ids
    /// treated as "no list".
    pub fn list_reference(&self) -> Option<i32> {
        self.list_id.filter(|id| *id > 0)
    }
}

/// Partial update of a task.
///
/// Only fields present in the request body are applied. For the nullable
/// fields an explicit `null` clears the value, which is why they are
/// `Option<Option<_>>`: the outer `None` means "not supplied".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "explicit",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    #[serde(
        default,
        deserialize_with = "explicit",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,

    /// `null`, `0` or any non-positive id clears the list association.
    #[serde(
        default,
        deserialize_with = "explicit",
        skip_serializing_if = "Option::is_none"
    )]
    pub list_id: Option<Option<i32>>,
}

/// Marks a field as present even when its value is `null`.
fn explicit<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Validate for TaskUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(title) = &self.title {
            if !validate_length(title, Some(1), Some(TITLE_MAX), None) {
                errors.add("title", ValidationError::new("length"));
            } else if let Err(e) = not_blank(title) {
                errors.add("title", e);
            }
        }

        if let Some(Some(description)) = &self.description {
            if !validate_length(description, None, Some(DESCRIPTION_MAX), None) {
                errors.add("description", ValidationError::new("length"));
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A validated, normalized set of changes handed to the resource store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
    /// `Some(None)` clears the association; `Some(Some(id))` always holds a positive id.
    pub list_id: Option<Option<i32>>,
}

impl From<TaskUpdate> for TaskChanges {
    fn from(update: TaskUpdate) -> Self {
        Self {
            title: update.title,
            description: update.description,
            completed: update.completed,
            due_date: update.due_date,
            list_id: update.list_id.map(|id| id.filter(|id| *id > 0)),
        }
    }
}

impl TaskChanges {
    /// Applies the supplied fields to `task` and stamps `updated_at`.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(list_id) = self.list_id {
            task.list_id = list_id;
        }
        task.updated_at = now;
    }
}

/// Represents query parameters for filtering tasks when listing them.
/// Listing is always scoped to the authenticated user first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    pub list_id: Option<i32>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl TaskQuery {
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    /// Page size, clamped to `1..=100`.
    pub fn page_size(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, DEFAULT_PAGE_SIZE)
    }

    /// The search term, if one was given and it is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether `task` passes the filters. Ownership is checked by the caller.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(list_id) = self.list_id {
            if task.list_id != Some(list_id) {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&term);
            let in_description = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}
