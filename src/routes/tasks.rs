use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdate},
    services::TaskService,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};

/// Retrieves the authenticated user's tasks.
///
/// Tasks are returned in creation (id) order.
///
/// ## Query Parameters:
/// - `completed` (optional): only tasks with this completion flag.
/// - `list_id` (optional): only tasks filed under this list.
/// - `search` (optional): case-insensitive match on title or description.
/// - `skip` (optional): number of tasks to skip. Defaults to 0.
/// - `limit` (optional): page size, capped at 100. Defaults to 100.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    service: web::Data<TaskService>,
    query: web::Query<TaskQuery>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = service.list_tasks(user_id.0, &query).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: `list_id` names a list the user does not own.
/// - `422 Unprocessable Entity`: the payload fails validation.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task = service.create_task(user_id.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task. Tasks owned by someone else are reported as `404 Not Found`.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i32>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task = service.get_task(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates the fields present in the body and leaves the rest untouched.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: `list_id` names a list the user does not own.
/// - `404 Not Found`: no such task for this user.
/// - `422 Unprocessable Entity`: the payload fails validation.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    apply_update(&service, user_id, task_id.into_inner(), task_data.into_inner()).await
}

/// Same as `PUT /{id}`.
#[patch("/{id}")]
pub async fn patch_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    apply_update(&service, user_id, task_id.into_inner(), task_data.into_inner()).await
}

async fn apply_update(
    service: &TaskService,
    user_id: AuthenticatedUserId,
    task_id: i32,
    update: TaskUpdate,
) -> Result<HttpResponse, AppError> {
    let task = service.update_task(user_id.0, task_id, update).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `404 Not Found`: no such task for this user.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    task_id: web::Path<i32>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    service.delete_task(user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
