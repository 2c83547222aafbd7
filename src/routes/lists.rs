use crate::{
    auth::AuthenticatedUserId, error::AppError, models::TaskListInput, services::TaskService,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};

/// Lists the authenticated user's task lists in creation order.
#[get("")]
pub async fn get_lists(
    service: web::Data<TaskService>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let lists = service.list_lists(user_id.0).await?;
    Ok(HttpResponse::Ok().json(lists))
}

/// Creates a task list.
///
/// ## Responses:
/// - `201 Created`: the new `TaskList`.
/// - `400 Bad Request`: the user already has a list with this name.
/// - `422 Unprocessable Entity`: the name is empty or too long.
#[post("")]
pub async fn create_list(
    service: web::Data<TaskService>,
    list_data: web::Json<TaskListInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let list = service.create_list(user_id.0, list_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(list))
}

/// Deletes a task list. Its tasks survive with `list_id` cleared.
#[delete("/{id}")]
pub async fn delete_list(
    service: web::Data<TaskService>,
    list_id: web::Path<i32>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    service.delete_list(user_id.0, list_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
