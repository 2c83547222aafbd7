pub mod auth;
pub mod health;
pub mod lists;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

/// Mounts the API routes. Expected to sit under `/api` behind `AuthMiddleware`.
///
/// Extractor failures are reported through `AppError` so they carry the same
/// `{"error": ...}` body as every other failure.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        log::debug!("unparseable path segment: {}", err);
        AppError::NotFound("Resource not found".into()).into()
    }))
    .service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::me),
    )
    .service(
        web::scope("/lists")
            .service(lists::get_lists)
            .service(lists::create_list)
            .service(lists::delete_list),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::patch_task)
            .service(tasks::delete_task),
    );
}
