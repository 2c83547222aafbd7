use crate::{
    auth::{AuthenticatedUserId, Authenticator, LoginRequest, RegisterRequest},
    error::AppError,
};
use actix_web::{get, post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates a new account and returns its public view. No token is issued;
/// the client logs in separately.
///
/// ## Responses:
/// - `201 Created`: the `UserResponse` of the new account.
/// - `400 Bad Request`: the username or email is already registered.
/// - `422 Unprocessable Entity`: the payload fails validation.
#[post("/register")]
pub async fn register(
    authenticator: web::Data<Authenticator>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = authenticator.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Authenticates a username/password pair and returns a bearer token.
///
/// ## Responses:
/// - `200 OK`: a `TokenResponse`.
/// - `401 Unauthorized`: unknown username, inactive account or wrong password.
#[post("/login")]
pub async fn login(
    authenticator: web::Data<Authenticator>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let token = authenticator.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// Returns the account behind the presented token.
#[get("/me")]
pub async fn me(
    authenticator: web::Data<Authenticator>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = authenticator.current_user(user_id.0).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::store::MemoryStore;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    fn authenticator() -> web::Data<Authenticator> {
        let mut config = AuthConfig::new("route-test-secret");
        config.bcrypt_cost = 4;
        web::Data::new(Authenticator::new(Arc::new(MemoryStore::new()), &config))
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let app = test::init_service(
            App::new()
                .app_data(authenticator())
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "username": "test",
                "email": "invalid-email",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "username": "test",
                "email": "test@example.com",
                "password": ""
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_rt::test]
    async fn test_login_unknown_user() {
        let app = test::init_service(App::new().app_data(authenticator()).service(login)).await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({
                "username": "nobody",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
