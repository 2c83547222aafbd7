#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{body::MessageBody, dev::ServiceResponse, test, web};
use serde_json::{json, Value};
use tasknest::auth::{Authenticator, TokenResponse};
use tasknest::config::AuthConfig;
use tasknest::services::TaskService;
use tasknest::store::MemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Fresh authenticator and task service sharing one in-memory store.
pub fn state() -> (web::Data<Authenticator>, web::Data<TaskService>) {
    let store = Arc::new(MemoryStore::new());
    let mut config = AuthConfig::new(TEST_SECRET);
    config.bcrypt_cost = 4;

    let authenticator = Authenticator::new(store.clone(), &config);
    let task_service = TaskService::new(store);
    (web::Data::new(authenticator), web::Data::new(task_service))
}

/// Builds the full application the way `main` does, over a fresh in-memory store.
macro_rules! test_app {
    () => {{
        let (authenticator, task_service) = common::state();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(authenticator)
                .app_data(task_service)
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(tasknest::routes::health::health)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(tasknest::auth::AuthMiddleware)
                        .configure(tasknest::routes::config),
                ),
        )
        .await
    }};
}

/// Sends a request and returns the status and JSON body, turning errors raised
/// by the auth middleware into their HTTP responses.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let body = test::read_body(resp).await;
            let json = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body).unwrap_or_else(|_| {
                    Value::String(String::from_utf8_lossy(&body).into_owned())
                })
            };
            (status, json)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status().as_u16();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
            (status, json)
        }
    }
}

/// Registers a user and logs in, returning the access token.
pub async fn register_and_login<S, B>(app: &S, username: &str, email: &str, password: &str) -> String
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 201, "registration failed: {}", body);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 200, "login failed: {}", body);

    let token: TokenResponse = serde_json::from_value(body).expect("token response");
    token.access_token
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
