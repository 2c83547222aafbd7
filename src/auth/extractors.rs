use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The user id resolved from the request's bearer token.
///
/// Inserted into the request extensions by `AuthMiddleware`. Handlers take it
/// as an argument and pass the id explicitly into every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            // Only reachable if a route is mounted outside `AuthMiddleware`.
            None => ready(Err(AppError::InvalidToken("Missing token".into()).into())),
        }
    }
}
