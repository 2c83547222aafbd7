use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::password::{hash_password, verify_password};
use super::token::TokenKeys;
use super::{LoginRequest, RegisterRequest, TokenResponse, TOKEN_TYPE};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::{NewUser, UserResponse};
use crate::store::CredentialStore;

/// Registers users, checks credentials, and issues and verifies tokens.
///
/// Holds the credential store and the signing keys. Token verification does
/// not touch the store; only `current_user` resolves an id to a live record.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    keys: TokenKeys,
    bcrypt_cost: u32,
    /// Checked against when a login names no usable account, so that path
    /// does the same bcrypt work as a wrong password.
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        let dummy_hash = hash_password(&Uuid::new_v4().to_string(), config.bcrypt_cost)
            .unwrap_or_else(|e| {
                log::error!("could not prepare login timing hash: {}", e);
                String::new()
            });
        Self {
            store,
            keys: TokenKeys::new(&config.jwt_secret, config.token_ttl),
            bcrypt_cost: config.bcrypt_cost,
            dummy_hash,
        }
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    /// Creates an account and returns its public view.
    ///
    /// Fails with `AppError::DuplicateIdentity` if the username or the email is
    /// already registered.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        request.validate()?;
        let RegisterRequest {
            username,
            email,
            password,
        } = request;

        if self.store.identity_taken(&username, &email).await? {
            warn!("registration rejected: username or email already in use");
            return Err(AppError::DuplicateIdentity);
        }

        let password_hash = hash_password(&password, self.bcrypt_cost)?;
        drop(password);

        let user = self
            .store
            .insert_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;
        info!("registered user {} ({})", user.id, user.username);
        Ok(user.into())
    }

    /// Checks a username/password pair and issues a token.
    ///
    /// Unknown usernames, inactive accounts and wrong passwords all fail with
    /// the same `AppError::InvalidCredentials`.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AppError> {
        request.validate()?;

        let user = match self.store.find_user_by_username(&request.username).await? {
            Some(user) if user.is_active => user,
            _ => {
                let _ = verify_password(&request.password, &self.dummy_hash);
                warn!("failed login for username {:?}", request.username);
                return Err(AppError::InvalidCredentials);
            }
        };

        match verify_password(&request.password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!("failed login for username {:?}", request.username);
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                log::error!("stored hash for user {} is unusable: {}", user.id, e);
                return Err(AppError::InvalidCredentials);
            }
        }

        let access_token = self.keys.issue(user.id)?;
        info!("user {} logged in", user.id);
        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.keys.ttl_secs(),
        })
    }

    /// Resolves a bearer token to the user id it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<i32, AppError> {
        self.verify_token_at(token, Utc::now())
    }

    pub fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<i32, AppError> {
        self.keys.verify_at(token, now)?.user_id()
    }

    /// Looks up the account behind an authenticated id.
    ///
    /// Fails with `AppError::UserNotFound` if the user is gone or deactivated.
    pub async fn current_user(&self, user_id: i32) -> Result<UserResponse, AppError> {
        match self.store.find_user_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user.into()),
            _ => Err(AppError::UserNotFound),
        }
    }
}
