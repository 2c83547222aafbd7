use crate::error::AppError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id, as a decimal string.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch). The token is invalid from this instant on.
    pub exp: i64,
    /// Unique token id. Only used to correlate log lines.
    pub jti: String,
}

impl Claims {
    /// Parses the subject back into a user id.
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse::<i32>()
            .map_err(|_| AppError::InvalidToken("subject is not a user id".into()))
    }
}

/// Signing and verification keys plus the validity window for issued tokens.
///
/// Built once from `AuthConfig` at startup. Verification is a pure function of
/// the token, the secret and the supplied clock reading.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Validity window of issued tokens, in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token for `user_id` as if the current time were `now`.
    pub fn issue_at(&self, user_id: i32, now: DateTime<Utc>) -> Result<String, AppError> {
        let issued_at = now.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at.checked_add(self.ttl_secs).ok_or_else(|| {
                AppError::InternalServerError("Token lifetime overflows the clock".into())
            })?,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;
        log::debug!("issued token {} for user {} (exp {})", claims.jti, user_id, claims.exp);
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies signature and structure, then checks expiry against `now`.
    ///
    /// Returns `AppError::InvalidToken` for anything structurally wrong or
    /// wrongly signed and `AppError::TokenExpired` when `now >= exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the caller's clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        if now.timestamp() >= claims.exp {
            return Err(AppError::TokenExpired);
        }
        Ok(claims)
    }
}
