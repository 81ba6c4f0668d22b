/**
 * Session Management and JWT Tokens
 *
 * `TokenService` signs and verifies the bearer tokens used by the REST API
 * and by the `join` frame on the live channel.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::error::BackendError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    /// Display name at the time of issue
    #[serde(default)]
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Signs and verifies HS256 session tokens with a fixed secret and lifetime
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl_secs: u64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Create a JWT token for a user
    ///
    /// # Arguments
    /// * `user_id` - User ID (UUID)
    /// * `email` - User email
    /// * `name` - Display name
    pub fn create_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.create_token_at(user_id, email, name, now_secs())
    }

    pub(crate) fn create_token_at(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        issued_at: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: issued_at + self.ttl_secs,
            iat: issued_at,
        };
        encode(&Header::default(), &claims, &self.keys.encoding)
    }

    /// Verify and decode a JWT token
    ///
    /// Signature and expiry are both checked.
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Verify a token and return its subject as a user ID
    ///
    /// # Errors
    /// `BackendError::AuthError` for a bad signature, an expired token or a
    /// subject that is not a UUID.
    pub fn user_id_from_token(&self, token: &str) -> Result<Uuid, BackendError> {
        let claims = self
            .verify_token(token)
            .map_err(|e| BackendError::auth(format!("Invalid token: {}", e)))?;
        Uuid::parse_str(&claims.sub).map_err(|_| BackendError::auth("Invalid user ID in token"))
    }
}

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
