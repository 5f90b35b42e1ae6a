//! Logged-in session built from a service token

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Claims carried by every token the auth service issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token plus its decoded claims, passed explicitly to every API call
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    claims: Claims,
}

impl Session {
    /// Decode the claims without checking the signature.
    ///
    /// Only the services hold the secret; they verify every request.
    pub fn from_token(token: impl Into<String>) -> ClientResult<Self> {
        let token = token.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(&[]), &validation)?.claims;
        Ok(Self { token, claims })
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn user_id(&self) -> Uuid {
        self.claims.sub
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.claims.exp <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// The token to send, or `SessionExpired` once it has lapsed
    pub fn bearer(&self) -> ClientResult<&str> {
        if self.is_expired() {
            return Err(ClientError::SessionExpired);
        }
        Ok(&self.token)
    }
}
