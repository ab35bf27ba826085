use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issued tokens expire after this many hours.
const TOKEN_LIFETIME_HOURS: i64 = 24;

pub(crate) fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    /// Owning user id, as a string per JWT convention.
    pub(crate) sub: String,
    pub(crate) email: String,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

/// Signs and verifies bearer tokens (HS256). Token lifetime and signing
/// are the only concerns here; mapping a verified id back to a user row
/// happens at the API seam.
#[derive(Clone)]
pub(crate) struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub(crate) fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub(crate) fn issue(&self, user_id: i64, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .context("Failed to sign token")
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub(crate) fn verify(&self, token: &str) -> Result<i64> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .context("Invalid or expired token")?;
        data.claims
            .sub
            .parse()
            .context("Token subject is not a user id")
    }
}

#[cfg(test)]
mod tests;
