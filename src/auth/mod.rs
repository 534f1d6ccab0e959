use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod ownership;

pub use ownership::{is_owner, owned_or_not_found};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Caller's user id; becomes the owner of everything they create.
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims for `user_id` expiring `expiry_hours` from now. Lifetimes that
    /// overflow a timestamp are rejected rather than wrapped.
    pub fn new(user_id: Uuid, username: impl Into<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: user_id,
            username: username.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Validate JWT token and extract claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_identity() {
        let user = Uuid::new_v4();
        let token = generate_jwt(&Claims::new(user, "alice", 1).unwrap(), "secret").unwrap();
        let claims = validate_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn wrong_secret_and_empty_secret_are_rejected() {
        let token = generate_jwt(&Claims::new(Uuid::new_v4(), "alice", 1).unwrap(), "secret").unwrap();
        assert!(matches!(validate_jwt(&token, "other"), Err(JwtError::InvalidToken(_))));
        assert!(matches!(validate_jwt(&token, ""), Err(JwtError::InvalidSecret)));
        assert!(matches!(
            generate_jwt(&Claims::new(Uuid::new_v4(), "alice", 1).unwrap(), ""),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "alice", 1).unwrap();
        claims.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&claims, "secret").unwrap();
        assert!(validate_jwt(&token, "secret").is_err());
    }

    #[test]
    fn out_of_range_lifetimes_are_rejected() {
        for hours in [u64::MAX, i64::MAX as u64, 1_000_000_000_000] {
            assert!(matches!(
                Claims::new(Uuid::new_v4(), "alice", hours),
                Err(JwtError::InvalidExpiry(h)) if h == hours
            ));
        }
        let claims = Claims::new(Uuid::new_v4(), "alice", 24 * 365).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 365 * 3600);
    }
}
