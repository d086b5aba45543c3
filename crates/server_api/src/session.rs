use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::domain::UserId;

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

pub fn mint_session_token(
    cfg: &SessionConfig,
    user_id: UserId,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::seconds(cfg.ttl_seconds);
    let claims = Claims {
        sub: format!("user:{}", user_id.0),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
}

/// Returns the user a token was minted for, or `None` when the token is
/// malformed, expired, signed with another secret, or names no user.
pub fn decode_session(cfg: &SessionConfig, token: &str) -> Option<UserId> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    data.claims
        .sub
        .strip_prefix("user:")?
        .parse::<i64>()
        .ok()
        .map(UserId)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
