//! API Key service for generation and verification.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::db::{DbPool, api_keys as db, users};
use crate::error::{AppError, AppResult};
use crate::models::{ApiKey, AuthenticatedCaller, User};

/// API key prefix.
const KEY_PREFIX: &str = "fsk_";
/// Random bytes in a key (hex-encoded, so twice as many characters).
const KEY_RANDOM_BYTES: usize = 16;
/// Length of the key prefix stored for identification.
const KEY_PREFIX_LENGTH: usize = 8;

/// Generate a new random API key for a user.
///
/// Returns the full key (to be shown to user once) and the key data for storage.
pub fn generate_key(
    user_id: Uuid,
    name: &str,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey)> {
    let expires_at = match expires_in {
        Some(raw) => {
            let duration = parse_duration(raw).ok_or_else(|| {
                AppError::InvalidInput(format!("Invalid expiration: {}", raw))
            })?;
            Some(Utc::now() + duration)
        }
        None => None,
    };

    let random_part = hex::encode(rand::random::<[u8; KEY_RANDOM_BYTES]>());
    let full_key = format!("{}{}", KEY_PREFIX, random_part);

    let key_prefix = full_key.chars().take(KEY_PREFIX_LENGTH).collect::<String>();

    let api_key = ApiKey {
        id: Uuid::now_v7(),
        user_id,
        key_hash: hash_key(&full_key),
        key_prefix,
        name: name.to_string(),
        expires_at,
        last_used_at: None,
        created_at: Utc::now(),
        revoked_at: None,
    };

    Ok((full_key, api_key))
}

/// Hash an API key using SHA-256.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a duration string like "365d", "30d", "1y", "6m", "2w".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    if let Some(days) = s.strip_suffix('d') {
        days.parse::<i64>().ok().and_then(Duration::try_days)
    } else if let Some(years) = s.strip_suffix('y') {
        years
            .parse::<i64>()
            .ok()
            .and_then(|y| Duration::try_days(y * 365))
    } else if let Some(months) = s.strip_suffix('m') {
        months
            .parse::<i64>()
            .ok()
            .and_then(|m| Duration::try_days(m * 30))
    } else if let Some(weeks) = s.strip_suffix('w') {
        weeks.parse::<i64>().ok().and_then(Duration::try_weeks)
    } else {
        // Bare numbers are days
        s.parse::<i64>().ok().and_then(Duration::try_days)
    }
}

/// Verify an API key and return the authenticated caller.
pub async fn verify_key(pool: &DbPool, key: &str) -> AppResult<AuthenticatedCaller> {
    let key_hash = hash_key(key);
    let conn = pool.connection();

    let api_key = db::find_by_hash(conn, &key_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

    if api_key.is_revoked() {
        return Err(AppError::Unauthorized(
            "API key has been revoked".to_string(),
        ));
    }

    if api_key.is_expired() {
        return Err(AppError::Unauthorized("API key has expired".to_string()));
    }

    let user = users::find_by_id(conn, api_key.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("API key owner no longer exists".to_string()))?;

    if let Err(e) = db::update_last_used(conn, api_key.id).await {
        warn!("Failed to record last use of API key {}: {}", api_key.key_prefix, e);
    }

    Ok(AuthenticatedCaller {
        user_id: user.id,
        email: user.email,
        key_name: api_key.name,
        key_prefix: api_key.key_prefix,
    })
}

/// Create a key for the user with `email`, creating the user on first use.
pub async fn create_key(
    pool: &DbPool,
    email: &str,
    display_name: Option<&str>,
    name: &str,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey, User)> {
    if !email.contains('@') {
        return Err(AppError::InvalidInput(format!("Invalid email: {}", email)));
    }

    let conn = pool.connection();
    let user = users::find_or_create_by_email(conn, email, display_name).await?;

    let (full_key, api_key) = generate_key(user.id, name, expires_in)?;
    db::insert_api_key(conn, &api_key).await?;

    Ok((full_key, api_key, user))
}
