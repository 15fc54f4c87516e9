//! API key and caller models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// API key stored in database.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKey {
    pub id: Uuid,
    /// Owner of every document uploaded with this key
    pub user_id: Uuid,
    /// SHA-256 hash of the full key
    pub key_hash: String,
    /// First 8 characters of the key for identification
    pub key_prefix: String,
    /// Human-readable label (e.g., "Finance laptop")
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Revocation timestamp
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Check if the key is revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if the key is expired.
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }
}

impl From<crate::entity::api_key::Model> for ApiKey {
    fn from(m: crate::entity::api_key::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            key_hash: m.key_hash,
            key_prefix: m.key_prefix,
            name: m.name,
            expires_at: m.expires_at,
            last_used_at: m.last_used_at,
            created_at: m.created_at,
            revoked_at: m.revoked_at,
        }
    }
}

/// Account that owns documents.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for User {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            display_name: m.display_name,
            created_at: m.created_at,
        }
    }
}

/// Authenticated caller information (after API key verification).
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    pub user_id: Uuid,
    pub email: String,
    pub key_name: String,
    pub key_prefix: String,
}
