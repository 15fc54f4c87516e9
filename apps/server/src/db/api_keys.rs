//! Database operations for API keys using SeaORM.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::ApiKey;

/// Insert a new API key.
pub async fn insert_api_key(db: &DatabaseConnection, key: &ApiKey) -> AppResult<()> {
    let model = crate::entity::api_key::ActiveModel {
        id: Set(key.id),
        user_id: Set(key.user_id),
        key_hash: Set(key.key_hash.clone()),
        key_prefix: Set(key.key_prefix.clone()),
        name: Set(key.name.clone()),
        expires_at: Set(key.expires_at),
        last_used_at: Set(key.last_used_at),
        created_at: Set(key.created_at),
        revoked_at: Set(key.revoked_at),
    };

    crate::entity::api_key::Entity::insert(model)
        .exec(db)
        .await?;

    Ok(())
}

/// Find an API key by its hash.
pub async fn find_by_hash(db: &DatabaseConnection, key_hash: &str) -> AppResult<Option<ApiKey>> {
    let result = crate::entity::api_key::Entity::find()
        .filter(crate::entity::api_key::Column::KeyHash.eq(key_hash))
        .one(db)
        .await?;

    Ok(result.map(ApiKey::from))
}

/// Update last used timestamp.
pub async fn update_last_used(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    crate::entity::api_key::Entity::update_many()
        .col_expr(
            crate::entity::api_key::Column::LastUsedAt,
            sea_query::Expr::value(Utc::now()),
        )
        .filter(crate::entity::api_key::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(())
}
