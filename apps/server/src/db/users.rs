//! Database operations for users.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;

/// Find a user by email, creating it on first use.
pub async fn find_or_create_by_email(
    db: &DatabaseConnection,
    email: &str,
    display_name: Option<&str>,
) -> AppResult<User> {
    let email = email.trim().to_lowercase();

    let existing = crate::entity::user::Entity::find()
        .filter(crate::entity::user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;

    if let Some(m) = existing {
        return Ok(m.into());
    }

    let model = crate::entity::user::ActiveModel {
        id: Set(Uuid::now_v7()),
        email: Set(email),
        display_name: Set(display_name.map(|s| s.to_string())),
        created_at: Set(Utc::now()),
    };

    let inserted = model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?;

    Ok(inserted.into())
}

/// Find a user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<User>> {
    let result = crate::entity::user::Entity::find_by_id(id).one(db).await?;

    Ok(result.map(User::from))
}
