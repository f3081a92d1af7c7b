//! Category business logic.
//!
//! Categories are user-owned labels that recurring definitions may reference.
//! The scheduler only needs enough category support to enforce the
//! "category must resolve for the same user, or be null" rule.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Finds a category by id, scoped to its owner. Returns `Ok(None)` when the
/// id does not exist or belongs to another user.
pub async fn get_category(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Id.eq(category_id))
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns all categories owned by a user, ordered alphabetically by name.
pub async fn list_categories(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a category after validating that the name is non-empty.
pub async fn create_category(
    db: &DatabaseConnection,
    user_id: i64,
    name: String,
    color: Option<String>,
    icon: Option<String>,
) -> Result<category::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            fields: vec!["name".to_string()],
        });
    }

    let category = category::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.trim().to_string()),
        color: Set(color),
        icon: Set(icon),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    Ok(category.insert(db).await?)
}
