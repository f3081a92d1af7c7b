//! Category entity - user-owned labels that recurring definitions may
//! reference. A definition with no category is "uncategorized".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the category
    pub user_id: i64,
    /// Display name (e.g., "Rent", "Subscriptions")
    pub name: String,
    /// Optional display color
    pub color: Option<String>,
    /// Optional display icon
    pub icon: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category is referenced by many recurring definitions
    #[sea_orm(has_many = "super::recurring_definition::Entity")]
    RecurringDefinitions,
}

impl Related<super::recurring_definition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringDefinitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
