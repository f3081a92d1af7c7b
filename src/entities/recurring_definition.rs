//! Recurring definition entity - the stored template that generates
//! transactions on a schedule.
//!
//! `kind` and `frequency` are stored as plain strings and parsed into their
//! enums at the core boundary, so a corrupted row surfaces as an error
//! instead of silently misbehaving.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring definition database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_definitions")]
pub struct Model {
    /// Unique identifier, opaque and immutable
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the definition
    pub user_id: i64,
    /// Optional category reference; None means "uncategorized"
    pub category_id: Option<i64>,
    /// Amount per occurrence, always strictly positive
    pub amount: Decimal,
    /// "income" or "expense"
    pub kind: String,
    /// Human-readable label (e.g., "Rent", "Salary")
    pub description: String,
    /// "daily", "weekly", "monthly" or "yearly"
    pub frequency: String,
    /// Anchor date the schedule is computed from
    pub start_date: Date,
    /// Last date the schedule may fire on, if any
    pub end_date: Option<Date>,
    /// Cached next occurrence; None when the schedule has run past end_date
    pub next_occurrence: Option<Date>,
    /// Paused definitions (false) are excluded from projections and totals
    pub active: bool,
    /// Opaque payment method metadata
    pub payment_method: Option<String>,
    /// Opaque free-text notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime,
    /// Last modification timestamp
    pub updated_at: DateTime,
}

/// Defines relationships between recurring definitions and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each definition optionally belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
