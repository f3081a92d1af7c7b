//! Shared test utilities for `ScheduleBuddy`.
//!
//! Common helpers for setting up in-memory test databases and creating test
//! entities with sensible defaults.

use crate::{
    core::{category, recurring, recurring::DefinitionInput},
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a definition input with sensible defaults: a 10.00 expense with no
/// category, end date, or metadata, starting active.
#[must_use]
pub fn definition_input(
    description: &str,
    frequency: &str,
    start_date: NaiveDate,
) -> DefinitionInput {
    DefinitionInput {
        description: description.to_string(),
        amount: dec!(10.00),
        kind: "expense".to_string(),
        frequency: frequency.to_string(),
        start_date,
        end_date: None,
        category_id: None,
        payment_method: None,
        notes: None,
        active: true,
    }
}

/// Creates a test definition with defaults: monthly expense anchored on
/// 2025-01-01 and projected as of the same day.
pub async fn create_test_definition(
    db: &DatabaseConnection,
    user_id: i64,
    description: &str,
) -> Result<entities::recurring_definition::Model> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    recurring::create_definition(db, user_id, definition_input(description, "monthly", start), start)
        .await
}

/// Creates a test category with no color or icon.
pub async fn create_test_category(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, user_id, name.to_string(), None, None).await
}
