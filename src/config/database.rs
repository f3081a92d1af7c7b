//! Database configuration module for `ScheduleBuddy`.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without hand-written SQL.

use crate::entities::{Category, RecurringDefinition};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Idempotence note: this runs `CREATE TABLE IF NOT EXISTS` semantics via
/// `if_not_exists`, so startup against an existing database is safe.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut category_table = schema.create_table_from_entity(Category);
    let mut recurring_table = schema.create_table_from_entity(RecurringDefinition);

    db.execute(builder.build(category_table.if_not_exists()))
        .await?;
    db.execute(builder.build(recurring_table.if_not_exists()))
        .await?;

    Ok(())
}
