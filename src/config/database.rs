//! Database configuration module for Abonementus.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions via `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. It also carries
//! the one additive migration this application has ever needed: the `lessons.number`
//! column, added with a default of 1 and backfilled sequentially for databases created
//! before lesson numbering existed.

use crate::entities::{Client, ExtraIncome, IncomeCategory, Lesson, Subscription, lesson};
use crate::errors::Result;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryOrder,
    Schema, Set, Statement,
};
use tracing::{debug, info};

/// Gets the database URL from the environment or returns the default `SQLite` path.
///
/// Looks for `DATABASE_URL` and falls back to a local file that is created on
/// first use (`mode=rwc`).
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/abonementus.sqlite?mode=rwc".to_string())
}

/// Opens a connection to the given database URL with foreign keys enabled.
///
/// `SQLite` only honors cascade deletes when the `foreign_keys` pragma is on,
/// so it is set explicitly on every fresh connection.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    let db = Database::connect(database_url).await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    Ok(db)
}

/// Opens a connection using [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

/// Creates all necessary database tables from the entity definitions.
///
/// Safe to call on an existing database: each statement is `IF NOT EXISTS`.
/// Foreign keys (client → subscription → lesson, category → extra income) are
/// declared with cascade deletes from the entity relation definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut client_table = schema.create_table_from_entity(Client);
    let mut subscription_table = schema.create_table_from_entity(Subscription);
    let mut lesson_table = schema.create_table_from_entity(Lesson);
    let mut category_table = schema.create_table_from_entity(IncomeCategory);
    let mut extra_income_table = schema.create_table_from_entity(ExtraIncome);

    db.execute(builder.build(client_table.if_not_exists()))
        .await?;
    db.execute(builder.build(subscription_table.if_not_exists()))
        .await?;
    db.execute(builder.build(lesson_table.if_not_exists()))
        .await?;
    db.execute(builder.build(category_table.if_not_exists()))
        .await?;
    db.execute(builder.build(extra_income_table.if_not_exists()))
        .await?;

    Ok(())
}

/// Ensures the `lessons.number` column exists, backfilling sequential numbers.
///
/// Databases created before lesson numbering lack the column; queries against
/// the current entity then fail with a schema mismatch. This migration adds the
/// column with a default of 1 and renumbers all pre-existing lessons in
/// insertion order. The subscription engine runs it once and retries when a
/// lesson insert fails (see `core::subscription::create_subscription`).
///
/// # Returns
/// * `Ok(true)` - The column was added and rows were backfilled
/// * `Ok(false)` - The column already existed; nothing to do
pub async fn ensure_lesson_number_column(db: &DatabaseConnection) -> Result<bool> {
    let backend = db.get_database_backend();
    let columns = db
        .query_all(Statement::from_string(
            backend,
            "PRAGMA table_info(lessons)",
        ))
        .await?;

    let has_number = columns
        .iter()
        .any(|row| row.try_get::<String>("", "name").is_ok_and(|n| n == "number"));
    if has_number {
        debug!("lessons.number column already present, skipping migration");
        return Ok(false);
    }

    info!("Adding number column to lessons table and backfilling");
    db.execute_unprepared("ALTER TABLE lessons ADD COLUMN number INTEGER NOT NULL DEFAULT 1")
        .await?;

    // Backfill sequential numbers ordered by insertion
    let existing = Lesson::find()
        .order_by_asc(lesson::Column::Id)
        .all(db)
        .await?;
    let backfilled = existing.len();
    for (index, model) in existing.into_iter().enumerate() {
        let mut active_model: lesson::ActiveModel = model.into();
        active_model.number = Set(i32::try_from(index).unwrap_or(i32::MAX).saturating_add(1));
        active_model.update(db).await?;
    }

    info!("Backfilled lesson numbers for {backfilled} existing lessons");
    Ok(true)
}
