//! Shared test utilities for Abonementus.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{client, subscription},
    entities,
    errors::Result,
    events::EventBus,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test client with only the required first name set.
pub async fn create_test_client(
    db: &DatabaseConnection,
    first_name: &str,
) -> Result<entities::client::Model> {
    client::create_client(
        db,
        &EventBus::default(),
        client::ClientDetails {
            first_name: first_name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test subscription starting now, returning it with its lessons.
pub async fn create_test_subscription(
    db: &DatabaseConnection,
    client_id: i64,
    lesson_count: i32,
    total_price: f64,
) -> Result<(entities::subscription::Model, Vec<entities::lesson::Model>)> {
    subscription::create_subscription(
        db,
        &EventBus::default(),
        client_id,
        lesson_count,
        total_price,
        Utc::now(),
    )
    .await
}

/// Inserts a lesson row directly, bypassing foreign key enforcement.
///
/// Used to fabricate orphaned lessons the reconciliation pass must clean up;
/// the core API cannot produce them while cascades are honored.
pub async fn insert_raw_lesson(
    db: &DatabaseConnection,
    client_id: i64,
    subscription_id: Option<i64>,
    number: i32,
    price: f64,
) -> Result<entities::lesson::Model> {
    db.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
    let inserted = entities::lesson::ActiveModel {
        client_id: Set(client_id),
        subscription_id: Set(subscription_id),
        number: Set(number),
        price: Set(price),
        created_at: Set(Utc::now()),
        conducted_at: Set(None),
        is_completed: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    Ok(inserted)
}

/// Inserts a completed lesson that never recorded a conducted date.
///
/// The UI cannot create this state directly, but historical data contains it;
/// aggregation falls back to the creation date for such rows.
pub async fn insert_completed_lesson_without_conducted_date(
    db: &DatabaseConnection,
    client_id: i64,
    price: f64,
) -> Result<entities::lesson::Model> {
    entities::lesson::ActiveModel {
        client_id: Set(client_id),
        subscription_id: Set(None),
        number: Set(1),
        price: Set(price),
        created_at: Set(Utc::now()),
        conducted_at: Set(None),
        is_completed: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}
