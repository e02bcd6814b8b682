//! Shared test utilities for `ExpenseBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{record::PaymentMethod, records},
    entities,
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a user with notifications enabled and every flag set.
///
/// Unlike `users::subscribe`, an empty `destination` is stored as given so tests
/// can cover users that cannot be reached.
pub async fn create_custom_user(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    destination: &str,
) -> Result<entities::user::Model> {
    let user = entities::user::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        notification_destination: Set(destination.to_string()),
        notifications_enabled: Set(true),
        daily_report: Set(true),
        weekly_report: Set(true),
        monthly_report: Set(true),
        budget_alerts: Set(true),
        friend_reminders: Set(true),
    };
    user.insert(db).await.map_err(Into::into)
}

/// Creates a test expense with sensible defaults.
///
/// # Defaults
/// * `description`: None
/// * `payment_method`: Cash
pub async fn create_test_expense(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    category: &str,
    date: DateTime<Utc>,
) -> Result<entities::expense::Model> {
    records::create_expense(
        db,
        user_id,
        amount,
        category.to_string(),
        None,
        PaymentMethod::Cash,
        date,
    )
    .await
}

/// Sets up a complete test environment with one subscribed user.
/// Returns (db, user) for common test scenarios.
pub async fn setup_with_user() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let user = create_custom_user(&db, "test_user", "Test User", "100").await?;
    Ok((db, user))
}
