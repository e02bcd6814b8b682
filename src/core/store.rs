//! Record store abstraction used by the report pipeline.
//!
//! The scheduler only talks to [`RecordStore`], which lets tests drive it with an
//! in-memory fake. [`DatabaseStore`] is the `SeaORM` implementation used by the bot.

use crate::{
    core::{
        alert_log,
        alerts::{AlertEvent, AlertSettings},
        budget::{self, BudgetConfig},
        record::{FriendBalance, MonetaryRecord},
        records,
        users::{self, NotificationFlag, Subscriber},
    },
    errors::Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

/// Reads and writes the persisted records the reporting engine consumes.
///
/// Every list returns all records for the user; callers filter in memory.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All expenses of a user
    async fn list_expenses(&self, user_id: &str) -> Result<Vec<MonetaryRecord>>;

    /// All income of a user
    async fn list_income(&self, user_id: &str) -> Result<Vec<MonetaryRecord>>;

    /// All friends of a user with their running balance
    async fn list_friends(&self, user_id: &str) -> Result<Vec<FriendBalance>>;

    /// The overall budget for a month, if one was set
    async fn get_budget(&self, user_id: &str, month: u32, year: i32)
    -> Result<Option<BudgetConfig>>;

    /// Category budgets for a month
    async fn list_category_budgets(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<BudgetConfig>>;

    /// Creates or updates the overall budget for a month
    async fn upsert_budget(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
        amount: f64,
        settings: AlertSettings,
    ) -> Result<BudgetConfig>;

    /// Users subscribed to a notification
    async fn list_subscribed_users(&self, flag: NotificationFlag) -> Result<Vec<Subscriber>>;

    /// Adds an alert to the user's alert log
    async fn record_alert(
        &self,
        user_id: &str,
        event: &AlertEvent,
        currency: &str,
        triggered_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Stamps the reminder time on every friend who owes the user
    async fn mark_friends_reminded(&self, user_id: &str, sent_at: DateTime<Utc>) -> Result<()>;
}

/// [`RecordStore`] backed by the application database.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for DatabaseStore {
    async fn list_expenses(&self, user_id: &str) -> Result<Vec<MonetaryRecord>> {
        let expenses = records::list_expenses(&self.db, user_id).await?;
        Ok(expenses.into_iter().map(MonetaryRecord::from).collect())
    }

    async fn list_income(&self, user_id: &str) -> Result<Vec<MonetaryRecord>> {
        let income = records::list_income(&self.db, user_id).await?;
        Ok(income.into_iter().map(MonetaryRecord::from).collect())
    }

    async fn list_friends(&self, user_id: &str) -> Result<Vec<FriendBalance>> {
        let friends = records::list_friends(&self.db, user_id).await?;
        Ok(friends.into_iter().map(FriendBalance::from).collect())
    }

    async fn get_budget(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Option<BudgetConfig>> {
        budget::get_budget(&self.db, user_id, month, year).await
    }

    async fn list_category_budgets(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<BudgetConfig>> {
        budget::list_category_budgets(&self.db, user_id, month, year).await
    }

    async fn upsert_budget(
        &self,
        user_id: &str,
        month: u32,
        year: i32,
        amount: f64,
        settings: AlertSettings,
    ) -> Result<BudgetConfig> {
        budget::upsert_budget(&self.db, user_id, month, year, amount, settings).await
    }

    async fn list_subscribed_users(&self, flag: NotificationFlag) -> Result<Vec<Subscriber>> {
        users::list_subscribed_users(&self.db, flag).await
    }

    async fn record_alert(
        &self,
        user_id: &str,
        event: &AlertEvent,
        currency: &str,
        triggered_at: DateTime<Utc>,
    ) -> Result<()> {
        alert_log::record_alert(&self.db, user_id, event, currency, triggered_at).await?;
        Ok(())
    }

    async fn mark_friends_reminded(&self, user_id: &str, sent_at: DateTime<Utc>) -> Result<()> {
        records::stamp_friend_reminders(&self.db, user_id, sent_at).await?;
        Ok(())
    }
}
