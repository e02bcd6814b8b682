//! User registration and notification subscriptions.
//!
//! A user is created the first time they interact with the bot. Scheduled
//! notifications are opt-in: `/subscribe` sets the destination channel and turns on
//! the master switch, after which each [`NotificationFlag`] selects what is sent.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;

/// Per-user switches for the individual scheduled notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NotificationFlag {
    /// Daily report
    DailyReport,
    /// Weekly report
    WeeklyReport,
    /// Monthly report
    MonthlyReport,
    /// Budget alerts checked alongside the daily report
    BudgetAlerts,
    /// Weekly friend payment reminder
    FriendReminders,
}

impl NotificationFlag {
    const fn column(self) -> user::Column {
        match self {
            Self::DailyReport => user::Column::DailyReport,
            Self::WeeklyReport => user::Column::WeeklyReport,
            Self::MonthlyReport => user::Column::MonthlyReport,
            Self::BudgetAlerts => user::Column::BudgetAlerts,
            Self::FriendReminders => user::Column::FriendReminders,
        }
    }

    /// Whether this flag is set on a user row.
    #[must_use]
    pub const fn is_set(self, user: &user::Model) -> bool {
        match self {
            Self::DailyReport => user.daily_report,
            Self::WeeklyReport => user.weekly_report,
            Self::MonthlyReport => user.monthly_report,
            Self::BudgetAlerts => user.budget_alerts,
            Self::FriendReminders => user.friend_reminders,
        }
    }
}

/// A user who should receive a scheduled notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    /// Discord user ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Channel ID notifications are posted to
    pub destination: String,
}

impl From<user::Model> for Subscriber {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            destination: model.notification_destination,
        }
    }
}

/// Gets a user by Discord ID.
pub async fn get_user(db: &DatabaseConnection, user_id: &str) -> Result<user::Model> {
    User::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            user_id: user_id.to_string(),
        })
}

/// Returns the user, creating them with notifications off if they are new.
///
/// Every per-notification flag starts enabled so that subscribing alone is enough
/// to receive everything.
pub async fn ensure_user(db: &DatabaseConnection, user_id: &str, name: &str) -> Result<user::Model> {
    if let Some(existing) = User::find_by_id(user_id.to_string()).one(db).await? {
        return Ok(existing);
    }

    let new_user = user::ActiveModel {
        id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        notification_destination: Set(String::new()),
        notifications_enabled: Set(false),
        daily_report: Set(true),
        weekly_report: Set(true),
        monthly_report: Set(true),
        budget_alerts: Set(true),
        friend_reminders: Set(true),
    };

    let model = new_user.insert(db).await?;
    tracing::info!(user_id, name, "Registered new user");
    Ok(model)
}

/// Turns scheduled notifications on and points them at `destination`.
pub async fn subscribe(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    destination: &str,
) -> Result<user::Model> {
    let destination = destination.trim();
    if destination.is_empty() {
        return Err(Error::Config {
            message: "Notification destination cannot be empty".to_string(),
        });
    }

    let existing = ensure_user(db, user_id, name).await?;
    let mut active_model: user::ActiveModel = existing.into();
    active_model.name = Set(name.to_string());
    active_model.notification_destination = Set(destination.to_string());
    active_model.notifications_enabled = Set(true);

    active_model.update(db).await.map_err(Into::into)
}

/// Turns every scheduled notification off. The destination is kept.
pub async fn unsubscribe(db: &DatabaseConnection, user_id: &str) -> Result<user::Model> {
    let existing = get_user(db, user_id).await?;
    let mut active_model: user::ActiveModel = existing.into();
    active_model.notifications_enabled = Set(false);

    active_model.update(db).await.map_err(Into::into)
}

/// Sets one notification flag.
pub async fn set_notification_flag(
    db: &DatabaseConnection,
    user_id: &str,
    flag: NotificationFlag,
    enabled: bool,
) -> Result<user::Model> {
    let existing = get_user(db, user_id).await?;
    let mut active_model: user::ActiveModel = existing.into();
    match flag {
        NotificationFlag::DailyReport => active_model.daily_report = Set(enabled),
        NotificationFlag::WeeklyReport => active_model.weekly_report = Set(enabled),
        NotificationFlag::MonthlyReport => active_model.monthly_report = Set(enabled),
        NotificationFlag::BudgetAlerts => active_model.budget_alerts = Set(enabled),
        NotificationFlag::FriendReminders => active_model.friend_reminders = Set(enabled),
    }

    active_model.update(db).await.map_err(Into::into)
}

/// Lists users with notifications enabled, `flag` set and a non-empty destination.
pub async fn list_subscribed_users(
    db: &DatabaseConnection,
    flag: NotificationFlag,
) -> Result<Vec<Subscriber>> {
    let users = User::find()
        .filter(user::Column::NotificationsEnabled.eq(true))
        .filter(flag.column().eq(true))
        .filter(user::Column::NotificationDestination.ne(""))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;

    Ok(users.into_iter().map(Subscriber::from).collect())
}
