//! User entity - A tracker user and their notification subscription settings.
//!
//! The primary key is the Discord user ID. `notification_destination` holds the
//! Discord channel ID that scheduled reports are posted to; an empty string means
//! the user never subscribed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name used in logs and reminders
    pub name: String,
    /// Discord channel ID for scheduled notifications (empty when unset)
    pub notification_destination: String,
    /// Master switch for all scheduled notifications
    pub notifications_enabled: bool,
    /// Receive the daily report
    pub daily_report: bool,
    /// Receive the weekly report
    pub weekly_report: bool,
    /// Receive the monthly report
    pub monthly_report: bool,
    /// Receive budget alerts during the daily check
    pub budget_alerts: bool,
    /// Receive the weekly friend payment reminder
    pub friend_reminders: bool,
}

/// A user owns every other record in the system
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// One user has many income records
    #[sea_orm(has_many = "super::income::Entity")]
    Income,
    /// One user has many friends
    #[sea_orm(has_many = "super::friend::Entity")]
    Friends,
    /// One user has many budgets
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
    /// One user has many alert log entries
    #[sea_orm(has_many = "super::alert_log::Entity")]
    AlertLog,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::income::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Income.def()
    }
}

impl Related<super::friend::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Friends.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::alert_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
