//! Budget entity - A per-user budget for one month.
//!
//! Rows are unique per (`user_id`, `category`, `month`, `year`); the category
//! `"monthly"` is the overall budget. Alert settings are stored inline.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID of the owner
    pub user_id: String,
    /// Category this budget applies to, `"monthly"` for the overall budget
    pub category: String,
    /// Budgeted amount, never negative
    pub amount: f64,
    /// Calendar month (1-12)
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Master switch for budget alerts
    pub alerts_enabled: bool,
    /// Emit the 80% warning
    pub threshold_80: bool,
    /// Emit the 100% alert
    pub threshold_100: bool,
    /// Daily spending limit, `0` disables the check
    pub daily_limit: f64,
    /// Whether the UI should play a sound with alerts
    pub notification_sound: bool,
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
