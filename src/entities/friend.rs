//! Friend entity - A friend and their running split balance.
//!
//! A positive `balance` means the friend owes the user; negative means the user
//! owes the friend. Set with `/friend` and read by the weekly payment reminder.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Friend database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friends")]
pub struct Model {
    /// Unique identifier for the friend
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID of the owner
    pub user_id: String,
    /// Friend's display name
    pub friend_name: String,
    /// Running balance (positive = friend owes user)
    pub balance: f64,
    /// When a payment reminder mentioning this friend was last delivered
    pub last_reminder_sent: Option<DateTimeUtc>,
}

/// Defines relationships between Friend and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each friend belongs to one user
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
