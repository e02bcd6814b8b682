//! Expense entity - A single recorded expense.
//!
//! `payment_method` stores the display name of [`crate::core::record::PaymentMethod`]
//! (`"Cash"`, `"Card"`, `"UPI"`, `"Net Banking"` or `"Other"`).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID of the owner
    pub user_id: String,
    /// Amount spent, never negative
    pub amount: f64,
    /// Spending category (e.g., `"Food"`)
    pub category: String,
    /// Optional free-form note
    pub description: Option<String>,
    /// When the money was spent
    pub date: DateTimeUtc,
    /// How the expense was paid
    pub payment_method: String,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense belongs to one user
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
