//! Alert log entity - Budget alerts that were surfaced to a user.
//!
//! Entries stay unacknowledged until the user reviews them with `/alerts`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Alert log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_log")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID the alert was raised for
    pub user_id: String,
    /// Alert kind (e.g., `"warning_80"`)
    pub kind: String,
    /// Rendered alert message
    pub message: String,
    /// When the alert was raised
    pub triggered_at: DateTimeUtc,
    /// Whether the user has seen it
    pub acknowledged: bool,
}

/// Defines relationships between `AlertLog` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one user
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
