//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the persisted records the reporting engine reads.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod alert_log;
pub mod budget;
pub mod expense;
pub mod friend;
pub mod income;
pub mod user;

// Re-export specific types to avoid conflicts
pub use alert_log::{Column as AlertLogColumn, Entity as AlertLog, Model as AlertLogModel};
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use friend::{Column as FriendColumn, Entity as Friend, Model as FriendModel};
pub use income::{Column as IncomeColumn, Entity as Income, Model as IncomeModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
