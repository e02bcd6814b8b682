//! Expense, income and friend persistence.
//!
//! These are the writes the bot commands make and the reads the report pipeline
//! consumes. Amounts are validated here so every stored expense and income
//! amount is finite and non-negative.

use crate::{
    core::record::PaymentMethod,
    entities::{Expense, Friend, Income, expense, friend, income},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};

fn validate_record_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

/// Records a new expense.
///
/// The amount must be finite and non-negative. The date is stored in UTC and converted back to
/// local time when reports are built.
pub async fn create_expense(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    category: String,
    description: Option<String>,
    payment_method: PaymentMethod,
    date: DateTime<Utc>,
) -> Result<expense::Model> {
    validate_record_amount(amount)?;

    let expense_model = expense::ActiveModel {
        user_id: Set(user_id.to_string()),
        amount: Set(amount),
        category: Set(category),
        description: Set(description),
        date: Set(date),
        payment_method: Set(payment_method.as_str().to_string()),
        ..Default::default()
    };

    expense_model.insert(db).await.map_err(Into::into)
}

/// Records a new income payment.
pub async fn create_income(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    source: String,
    description: Option<String>,
    date: DateTime<Utc>,
) -> Result<income::Model> {
    validate_record_amount(amount)?;

    let income_model = income::ActiveModel {
        user_id: Set(user_id.to_string()),
        amount: Set(amount),
        source: Set(source),
        description: Set(description),
        date: Set(date),
        ..Default::default()
    };

    income_model.insert(db).await.map_err(Into::into)
}

/// Every expense of a user, newest first.
pub async fn list_expenses(db: &DatabaseConnection, user_id: &str) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::UserId.eq(user_id))
        .order_by_desc(expense::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every income record of a user, newest first.
pub async fn list_income(db: &DatabaseConnection, user_id: &str) -> Result<Vec<income::Model>> {
    Income::find()
        .filter(income::Column::UserId.eq(user_id))
        .order_by_desc(income::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets a friend's balance, creating the friend on first use.
///
/// Friend names are matched case-insensitively so `alice` and `Alice` refer to
/// the same row.
pub async fn set_friend_balance(
    db: &DatabaseConnection,
    user_id: &str,
    friend_name: &str,
    balance: f64,
) -> Result<friend::Model> {
    if !balance.is_finite() {
        return Err(Error::InvalidAmount { amount: balance });
    }

    let friend_name = friend_name.trim();
    if friend_name.is_empty() {
        return Err(Error::Config {
            message: "Friend name cannot be empty".to_string(),
        });
    }

    let existing = list_friends(db, user_id)
        .await?
        .into_iter()
        .find(|f| f.friend_name.eq_ignore_ascii_case(friend_name));

    if let Some(model) = existing {
        let mut active_model: friend::ActiveModel = model.into();
        active_model.balance = Set(balance);
        active_model.update(db).await.map_err(Into::into)
    } else {
        let friend_model = friend::ActiveModel {
            user_id: Set(user_id.to_string()),
            friend_name: Set(friend_name.to_string()),
            balance: Set(balance),
            last_reminder_sent: Set(None),
            ..Default::default()
        };
        friend_model.insert(db).await.map_err(Into::into)
    }
}

/// Every friend of a user, ordered by name.
pub async fn list_friends(db: &DatabaseConnection, user_id: &str) -> Result<Vec<friend::Model>> {
    Friend::find()
        .filter(friend::Column::UserId.eq(user_id))
        .order_by_asc(friend::Column::FriendName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Stamps `last_reminder_sent` on every friend who currently owes the user.
///
/// Returns the number of rows stamped.
pub async fn stamp_friend_reminders(
    db: &DatabaseConnection,
    user_id: &str,
    sent_at: DateTime<Utc>,
) -> Result<u64> {
    let result = Friend::update_many()
        .col_expr(friend::Column::LastReminderSent, Expr::value(Some(sent_at)))
        .filter(friend::Column::UserId.eq(user_id))
        .filter(friend::Column::Balance.gt(0.0))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
