//! Monetary record types shared by the aggregator and report builders.
//!
//! Persisted expenses and income are converted into [`MonetaryRecord`] at the store
//! boundary. Record dates are local wall-clock times so every window computation
//! happens in server local time.

use crate::entities::{expense, friend, income};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an expense was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash
    Cash,
    /// Debit or credit card
    Card,
    /// Unified Payments Interface transfer
    Upi,
    /// Online bank transfer
    NetBanking,
    /// Anything else
    Other,
}

impl PaymentMethod {
    /// Every payment method, in display order.
    pub const ALL: [Self; 5] = [
        Self::Cash,
        Self::Card,
        Self::Upi,
        Self::NetBanking,
        Self::Other,
    ];

    /// Display name, also used as the persisted value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Upi => "UPI",
            Self::NetBanking => "Net Banking",
            Self::Other => "Other",
        }
    }

    /// Parses a display name case-insensitively. Unknown names map to `Other`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known spending categories. Anything else is rendered as [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Food and groceries
    Food,
    /// Travel and commuting
    Transport,
    /// Entertainment
    Entertainment,
    /// Shopping
    Shopping,
    /// Bills and utilities
    Bills,
    /// Health
    Health,
    /// Education
    Education,
    /// Fallback
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::Food,
        Self::Transport,
        Self::Entertainment,
        Self::Shopping,
        Self::Bills,
        Self::Health,
        Self::Education,
        Self::Other,
    ];

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Entertainment => "Entertainment",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }

    /// Looks up a category by name (case-insensitive), falling back to `Other`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Self::Other)
    }

    /// Emoji shown next to the category in reports.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Food => "🍕",
            Self::Transport => "🚗",
            Self::Entertainment => "🎮",
            Self::Shopping => "🛍️",
            Self::Bills => "📱",
            Self::Health => "🏥",
            Self::Education => "📚",
            Self::Other => "📦",
        }
    }
}

/// Icon for an arbitrary category name.
#[must_use]
pub fn category_icon(name: &str) -> &'static str {
    Category::from_name(name).icon()
}

/// A dated amount of money, either an expense or an income payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryRecord {
    /// Non-negative amount
    pub amount: f64,
    /// Expense category or income source
    pub category: String,
    /// Local wall-clock time of the record
    pub date: NaiveDateTime,
    /// Only set for expenses
    pub payment_method: Option<PaymentMethod>,
}

impl MonetaryRecord {
    /// Creates an expense record.
    #[must_use]
    pub fn expense(
        amount: f64,
        category: impl Into<String>,
        date: NaiveDateTime,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            amount,
            category: category.into(),
            date,
            payment_method: Some(payment_method),
        }
    }

    /// Creates an income record.
    #[must_use]
    pub fn income(amount: f64, source: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            amount,
            category: source.into(),
            date,
            payment_method: None,
        }
    }
}

impl From<expense::Model> for MonetaryRecord {
    fn from(model: expense::Model) -> Self {
        Self::expense(
            model.amount,
            model.category,
            model.date.with_timezone(&Local).naive_local(),
            PaymentMethod::parse(&model.payment_method),
        )
    }
}

impl From<income::Model> for MonetaryRecord {
    fn from(model: income::Model) -> Self {
        Self::income(
            model.amount,
            model.source,
            model.date.with_timezone(&Local).naive_local(),
        )
    }
}

/// A friend's running split balance, as read by the friend reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendBalance {
    /// Friend's display name
    pub name: String,
    /// Positive when the friend owes the user
    pub balance: f64,
}

impl From<friend::Model> for FriendBalance {
    fn from(model: friend::Model) -> Self {
        Self {
            name: model.friend_name,
            balance: model.balance,
        }
    }
}
