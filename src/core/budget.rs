//! Budget business logic - Reading and setting per-month budgets.
//!
//! Budgets are unique per (user, category, month, year). The category
//! [`OVERALL_CATEGORY`] holds the overall monthly budget; every other category is a
//! category budget. Setting a budget that already exists updates it in place.

use crate::{
    core::alerts::AlertSettings,
    entities::{Budget, budget},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;

/// Category name of the overall monthly budget.
pub const OVERALL_CATEGORY: &str = "monthly";

/// A budget for one user, category and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetConfig {
    /// Discord user ID of the owner
    pub user_id: String,
    /// [`OVERALL_CATEGORY`] or a spending category
    pub category: String,
    /// Calendar month (1-12)
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Budgeted amount
    pub amount: f64,
    /// Alert preferences for this budget
    pub alert_settings: AlertSettings,
}

impl From<budget::Model> for BudgetConfig {
    fn from(model: budget::Model) -> Self {
        Self {
            user_id: model.user_id,
            category: model.category,
            month: model.month,
            year: model.year,
            amount: model.amount,
            alert_settings: AlertSettings {
                enabled: model.alerts_enabled,
                threshold_80: model.threshold_80,
                threshold_100: model.threshold_100,
                daily_limit: model.daily_limit,
                notification_sound: model.notification_sound,
            },
        }
    }
}

fn validate_period(month: u32, year: i32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::InvalidPeriod { month, year })
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount { amount })
    }
}

async fn find_budget_model(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    month: u32,
    year: i32,
) -> Result<Option<budget::Model>> {
    Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::Category.eq(category))
        .filter(budget::Column::Month.eq(month))
        .filter(budget::Column::Year.eq(year))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Gets the overall monthly budget, or `None` when the user has not set one.
pub async fn get_budget(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
) -> Result<Option<BudgetConfig>> {
    get_category_budget(db, user_id, OVERALL_CATEGORY, month, year).await
}

/// Gets the budget for one category.
pub async fn get_category_budget(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    month: u32,
    year: i32,
) -> Result<Option<BudgetConfig>> {
    validate_period(month, year)?;
    Ok(find_budget_model(db, user_id, category, month, year)
        .await?
        .map(BudgetConfig::from))
}

/// Lists every category budget (not the overall one) for a month, ordered by category.
pub async fn list_category_budgets(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
) -> Result<Vec<BudgetConfig>> {
    validate_period(month, year)?;
    let models = Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::Month.eq(month))
        .filter(budget::Column::Year.eq(year))
        .filter(budget::Column::Category.ne(OVERALL_CATEGORY))
        .order_by_asc(budget::Column::Category)
        .all(db)
        .await?;

    Ok(models.into_iter().map(BudgetConfig::from).collect())
}

/// Creates or updates the overall monthly budget.
pub async fn upsert_budget(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
    amount: f64,
    settings: AlertSettings,
) -> Result<BudgetConfig> {
    upsert_category_budget(db, user_id, OVERALL_CATEGORY, month, year, amount, settings).await
}

/// Creates or updates a budget, keeping (user, category, month, year) unique.
pub async fn upsert_category_budget(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    month: u32,
    year: i32,
    amount: f64,
    settings: AlertSettings,
) -> Result<BudgetConfig> {
    validate_period(month, year)?;
    validate_amount(amount)?;
    validate_amount(settings.daily_limit)?;

    let category = category.trim();
    if category.is_empty() {
        return Err(Error::Config {
            message: "Budget category cannot be empty".to_string(),
        });
    }

    let existing = find_budget_model(db, user_id, category, month, year).await?;

    let model = if let Some(model) = existing {
        let mut active_model: budget::ActiveModel = model.into();
        active_model.amount = Set(amount);
        active_model.alerts_enabled = Set(settings.enabled);
        active_model.threshold_80 = Set(settings.threshold_80);
        active_model.threshold_100 = Set(settings.threshold_100);
        active_model.daily_limit = Set(settings.daily_limit);
        active_model.notification_sound = Set(settings.notification_sound);
        active_model.update(db).await?
    } else {
        let new_budget = budget::ActiveModel {
            user_id: Set(user_id.to_string()),
            category: Set(category.to_string()),
            month: Set(month),
            year: Set(year),
            amount: Set(amount),
            alerts_enabled: Set(settings.enabled),
            threshold_80: Set(settings.threshold_80),
            threshold_100: Set(settings.threshold_100),
            daily_limit: Set(settings.daily_limit),
            notification_sound: Set(settings.notification_sound),
            ..Default::default()
        };
        new_budget.insert(db).await?
    };

    tracing::debug!(
        user_id,
        category,
        month,
        year,
        amount,
        "Budget saved"
    );
    Ok(model.into())
}
