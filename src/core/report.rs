//! Report generation business logic.
//!
//! This module composes aggregator outputs into daily, weekly and monthly reports,
//! the friend payment reminder list and the month-to-date budget status. All
//! builders are pure functions of already-fetched records and the current local
//! time; formatting for Discord happens in the bot layer.

use crate::core::{
    aggregate::{Window, group_by_category, records_in, sum_in_window, total},
    alerts::{self, AlertEvent, AlertSettings, Tip},
    budget::BudgetConfig,
    record::{FriendBalance, MonetaryRecord, category_icon},
};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

/// Number of categories listed in the daily report.
pub const DAILY_TOP_CATEGORIES: usize = 3;
/// Number of categories listed in the monthly report.
pub const MONTHLY_TOP_CATEGORIES: usize = 5;
/// Week-over-week change (in percent) needed before a trend is reported.
pub const TREND_THRESHOLD_PERCENT: f64 = 10.0;
/// Savings target suggested when nothing was saved.
pub const SAVINGS_TARGET_PERCENT: f64 = 20.0;

/// A category and its total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name
    pub category: String,
    /// Display icon
    pub icon: &'static str,
    /// Total spent
    pub amount: f64,
}

/// A category's total and its share of the period's spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// Category name
    pub category: String,
    /// Display icon
    pub icon: &'static str,
    /// Total spent
    pub amount: f64,
    /// Share of the period total (0-100)
    pub percentage: f64,
}

/// Budget warning included in the daily report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DailyAlert {
    /// Between 80% and 100% of the monthly budget used
    BudgetNearlyUsed {
        /// Percentage used
        percentage: f64,
    },
    /// Monthly budget exceeded
    BudgetExceeded {
        /// Amount over budget
        overspent: f64,
    },
}

/// Summary of today's activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    /// Local date the report covers
    pub date: NaiveDate,
    /// Expenses recorded today
    pub today_expenses: f64,
    /// Income recorded today
    pub today_income: f64,
    /// Expenses since the first of the month
    pub month_to_date_expenses: f64,
    /// Percentage of the monthly budget used so far, `None` without a budget
    pub budget_used: Option<f64>,
    /// Today's biggest categories, largest first
    pub top_spending: Vec<CategoryTotal>,
    /// Budget warnings
    pub alerts: Vec<DailyAlert>,
}

/// Week-over-week spending direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Trend {
    /// Spending rose by more than the threshold
    More {
        /// Increase in percent
        percent: f64,
    },
    /// Spending fell by more than the threshold
    Less {
        /// Decrease in percent (positive)
        percent: f64,
    },
    /// Within the threshold either way
    Similar,
}

impl Trend {
    /// Human-readable trend line.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::More { percent } => format!("⬆️ {percent:.0}% more than last week"),
            Self::Less { percent } => format!("⬇️ {percent:.0}% less than last week"),
            Self::Similar => "➡️ Similar to last week".to_string(),
        }
    }
}

/// Summary of the trailing seven days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    /// First instant of the week window
    pub week_start: NaiveDateTime,
    /// Last instant of the week window
    pub week_end: NaiveDateTime,
    /// Expenses in the window
    pub week_expenses: f64,
    /// Income in the window
    pub week_income: f64,
    /// `week_income - week_expenses`
    pub net_amount: f64,
    /// Every category, largest first
    pub category_breakdown: Vec<CategoryShare>,
    /// Expenses in the seven days before the window
    pub previous_week_expenses: f64,
    /// `None` when there was no spending the week before
    pub trend: Option<Trend>,
}

/// Outcome of the month's saving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SavingsGoal {
    /// Money was saved
    Saved {
        /// Share of income saved
        percent: f64,
    },
    /// Nothing saved; suggest a target for next month
    Target {
        /// Suggested share of income to save
        percent: f64,
    },
}

impl SavingsGoal {
    /// Human-readable savings line.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Saved { percent } => format!("Great! You saved {percent:.0}% of your income!"),
            Self::Target { percent } => {
                format!("Goal: Save at least {percent:.0}% next month!")
            }
        }
    }
}

/// Summary of the calendar month to date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Expenses this month
    pub month_expenses: f64,
    /// Income this month
    pub month_income: f64,
    /// `month_income - month_expenses`
    pub net_savings: f64,
    /// Monthly budget, 0 when none was set
    pub budget_target: f64,
    /// Percentage of the budget used, `None` without a budget
    pub budget_used_percent: Option<f64>,
    /// `budget_target - month_expenses`, `None` without a budget
    pub budget_remaining: Option<f64>,
    /// Biggest categories, largest first
    pub top_categories: Vec<CategoryTotal>,
    /// Savings message
    pub savings_goal: SavingsGoal,
}

/// A friend who owes the user money.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendOwing {
    /// Friend's name
    pub name: String,
    /// Amount owed
    pub amount: f64,
}

/// Any of the scheduled reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReportPayload {
    /// Daily report
    Daily(DailyReport),
    /// Weekly report
    Weekly(WeeklyReport),
    /// Monthly report
    Monthly(MonthlyReport),
}

/// Sorts category totals largest first, breaking ties by name.
fn ranked(totals: HashMap<String, f64>) -> Vec<(String, f64)> {
    let mut entries: Vec<(String, f64)> = totals.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

fn top_categories<'a, I>(records: I, limit: usize) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
{
    ranked(group_by_category(records))
        .into_iter()
        .take(limit)
        .map(|(category, amount)| CategoryTotal {
            icon: category_icon(&category),
            category,
            amount,
        })
        .collect()
}

/// Builds the daily report. `budget_used` is month-to-date spending against `budget`.
#[must_use]
pub fn build_daily(
    expenses: &[MonetaryRecord],
    income: &[MonetaryRecord],
    budget: f64,
    now: NaiveDateTime,
) -> DailyReport {
    let today = Window::today(now);
    let today_expenses = records_in(expenses, &today);
    let month_to_date_expenses = sum_in_window(expenses, &Window::month_to_date(now));
    let budget_used = alerts::budget_percentage(budget, month_to_date_expenses);

    let mut daily_alerts = Vec::new();
    if let Some(percentage) = budget_used {
        if (80.0..100.0).contains(&percentage) {
            daily_alerts.push(DailyAlert::BudgetNearlyUsed { percentage });
        } else if percentage >= 100.0 {
            daily_alerts.push(DailyAlert::BudgetExceeded {
                overspent: month_to_date_expenses - budget,
            });
        }
    }

    DailyReport {
        date: now.date(),
        today_expenses: total(today_expenses.iter().copied()),
        today_income: sum_in_window(income, &today),
        month_to_date_expenses,
        budget_used,
        top_spending: top_categories(today_expenses, DAILY_TOP_CATEGORIES),
        alerts: daily_alerts,
    }
}

/// Classifies this week's spending against last week's. `None` when last week was empty.
#[must_use]
pub fn classify_trend(this_week: f64, previous_week: f64) -> Option<Trend> {
    if previous_week <= 0.0 {
        return None;
    }

    let change = (this_week - previous_week) * 100.0 / previous_week;
    Some(if change > TREND_THRESHOLD_PERCENT {
        Trend::More { percent: change }
    } else if change < -TREND_THRESHOLD_PERCENT {
        Trend::Less {
            percent: change.abs(),
        }
    } else {
        Trend::Similar
    })
}

/// Builds the weekly report over the trailing seven days.
#[must_use]
pub fn build_weekly(
    expenses: &[MonetaryRecord],
    income: &[MonetaryRecord],
    now: NaiveDateTime,
) -> WeeklyReport {
    let week = Window::trailing_days(now, 7);
    let week_expenses = records_in(expenses, &week);
    let week_total = total(week_expenses.iter().copied());
    let week_income = sum_in_window(income, &week);
    let previous_week_expenses =
        sum_in_window(expenses, &Window::previous_trailing_days(now, 7));

    let category_breakdown = ranked(group_by_category(week_expenses))
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            icon: category_icon(&category),
            percentage: if week_total > 0.0 {
                amount * 100.0 / week_total
            } else {
                0.0
            },
            category,
            amount,
        })
        .collect();

    WeeklyReport {
        week_start: week.start,
        week_end: week.end,
        week_expenses: week_total,
        week_income,
        net_amount: week_income - week_total,
        category_breakdown,
        previous_week_expenses,
        trend: classify_trend(week_total, previous_week_expenses),
    }
}

/// Builds the monthly report for the calendar month to date.
#[must_use]
pub fn build_monthly(
    expenses: &[MonetaryRecord],
    income: &[MonetaryRecord],
    budget: f64,
    now: NaiveDateTime,
) -> MonthlyReport {
    let month = Window::month_to_date(now);
    let month_expenses = records_in(expenses, &month);
    let month_total = total(month_expenses.iter().copied());
    let month_income = sum_in_window(income, &month);
    let net_savings = month_income - month_total;
    let budget_used_percent = alerts::budget_percentage(budget, month_total);

    let savings_goal = if net_savings > 0.0 {
        SavingsGoal::Saved {
            percent: net_savings * 100.0 / month_income,
        }
    } else {
        SavingsGoal::Target {
            percent: SAVINGS_TARGET_PERCENT,
        }
    };

    MonthlyReport {
        year: now.year(),
        month: now.month(),
        month_expenses: month_total,
        month_income,
        net_savings,
        budget_target: budget.max(0.0),
        budget_used_percent,
        budget_remaining: budget_used_percent.map(|_| budget - month_total),
        top_categories: top_categories(month_expenses, MONTHLY_TOP_CATEGORIES),
        savings_goal,
    }
}

/// Friends with a positive balance (they owe the user), largest debt first.
#[must_use]
pub fn friends_owing(friends: &[FriendBalance]) -> Vec<FriendOwing> {
    let mut owing: Vec<FriendOwing> = friends
        .iter()
        .filter(|friend| friend.balance > 0.0)
        .map(|friend| FriendOwing {
            name: friend.name.clone(),
            amount: friend.balance,
        })
        .collect();
    owing.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    owing
}

/// Month-to-date budget snapshot used by `/budget` and the scheduled alert check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// Overall monthly budget, 0 when none was set
    pub budget: f64,
    /// Expenses since the first of the month
    pub spent: f64,
    /// Expenses today
    pub spent_today: f64,
    /// Percentage of the budget used, `None` without a budget
    pub percentage: Option<f64>,
    /// `budget - spent`, `None` without a budget
    pub remaining: Option<f64>,
    /// Monthly and category alerts that currently hold
    pub alerts: Vec<AlertEvent>,
    /// Spending tips
    pub tips: Vec<Tip>,
}

/// Evaluates the overall and per-category budgets against month-to-date spending.
///
/// Category budgets are matched to expense categories case-insensitively.
#[must_use]
pub fn build_budget_status(
    expenses: &[MonetaryRecord],
    overall: Option<&BudgetConfig>,
    category_budgets: &[BudgetConfig],
    now: NaiveDateTime,
) -> BudgetStatus {
    let month_expenses = records_in(expenses, &Window::month_to_date(now));
    let spent = total(month_expenses.iter().copied());
    let spent_today = sum_in_window(expenses, &Window::today(now));

    let budget = overall.map_or(0.0, |b| b.amount);
    let settings = overall.map_or_else(AlertSettings::default, |b| b.alert_settings);
    let percentage = alerts::budget_percentage(budget, spent);

    let mut events = alerts::evaluate(budget, spent, spent_today, &settings);
    if settings.enabled {
        let by_category = group_by_category(month_expenses);
        for category_budget in category_budgets {
            let category_spent: f64 = by_category
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case(&category_budget.category))
                .map(|(_, amount)| amount)
                .sum();
            events.extend(alerts::evaluate_category(
                category_budget.amount,
                category_spent,
                &category_budget.category,
            ));
        }
    }

    BudgetStatus {
        budget,
        spent,
        spent_today,
        percentage,
        remaining: percentage.map(|_| budget - spent),
        alerts: events,
        tips: alerts::recommendations(budget, spent, now.date()),
    }
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `progress_percent` - Progress percentage (0-100)
/// * `bar_length` - Length of the progress bar in characters (default 10)
///
/// # Returns
/// Formatted progress bar string
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // Cast safety: clamped_progress ∈ [0, 100], length is small (10-20).
    // Result is mathematically in [0, length], truncation/sign loss intentional for display.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}
