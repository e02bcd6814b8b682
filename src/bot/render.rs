//! Markdown rendering of reports, alerts and reminders for Discord messages.
//!
//! Scheduled notifications and the interactive report commands share these
//! renderers so both look the same.

use crate::{
    core::{
        aggregate::{CategoryMonthBucket, SpendingSummary},
        alerts::AlertEvent,
        notify::Notification,
        record::category_icon,
        report::{
            self, BudgetStatus, DailyAlert, DailyReport, FriendOwing, MonthlyReport,
            ReportPayload, WeeklyReport,
        },
    },
    errors::Result,
};
use chrono::NaiveDate;
use std::fmt::Write;

/// Formats an amount with the currency symbol and no decimals, e.g. `₹1250`.
#[must_use]
pub fn money(currency: &str, amount: f64) -> String {
    if amount < 0.0 {
        format!("-{currency}{:.0}", amount.abs())
    } else {
        format!("{currency}{amount:.0}")
    }
}

/// Longest message Discord accepts, in characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Categories listed in the weekly breakdown before the rest are folded together.
const WEEKLY_CATEGORY_LIMIT: usize = 10;

/// Cuts `text` down to [`MESSAGE_LIMIT`] characters, ending with an ellipsis when
/// anything was dropped.
#[must_use]
pub fn fit_message(text: String) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        return text;
    }
    let mut fitted: String = text.chars().take(MESSAGE_LIMIT - 1).collect();
    fitted.push('…');
    fitted
}

/// Renders any scheduled notification.
pub fn render_notification(notification: &Notification, currency: &str) -> Result<String> {
    match notification {
        Notification::Report(ReportPayload::Daily(daily)) => render_daily(daily, currency),
        Notification::Report(ReportPayload::Weekly(weekly)) => render_weekly(weekly, currency),
        Notification::Report(ReportPayload::Monthly(monthly)) => render_monthly(monthly, currency),
        Notification::FriendReminder(owing) => render_friend_reminder(owing, currency),
        Notification::BudgetAlert(alert) => Ok(render_alert(alert, currency)),
    }
}

/// Renders the daily report.
pub fn render_daily(daily: &DailyReport, currency: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "📊 **Daily Report** - {}\n",
        daily.date.format("%a, %d %b %Y")
    )?;
    writeln!(out, "💸 Spent today: **{}**", money(currency, daily.today_expenses))?;
    writeln!(out, "💰 Earned today: **{}**", money(currency, daily.today_income))?;
    writeln!(
        out,
        "📅 This month: {}",
        money(currency, daily.month_to_date_expenses)
    )?;
    if let Some(used) = daily.budget_used {
        writeln!(
            out,
            "🎯 Budget used: {}",
            report::format_progress_bar(used, Some(10))
        )?;
    }

    if !daily.top_spending.is_empty() {
        writeln!(out, "\n**Top spending today**")?;
        for entry in &daily.top_spending {
            writeln!(
                out,
                "{} {}: {}",
                entry.icon,
                entry.category,
                money(currency, entry.amount)
            )?;
        }
    }

    for alert in &daily.alerts {
        match alert {
            DailyAlert::BudgetNearlyUsed { percentage } => {
                writeln!(out, "\n⚠️ You've used {percentage:.0}% of your monthly budget!")?;
            }
            DailyAlert::BudgetExceeded { overspent } => writeln!(
                out,
                "\n🚨 Monthly budget exceeded by {}!",
                money(currency, *overspent)
            )?,
        }
    }

    Ok(out)
}

/// Renders the weekly report.
pub fn render_weekly(weekly: &WeeklyReport, currency: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "📈 **Weekly Report** - {} to {}\n",
        weekly.week_start.format("%d %b"),
        weekly.week_end.format("%d %b %Y")
    )?;
    writeln!(out, "💸 Spent: **{}**", money(currency, weekly.week_expenses))?;
    writeln!(out, "💰 Earned: **{}**", money(currency, weekly.week_income))?;
    let net_icon = if weekly.net_amount >= 0.0 { "✅" } else { "❌" };
    writeln!(out, "{net_icon} Net: {}", money(currency, weekly.net_amount))?;

    if !weekly.category_breakdown.is_empty() {
        writeln!(out, "\n**Category breakdown**")?;
        let (shown, rest) = weekly
            .category_breakdown
            .split_at(weekly.category_breakdown.len().min(WEEKLY_CATEGORY_LIMIT));
        for share in shown {
            writeln!(
                out,
                "{} {}: {} ({:.0}%)",
                share.icon,
                share.category,
                money(currency, share.amount),
                share.percentage
            )?;
        }
        if !rest.is_empty() {
            let amount: f64 = rest.iter().map(|share| share.amount).sum();
            let percentage: f64 = rest.iter().map(|share| share.percentage).sum();
            writeln!(
                out,
                "➕ {} more categories: {} ({percentage:.0}%)",
                rest.len(),
                money(currency, amount)
            )?;
        }
    }

    if let Some(trend) = &weekly.trend {
        writeln!(out, "\n{}", trend.describe())?;
    }

    Ok(out)
}

/// Renders the monthly report.
pub fn render_monthly(monthly: &MonthlyReport, currency: &str) -> Result<String> {
    let mut out = String::new();
    let month_name = NaiveDate::from_ymd_opt(monthly.year, monthly.month, 1).map_or_else(
        || format!("{}-{:02}", monthly.year, monthly.month),
        |date| date.format("%B %Y").to_string(),
    );
    writeln!(out, "📅 **Monthly Report** - {month_name}\n")?;
    writeln!(out, "💸 Spent: **{}**", money(currency, monthly.month_expenses))?;
    writeln!(out, "💰 Earned: **{}**", money(currency, monthly.month_income))?;
    writeln!(out, "🏦 Net savings: {}", money(currency, monthly.net_savings))?;

    if let (Some(used), Some(remaining)) = (monthly.budget_used_percent, monthly.budget_remaining) {
        writeln!(
            out,
            "🎯 Budget: {} of {} used ({used:.0}%), {} remaining",
            money(currency, monthly.month_expenses),
            money(currency, monthly.budget_target),
            money(currency, remaining)
        )?;
    }

    if !monthly.top_categories.is_empty() {
        writeln!(out, "\n**Top categories**")?;
        for (rank, entry) in monthly.top_categories.iter().enumerate() {
            writeln!(
                out,
                "{}. {} {}: {}",
                rank + 1,
                entry.icon,
                entry.category,
                money(currency, entry.amount)
            )?;
        }
    }

    writeln!(out, "\n💡 {}", monthly.savings_goal.describe())?;
    Ok(out)
}

/// Renders the friend payment reminder.
pub fn render_friend_reminder(owing: &[FriendOwing], currency: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "👥 **Payment Reminder**\n")?;
    writeln!(out, "These friends owe you money:")?;
    for friend in owing {
        writeln!(out, "• {}: {}", friend.name, money(currency, friend.amount))?;
    }
    let total: f64 = owing.iter().map(|f| f.amount).sum();
    writeln!(out, "\nTotal owed: **{}**", money(currency, total))?;
    Ok(out)
}

/// Renders a single budget alert as a title line and a message line.
#[must_use]
pub fn render_alert(alert: &AlertEvent, currency: &str) -> String {
    format!("**{}**\n{}", alert.title(), alert.message(currency))
}

/// Renders the month-to-date budget status shown by `/budget`.
pub fn render_budget_status(status: &BudgetStatus, currency: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "🎯 **Budget Status**\n")?;

    match (status.percentage, status.remaining) {
        (Some(percentage), Some(remaining)) => {
            writeln!(
                out,
                "Spent {} of {}",
                money(currency, status.spent),
                money(currency, status.budget)
            )?;
            writeln!(out, "{}", report::format_progress_bar(percentage, Some(15)))?;
            writeln!(out, "Remaining: **{}**", money(currency, remaining))?;
        }
        _ => {
            writeln!(
                out,
                "No budget set for this month. Spent so far: {}",
                money(currency, status.spent)
            )?;
            writeln!(out, "Use `/set_budget` to set one.")?;
        }
    }
    writeln!(out, "Today: {}", money(currency, status.spent_today))?;

    if !status.alerts.is_empty() {
        writeln!(out)?;
        for alert in &status.alerts {
            writeln!(out, "{}", render_alert(alert, currency))?;
        }
    }

    if !status.tips.is_empty() {
        writeln!(out)?;
        for tip in &status.tips {
            writeln!(out, "💡 {}", tip.message(currency))?;
        }
    }

    Ok(out)
}

/// Renders the multi-month spending trend shown by `/trend`.
pub fn render_trend(
    summary: &SpendingSummary,
    categories: &[CategoryMonthBucket],
    currency: &str,
) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "📉 **Spending Trend** - last {} months\n",
        summary.months.len()
    )?;

    for (bucket, breakdown) in summary.months.iter().zip(categories) {
        write!(out, "`{}` {}", bucket.label(), money(currency, bucket.total))?;
        let top = breakdown
            .totals
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| b.0.cmp(a.0)));
        if let Some((category, _)) = top {
            write!(out, " {}", category_icon(category))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "\nTotal: **{}**", money(currency, summary.total))?;
    writeln!(
        out,
        "Monthly average: {}",
        money(currency, summary.monthly_average)
    )?;
    if let Some(highest) = &summary.highest_month {
        writeln!(
            out,
            "Highest: {} ({})",
            highest.label(),
            money(currency, highest.total)
        )?;
    }
    if let Some(lowest) = &summary.lowest_month {
        writeln!(
            out,
            "Lowest: {} ({})",
            lowest.label(),
            money(currency, lowest.total)
        )?;
    }
    if let Some((category, amount)) = &summary.top_category {
        writeln!(
            out,
            "Top category: {} {category} ({})",
            category_icon(category),
            money(currency, *amount)
        )?;
    }
    writeln!(out, "Transactions: {}", summary.transaction_count)?;

    if !summary.payment_methods.is_empty() {
        writeln!(out, "\n**By payment method**")?;
        for (method, amount) in &summary.payment_methods {
            let share = if summary.total > 0.0 {
                amount * 100.0 / summary.total
            } else {
                0.0
            };
            writeln!(out, "{method}: {} ({share:.0}%)", money(currency, *amount))?;
        }
    }

    Ok(out)
}
