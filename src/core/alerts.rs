//! Budget threshold evaluation.
//!
//! [`evaluate`] decides which budget alerts currently hold for a month, and
//! [`evaluate_category`] does the same for a single category budget. Both are pure:
//! a budget of zero (or less) simply skips the percentage checks instead of
//! dividing by zero. [`recommendations`] produces informational spending tips.
//!
//! Suppressing repeated alerts is the caller's job; [`AlertThrottle`] is the
//! per-(user, kind) "last shown" map callers use for that.

use crate::core::aggregate::days_in_month;
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Per-budget alert preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Master switch, no alerts at all when false
    pub enabled: bool,
    /// Warn at 80% of the budget
    pub threshold_80: bool,
    /// Alert at 100% of the budget
    pub threshold_100: bool,
    /// Daily spending limit, `0` disables the daily check
    pub daily_limit: f64,
    /// Presentation only: whether the UI plays a sound
    pub notification_sound: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_80: true,
            threshold_100: true,
            daily_limit: 0.0,
            notification_sound: true,
        }
    }
}

/// The kind of an [`AlertEvent`], used as the de-duplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    /// 80% of the monthly budget used
    Warning80,
    /// Monthly budget used up or exceeded
    Danger100,
    /// Today's spending is over the daily limit
    DailyLimit,
    /// 80% of a category budget used
    CategoryWarning,
    /// A category budget used up or exceeded
    CategoryExceeded,
}

impl AlertKind {
    /// Stable identifier, also stored in the alert log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning80 => "warning_80",
            Self::Danger100 => "danger_100",
            Self::DailyLimit => "daily_limit",
            Self::CategoryWarning => "category_warning",
            Self::CategoryExceeded => "category_exceeded",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A budget condition that currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertEvent {
    /// `80 <= percentage < 100`
    Warning80 {
        /// Percentage of the budget spent
        percentage: f64,
        /// Amount spent this month
        spent: f64,
        /// Monthly budget
        budget: f64,
        /// `budget - spent`
        remaining: f64,
    },
    /// `percentage >= 100`
    Danger100 {
        /// Percentage of the budget spent
        percentage: f64,
        /// Amount spent this month
        spent: f64,
        /// Monthly budget
        budget: f64,
        /// `spent - budget`
        overspent: f64,
    },
    /// Today's spending is over the daily limit
    DailyLimit {
        /// Amount spent today
        spent_today: f64,
        /// Configured daily limit
        limit: f64,
        /// `spent_today - limit`
        overspent: f64,
    },
    /// `80 <= percentage < 100` for one category
    CategoryWarning {
        /// Category name
        category: String,
        /// Percentage of the category budget spent
        percentage: f64,
        /// Amount spent in the category
        spent: f64,
        /// Category budget
        budget: f64,
    },
    /// `percentage >= 100` for one category
    CategoryExceeded {
        /// Category name
        category: String,
        /// Percentage of the category budget spent
        percentage: f64,
        /// Amount spent in the category
        spent: f64,
        /// Category budget
        budget: f64,
    },
}

impl AlertEvent {
    /// The alert's kind.
    #[must_use]
    pub const fn kind(&self) -> AlertKind {
        match self {
            Self::Warning80 { .. } => AlertKind::Warning80,
            Self::Danger100 { .. } => AlertKind::Danger100,
            Self::DailyLimit { .. } => AlertKind::DailyLimit,
            Self::CategoryWarning { .. } => AlertKind::CategoryWarning,
            Self::CategoryExceeded { .. } => AlertKind::CategoryExceeded,
        }
    }

    /// Category the alert is scoped to, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::CategoryWarning { category, .. } | Self::CategoryExceeded { category, .. } => {
                Some(category.as_str())
            }
            _ => None,
        }
    }

    /// Short headline with an emoji.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Warning80 { .. } => "⚠️ Budget Alert!".to_string(),
            Self::Danger100 { .. } => "🚨 Budget Exceeded!".to_string(),
            Self::DailyLimit { .. } => "📅 Daily Limit Exceeded!".to_string(),
            Self::CategoryWarning { category, .. } => format!("⚠️ {category} Budget Alert"),
            Self::CategoryExceeded { category, .. } => format!("🚨 {category} Budget Exceeded!"),
        }
    }

    /// One-line description; amounts are prefixed with `currency`.
    #[must_use]
    pub fn message(&self, currency: &str) -> String {
        match self {
            Self::Warning80 {
                percentage,
                remaining,
                ..
            } => format!(
                "You've used {percentage:.0}% of your monthly budget! {currency}{remaining:.0} left."
            ),
            Self::Danger100 { overspent, .. } => {
                format!("You've exceeded your monthly budget by {currency}{overspent:.0}!")
            }
            Self::DailyLimit {
                spent_today,
                limit,
                overspent,
            } => format!(
                "Today's spending: {currency}{spent_today:.0} (limit {currency}{limit:.0}), over by {currency}{overspent:.0}"
            ),
            Self::CategoryWarning {
                category,
                percentage,
                ..
            } => format!("{percentage:.0}% of {category} budget used"),
            Self::CategoryExceeded {
                category,
                percentage,
                spent,
                ..
            } => format!(
                "You've spent {currency}{spent:.0} on {category} ({percentage:.0}% of budget)"
            ),
        }
    }
}

/// Percentage of `budget` that `spent` represents, or `None` when the budget is not positive.
#[must_use]
pub fn budget_percentage(budget: f64, spent: f64) -> Option<f64> {
    (budget.is_finite() && budget > 0.0).then(|| spent * 100.0 / budget)
}

/// Evaluates the monthly budget alerts. More than one alert can fire at once.
///
/// * Disabled settings produce nothing.
/// * Percentage checks are skipped when `budget <= 0`.
/// * The daily limit check is independent of the monthly checks.
#[must_use]
pub fn evaluate(
    budget: f64,
    spent: f64,
    daily_spent: f64,
    settings: &AlertSettings,
) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();
    if !settings.enabled {
        return alerts;
    }

    if let Some(percentage) = budget_percentage(budget, spent) {
        if settings.threshold_80 && (80.0..100.0).contains(&percentage) {
            alerts.push(AlertEvent::Warning80 {
                percentage,
                spent,
                budget,
                remaining: budget - spent,
            });
        }
        if settings.threshold_100 && percentage >= 100.0 {
            alerts.push(AlertEvent::Danger100 {
                percentage,
                spent,
                budget,
                overspent: spent - budget,
            });
        }
    }

    if settings.daily_limit > 0.0 && daily_spent > settings.daily_limit {
        alerts.push(AlertEvent::DailyLimit {
            spent_today: daily_spent,
            limit: settings.daily_limit,
            overspent: daily_spent - settings.daily_limit,
        });
    }

    alerts
}

/// Evaluates one category budget with the same 80/100 thresholds.
#[must_use]
pub fn evaluate_category(
    category_budget: f64,
    category_spent: f64,
    category_name: &str,
) -> Option<AlertEvent> {
    let percentage = budget_percentage(category_budget, category_spent)?;

    if percentage >= 100.0 {
        Some(AlertEvent::CategoryExceeded {
            category: category_name.to_string(),
            percentage,
            spent: category_spent,
            budget: category_budget,
        })
    } else if percentage >= 80.0 {
        Some(AlertEvent::CategoryWarning {
            category: category_name.to_string(),
            percentage,
            spent: category_spent,
            budget: category_budget,
        })
    } else {
        None
    }
}

/// Informational spending advice. Never an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tip {
    /// How much can be spent per day for the rest of the month
    DailyBudget {
        /// Remaining budget spread over the remaining days
        per_day: f64,
        /// Days left, counting today when it is the last day
        days_remaining: u32,
    },
    /// Spending is more than 10 points ahead of the expected pace
    SlowDown {
        /// Percentage of the budget spent so far
        percentage: f64,
        /// Percentage of the month elapsed
        expected: f64,
    },
    /// Spending is more than 10 points behind the expected pace
    GoodPace {
        /// Percentage of the budget spent so far
        percentage: f64,
        /// Percentage of the month elapsed
        expected: f64,
    },
}

impl Tip {
    /// One-line description; amounts are prefixed with `currency`.
    #[must_use]
    pub fn message(&self, currency: &str) -> String {
        match self {
            Self::DailyBudget { per_day, .. } => {
                format!("You can spend {currency}{per_day:.0} per day for the rest of the month")
            }
            Self::SlowDown { .. } => {
                "You're spending faster than expected. Try to slow down!".to_string()
            }
            Self::GoodPace { .. } => "Great job! You're spending at a good pace 👍".to_string(),
        }
    }
}

/// Spending tips for the month containing `today`.
///
/// The daily budget tip only appears while `50 <= percentage < 80`. On the last day of
/// the month the remaining budget is spread over that one day.
#[must_use]
pub fn recommendations(budget: f64, spent: f64, today: NaiveDate) -> Vec<Tip> {
    let mut tips = Vec::new();
    let Some(percentage) = budget_percentage(budget, spent) else {
        return tips;
    };

    let days_in_month = days_in_month(today.year(), today.month());
    let current_day = today.day();

    if (50.0..80.0).contains(&percentage) {
        let days_remaining = days_in_month.saturating_sub(current_day).max(1);
        tips.push(Tip::DailyBudget {
            per_day: (budget - spent) / f64::from(days_remaining),
            days_remaining,
        });
    }

    if days_in_month > 0 {
        let expected = f64::from(current_day) / f64::from(days_in_month) * 100.0;
        if percentage > expected + 10.0 {
            tips.push(Tip::SlowDown {
                percentage,
                expected,
            });
        } else if percentage < expected - 10.0 {
            tips.push(Tip::GoodPace {
                percentage,
                expected,
            });
        }
    }

    tips
}

/// Default minutes between two surfacings of the same alert kind for a user.
pub const DEFAULT_ALERT_COOLDOWN_MINUTES: i64 = 60;

/// Remembers when each (user, alert kind) was last surfaced.
#[derive(Debug, Clone)]
pub struct AlertThrottle {
    cooldown: TimeDelta,
    last_shown: HashMap<(String, AlertKind), DateTime<Utc>>,
}

impl Default for AlertThrottle {
    fn default() -> Self {
        Self::new(TimeDelta::minutes(DEFAULT_ALERT_COOLDOWN_MINUTES))
    }
}

impl AlertThrottle {
    /// Creates a throttle with the given cooldown.
    #[must_use]
    pub fn new(cooldown: TimeDelta) -> Self {
        Self {
            cooldown,
            last_shown: HashMap::new(),
        }
    }

    /// The configured cooldown.
    #[must_use]
    pub const fn cooldown(&self) -> TimeDelta {
        self.cooldown
    }

    /// Returns true (and records `now`) when the alert may be shown to the user.
    /// Returns false while the previous surfacing is still inside the cooldown.
    pub fn should_surface(&mut self, user_id: &str, kind: AlertKind, now: DateTime<Utc>) -> bool {
        let key = (user_id.to_string(), kind);
        if let Some(previous) = self.last_shown.get(&key) {
            if now - *previous < self.cooldown {
                return false;
            }
        }
        self.last_shown.insert(key, now);
        true
    }

    /// Filters `alerts` down to the ones that may be shown now.
    pub fn filter(
        &mut self,
        user_id: &str,
        alerts: Vec<AlertEvent>,
        now: DateTime<Utc>,
    ) -> Vec<AlertEvent> {
        alerts
            .into_iter()
            .filter(|alert| self.should_surface(user_id, alert.kind(), now))
            .collect()
    }

    /// When the alert kind was last surfaced for the user.
    #[must_use]
    pub fn last_shown(&self, user_id: &str, kind: AlertKind) -> Option<DateTime<Utc>> {
        self.last_shown.get(&(user_id.to_string(), kind)).copied()
    }

    /// Forgets everything recorded for one user.
    pub fn reset_user(&mut self, user_id: &str) {
        self.last_shown.retain(|(user, _), _| user != user_id);
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.last_shown.clear();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::TimeZone;

    fn no_daily_limit() -> AlertSettings {
        AlertSettings::default()
    }

    #[test]
    fn test_eighty_percent_emits_single_warning() {
        let alerts = evaluate(1000.0, 800.0, 0.0, &no_daily_limit());
        assert_eq!(alerts.len(), 1);
        match &alerts[0] {
            AlertEvent::Warning80 {
                remaining,
                percentage,
                ..
            } => {
                assert_eq!(*remaining, 200.0);
                assert_eq!(*percentage, 80.0);
            }
            other => panic!("unexpected alert {other:?}"),
        }
    }

    #[test]
    fn test_just_below_eighty_percent_emits_nothing() {
        assert!(evaluate(1000.0, 799.99, 0.0, &no_daily_limit()).is_empty());
    }

    #[test]
    fn test_hundred_percent_emits_danger_only() {
        let alerts = evaluate(1000.0, 1000.0, 0.0, &no_daily_limit());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind(), AlertKind::Danger100);
        if let AlertEvent::Danger100 { overspent, .. } = alerts[0] {
            assert_eq!(overspent, 0.0);
        }
    }

    #[test]
    fn test_zero_budget_skips_threshold_checks() {
        let settings = AlertSettings::default();
        assert!(evaluate(0.0, 500.0, 0.0, &settings).is_empty());
        assert!(evaluate(-10.0, 500.0, 0.0, &settings).is_empty());
    }

    #[test]
    fn test_zero_budget_still_checks_daily_limit() {
        let settings = AlertSettings {
            daily_limit: 100.0,
            ..AlertSettings::default()
        };
        let alerts = evaluate(0.0, 500.0, 150.0, &settings);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind(), AlertKind::DailyLimit);
    }

    #[test]
    fn test_disabled_settings_emit_nothing() {
        let settings = AlertSettings {
            enabled: false,
            daily_limit: 10.0,
            ..AlertSettings::default()
        };
        assert!(evaluate(1000.0, 5000.0, 500.0, &settings).is_empty());
    }

    #[test]
    fn test_individual_thresholds_can_be_turned_off() {
        let settings = AlertSettings {
            threshold_80: false,
            threshold_100: false,
            ..AlertSettings::default()
        };
        assert!(evaluate(1000.0, 900.0, 0.0, &settings).is_empty());
        assert!(evaluate(1000.0, 1200.0, 0.0, &settings).is_empty());
    }

    #[test]
    fn test_daily_limit_fires_alongside_monthly_alert() {
        let settings = AlertSettings {
            daily_limit: 200.0,
            ..AlertSettings::default()
        };
        let alerts = evaluate(1000.0, 1100.0, 250.0, &settings);
        let kinds: Vec<AlertKind> = alerts.iter().map(AlertEvent::kind).collect();
        assert_eq!(kinds, vec![AlertKind::Danger100, AlertKind::DailyLimit]);
        if let AlertEvent::DailyLimit { overspent, .. } = alerts[1] {
            assert_eq!(overspent, 50.0);
        }
    }

    #[test]
    fn test_daily_limit_equal_to_spent_does_not_fire() {
        let settings = AlertSettings {
            daily_limit: 200.0,
            ..AlertSettings::default()
        };
        assert!(evaluate(1000.0, 100.0, 200.0, &settings).is_empty());
    }

    #[test]
    fn test_category_exceeded() {
        let alert = evaluate_category(200.0, 250.0, "Food").unwrap();
        assert_eq!(alert.kind(), AlertKind::CategoryExceeded);
        assert_eq!(alert.category(), Some("Food"));
        if let AlertEvent::CategoryExceeded { percentage, .. } = alert {
            assert_eq!(percentage, 125.0);
        }
    }

    #[test]
    fn test_category_warning_and_quiet_cases() {
        let warning = evaluate_category(200.0, 170.0, "Transport").unwrap();
        assert_eq!(warning.kind(), AlertKind::CategoryWarning);
        assert!(evaluate_category(200.0, 100.0, "Transport").is_none());
        assert!(evaluate_category(0.0, 100.0, "Transport").is_none());
    }

    #[test]
    fn test_alert_messages_use_currency() {
        let alert = evaluate(1000.0, 1250.0, 0.0, &no_daily_limit()).remove(0);
        assert_eq!(
            alert.message("₹"),
            "You've exceeded your monthly budget by ₹250!"
        );
        assert_eq!(alert.title(), "🚨 Budget Exceeded!");
    }

    #[test]
    fn test_daily_budget_tip_in_fifty_to_eighty_band() {
        // April has 30 days, 20 days left after the 10th
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let tips = recommendations(1000.0, 600.0, today);
        assert!(tips.contains(&Tip::DailyBudget {
            per_day: 20.0,
            days_remaining: 20,
        }));
    }

    #[test]
    fn test_no_daily_budget_tip_outside_band() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let tips = recommendations(1000.0, 300.0, today);
        assert!(!tips.iter().any(|t| matches!(t, Tip::DailyBudget { .. })));
    }

    #[test]
    fn test_last_day_of_month_divides_by_one_day() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        let tips = recommendations(1000.0, 700.0, today);
        assert!(tips.contains(&Tip::DailyBudget {
            per_day: 300.0,
            days_remaining: 1,
        }));
    }

    #[test]
    fn test_pace_tips() {
        // Day 15 of 30 = 50% expected
        let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();

        let fast = recommendations(1000.0, 700.0, today);
        assert!(fast.iter().any(|t| matches!(t, Tip::SlowDown { .. })));

        let slow = recommendations(1000.0, 300.0, today);
        assert!(slow.iter().any(|t| matches!(t, Tip::GoodPace { .. })));

        let on_pace = recommendations(1000.0, 550.0, today);
        assert!(
            !on_pace
                .iter()
                .any(|t| matches!(t, Tip::SlowDown { .. } | Tip::GoodPace { .. }))
        );
    }

    #[test]
    fn test_recommendations_empty_without_budget() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        assert!(recommendations(0.0, 300.0, today).is_empty());
    }

    #[test]
    fn test_throttle_suppresses_within_cooldown() {
        let mut throttle = AlertThrottle::default();
        let start = Utc.with_ymd_and_hms(2025, 4, 15, 10, 0, 0).unwrap();

        assert!(throttle.should_surface("u1", AlertKind::Warning80, start));
        assert!(!throttle.should_surface(
            "u1",
            AlertKind::Warning80,
            start + TimeDelta::minutes(59)
        ));
        // Other kinds and other users are tracked separately
        assert!(throttle.should_surface("u1", AlertKind::DailyLimit, start));
        assert!(throttle.should_surface("u2", AlertKind::Warning80, start));
        assert!(throttle.should_surface(
            "u1",
            AlertKind::Warning80,
            start + TimeDelta::hours(1)
        ));
        assert_eq!(
            throttle.last_shown("u1", AlertKind::Warning80),
            Some(start + TimeDelta::hours(1))
        );
    }

    #[test]
    fn test_throttle_reset_and_filter() {
        let mut throttle = AlertThrottle::new(TimeDelta::minutes(30));
        let now = Utc.with_ymd_and_hms(2025, 4, 15, 10, 0, 0).unwrap();
        let alerts = evaluate(1000.0, 900.0, 0.0, &AlertSettings::default());

        assert_eq!(throttle.filter("u1", alerts.clone(), now).len(), 1);
        assert!(throttle.filter("u1", alerts.clone(), now).is_empty());

        throttle.reset_user("u1");
        assert!(throttle.last_shown("u1", AlertKind::Warning80).is_none());
        assert_eq!(throttle.filter("u1", alerts, now).len(), 1);

        throttle.clear();
        assert!(throttle.last_shown("u1", AlertKind::Warning80).is_none());
    }
}
