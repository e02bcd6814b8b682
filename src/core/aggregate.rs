//! Aggregation over dated monetary records.
//!
//! Pure functions that turn a list of [`MonetaryRecord`]s into totals over a time
//! [`Window`], per-key breakdowns, and zero-filled calendar month buckets. Nothing
//! here touches the database; callers pass the already-fetched records.

use crate::core::record::{MonetaryRecord, PaymentMethod};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::collections::HashMap;
use std::hash::Hash;

/// A time interval used to filter records. The start is always inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First instant inside the window
    pub start: NaiveDateTime,
    /// Last instant (inclusive) or first instant past the window (exclusive)
    pub end: NaiveDateTime,
    /// Whether `end` itself belongs to the window
    pub end_inclusive: bool,
}

impl Window {
    /// `[start, end)`
    #[must_use]
    pub const fn half_open(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            end_inclusive: false,
        }
    }

    /// `[start, end]`
    #[must_use]
    pub const fn closed(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            end_inclusive: true,
        }
    }

    /// The calendar day containing `now`: `[00:00:00, next day 00:00:00)`.
    #[must_use]
    pub fn today(now: NaiveDateTime) -> Self {
        let start = now.date().and_time(NaiveTime::MIN);
        Self::half_open(start, start + TimeDelta::days(1))
    }

    /// The trailing `days` × 24h ending at `now` (inclusive). Not calendar aligned.
    #[must_use]
    pub fn trailing_days(now: NaiveDateTime, days: i64) -> Self {
        Self::closed(now - TimeDelta::days(days), now)
    }

    /// The `days`-long window immediately before [`Window::trailing_days`].
    #[must_use]
    pub fn previous_trailing_days(now: NaiveDateTime, days: i64) -> Self {
        Self::half_open(now - TimeDelta::days(days * 2), now - TimeDelta::days(days))
    }

    /// From day 1 00:00:00 of the month containing `now` up to `now` (inclusive).
    #[must_use]
    pub fn month_to_date(now: NaiveDateTime) -> Self {
        let first = now.date().with_day(1).unwrap_or(now.date());
        Self::closed(first.and_time(NaiveTime::MIN), now)
    }

    /// A whole calendar month, ending at 23:59:59 of its last day.
    /// Returns `None` for an invalid month.
    #[must_use]
    pub fn calendar_month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
        Self::through_end_of_day(first, last)
    }

    /// From `from` 00:00:00 through `to` 23:59:59 inclusive, the convention for "to" dates.
    #[must_use]
    pub fn through_end_of_day(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        Some(Self::closed(
            from.and_time(NaiveTime::MIN),
            to.and_hms_opt(23, 59, 59)?,
        ))
    }

    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start
            && if self.end_inclusive {
                instant <= self.end
            } else {
                instant < self.end
            }
    }
}

/// Number of days in the given month, or 0 for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next_first) {
        (Some(first), Some(next_first)) => {
            u32::try_from(next_first.signed_duration_since(first).num_days()).unwrap_or(0)
        }
        _ => 0,
    }
}

/// Records of `records` that fall inside `window`.
#[must_use]
pub fn records_in<'a>(records: &'a [MonetaryRecord], window: &Window) -> Vec<&'a MonetaryRecord> {
    records.iter().filter(|r| window.contains(r.date)).collect()
}

/// Arithmetic sum of `amount` over the given records. Empty input sums to 0.
pub fn total<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
{
    records.into_iter().map(|r| r.amount).sum()
}

/// Sum of `amount` for exactly the records inside `window`.
#[must_use]
pub fn sum_in_window(records: &[MonetaryRecord], window: &Window) -> f64 {
    total(records.iter().filter(|r| window.contains(r.date)))
}

/// Sums amounts per key. The map is unordered; renderers sort.
pub fn group_by_key<'a, I, K, F>(records: I, key_fn: F) -> HashMap<K, f64>
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
    K: Eq + Hash,
    F: Fn(&MonetaryRecord) -> K,
{
    let mut totals = HashMap::new();
    for record in records {
        *totals.entry(key_fn(record)).or_insert(0.0) += record.amount;
    }
    totals
}

/// Sums amounts per category (or income source).
pub fn group_by_category<'a, I>(records: I) -> HashMap<String, f64>
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
{
    group_by_key(records, |r| r.category.clone())
}

/// Sums expense amounts per payment method. Records without one are skipped.
pub fn group_by_payment_method<'a, I>(records: I) -> HashMap<PaymentMethod, f64>
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
{
    let mut totals = HashMap::new();
    for record in records {
        if let Some(method) = record.payment_method {
            *totals.entry(method).or_insert(0.0) += record.amount;
        }
    }
    totals
}

/// Total for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Sum of the records dated in this month
    pub total: f64,
}

impl MonthBucket {
    /// Short label such as `"Mar 2025"`.
    #[must_use]
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).map_or_else(
            || format!("{}-{:02}", self.year, self.month),
            |date| date.format("%b %Y").to_string(),
        )
    }
}

/// Per-category totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMonthBucket {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Category totals for the month; categories with no spending are absent
    pub totals: HashMap<String, f64>,
}

/// `(year, month)` pairs for the trailing `month_count` months ending at `today`'s month,
/// oldest first.
#[must_use]
pub fn trailing_months(today: NaiveDate, month_count: u32) -> Vec<(i32, u32)> {
    let current = today.year() * 12 + i32::try_from(today.month0()).unwrap_or(0);
    let count = i32::try_from(month_count).unwrap_or(i32::MAX);

    (0..count)
        .rev()
        .map(|back| {
            let index = current - back;
            let month0 = u32::try_from(index.rem_euclid(12)).unwrap_or(0);
            (index.div_euclid(12), month0 + 1)
        })
        .collect()
}

/// Buckets records into the trailing `month_count` calendar months ending at the
/// current month. Every month appears, initialised to zero; records dated outside
/// all buckets are silently dropped.
#[must_use]
pub fn bucket_by_calendar_month(
    records: &[MonetaryRecord],
    month_count: u32,
    today: NaiveDate,
) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = trailing_months(today, month_count)
        .into_iter()
        .map(|(year, month)| MonthBucket {
            year,
            month,
            total: 0.0,
        })
        .collect();

    for record in records {
        let (year, month) = (record.date.year(), record.date.month());
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.year == year && b.month == month)
        {
            bucket.total += record.amount;
        }
    }

    buckets
}

/// Like [`bucket_by_calendar_month`] but keeps a category breakdown per month.
#[must_use]
pub fn bucket_categories_by_month(
    records: &[MonetaryRecord],
    month_count: u32,
    today: NaiveDate,
) -> Vec<CategoryMonthBucket> {
    let mut buckets: Vec<CategoryMonthBucket> = trailing_months(today, month_count)
        .into_iter()
        .map(|(year, month)| CategoryMonthBucket {
            year,
            month,
            totals: HashMap::new(),
        })
        .collect();

    for record in records {
        let (year, month) = (record.date.year(), record.date.month());
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| b.year == year && b.month == month)
        {
            *bucket.totals.entry(record.category.clone()).or_insert(0.0) += record.amount;
        }
    }

    buckets
}

/// Multi-month spending overview.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    /// Zero-filled month buckets, oldest first
    pub months: Vec<MonthBucket>,
    /// Sum over all buckets
    pub total: f64,
    /// `total` divided by the number of months
    pub monthly_average: f64,
    /// Month with the highest total (earliest wins ties)
    pub highest_month: Option<MonthBucket>,
    /// Month with the lowest total (earliest wins ties)
    pub lowest_month: Option<MonthBucket>,
    /// Category with the highest total and its amount
    pub top_category: Option<(String, f64)>,
    /// Expense totals per payment method, largest first
    pub payment_methods: Vec<(PaymentMethod, f64)>,
    /// Number of records that fell into a bucket
    pub transaction_count: usize,
}

/// Summarises the trailing `month_count` months of spending.
#[must_use]
pub fn summarize_spending(
    records: &[MonetaryRecord],
    month_count: u32,
    today: NaiveDate,
) -> SpendingSummary {
    let months = bucket_by_calendar_month(records, month_count, today);
    let in_range: Vec<&MonetaryRecord> = records
        .iter()
        .filter(|r| {
            months
                .iter()
                .any(|b| b.year == r.date.year() && b.month == r.date.month())
        })
        .collect();

    let total_spent = total(in_range.iter().copied());
    #[allow(clippy::cast_precision_loss)] // Month counts are tiny
    let monthly_average = if months.is_empty() {
        0.0
    } else {
        total_spent / months.len() as f64
    };

    let highest_month = months
        .iter()
        .fold(None::<&MonthBucket>, |best, b| match best {
            Some(current) if b.total <= current.total => Some(current),
            _ => Some(b),
        })
        .cloned();
    let lowest_month = months
        .iter()
        .fold(None::<&MonthBucket>, |best, b| match best {
            Some(current) if b.total >= current.total => Some(current),
            _ => Some(b),
        })
        .cloned();

    let top_category = group_by_category(in_range.iter().copied())
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

    let mut payment_methods: Vec<(PaymentMethod, f64)> =
        group_by_payment_method(in_range.iter().copied())
            .into_iter()
            .collect();
    payment_methods.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.0.as_str().cmp(b.0.as_str()))
    });

    SpendingSummary {
        transaction_count: in_range.len(),
        months,
        total: total_spent,
        monthly_average,
        highest_month,
        lowest_month,
        top_category,
        payment_methods,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn expense(amount: f64, category: &str, date: NaiveDateTime) -> MonetaryRecord {
        MonetaryRecord::expense(amount, category, date, PaymentMethod::Cash)
    }

    #[test]
    fn test_sum_in_window_empty_is_zero() {
        let window = Window::today(at(2025, 3, 10, 12, 0, 0));
        assert_eq!(sum_in_window(&[], &window), 0.0);
    }

    #[test]
    fn test_half_open_window_includes_start_excludes_end() {
        let start = at(2025, 3, 10, 0, 0, 0);
        let end = at(2025, 3, 11, 0, 0, 0);
        let window = Window::half_open(start, end);
        let records = vec![
            expense(10.0, "Food", start),
            expense(20.0, "Food", end),
            expense(40.0, "Food", at(2025, 3, 10, 23, 59, 59)),
        ];

        assert_eq!(sum_in_window(&records, &window), 50.0);
    }

    #[test]
    fn test_end_of_day_window_includes_last_second() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let window = Window::through_end_of_day(from, to).unwrap();
        let records = vec![
            expense(5.0, "Food", at(2025, 3, 5, 23, 59, 59)),
            expense(7.0, "Food", at(2025, 3, 6, 0, 0, 0)),
            expense(11.0, "Food", at(2025, 3, 1, 0, 0, 0)),
        ];

        assert_eq!(sum_in_window(&records, &window), 16.0);
    }

    #[test]
    fn test_today_window_is_calendar_day() {
        let now = at(2025, 3, 10, 21, 0, 0);
        let window = Window::today(now);
        assert!(window.contains(at(2025, 3, 10, 0, 0, 0)));
        assert!(window.contains(at(2025, 3, 10, 23, 30, 0)));
        assert!(!window.contains(at(2025, 3, 9, 23, 59, 59)));
        assert!(!window.contains(at(2025, 3, 11, 0, 0, 0)));
    }

    #[test]
    fn test_trailing_week_is_not_calendar_aligned() {
        let now = at(2025, 3, 12, 21, 0, 0);
        let week = Window::trailing_days(now, 7);
        let previous = Window::previous_trailing_days(now, 7);

        assert!(week.contains(at(2025, 3, 5, 21, 0, 0)));
        assert!(!week.contains(at(2025, 3, 5, 20, 59, 59)));
        assert!(week.contains(now));
        assert!(previous.contains(at(2025, 3, 5, 20, 59, 59)));
        assert!(!previous.contains(at(2025, 3, 5, 21, 0, 0)));
        assert!(previous.contains(at(2025, 2, 26, 21, 0, 0)));
    }

    #[test]
    fn test_month_to_date_starts_on_day_one() {
        let now = at(2025, 3, 12, 9, 0, 0);
        let window = Window::month_to_date(now);
        assert_eq!(window.start, at(2025, 3, 1, 0, 0, 0));
        assert!(!window.contains(at(2025, 2, 28, 23, 59, 59)));
        assert!(window.contains(now));
    }

    #[test]
    fn test_calendar_month_handles_february_and_invalid_month() {
        let window = Window::calendar_month(2024, 2).unwrap();
        assert_eq!(window.end, at(2024, 2, 29, 23, 59, 59));
        assert!(Window::calendar_month(2024, 13).is_none());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2025, 1), 31);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 0), 0);
    }

    #[test]
    fn test_group_by_key_conserves_total() {
        let now = at(2025, 3, 10, 12, 0, 0);
        let records = vec![
            expense(12.5, "Food", now),
            expense(30.0, "Transport", now),
            expense(7.5, "Food", now),
            expense(50.0, "Bills", now),
        ];
        let window = Window::today(now);

        let grouped = group_by_category(records_in(&records, &window));
        let grouped_total: f64 = grouped.values().sum();

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped["Food"], 20.0);
        assert_eq!(grouped_total, sum_in_window(&records, &window));
    }

    #[test]
    fn test_group_by_payment_method_skips_income() {
        let now = at(2025, 3, 10, 12, 0, 0);
        let records = vec![
            MonetaryRecord::expense(10.0, "Food", now, PaymentMethod::Upi),
            MonetaryRecord::expense(15.0, "Food", now, PaymentMethod::Upi),
            MonetaryRecord::expense(5.0, "Food", now, PaymentMethod::Card),
            MonetaryRecord::income(1000.0, "Salary", now),
        ];

        let grouped = group_by_payment_method(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&PaymentMethod::Upi], 25.0);
        assert_eq!(grouped[&PaymentMethod::Card], 5.0);
    }

    #[test]
    fn test_bucket_by_calendar_month_zero_fills_and_wraps_year() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let records = vec![
            expense(100.0, "Food", at(2024, 11, 3, 10, 0, 0)),
            expense(50.0, "Food", at(2025, 1, 2, 10, 0, 0)),
            expense(25.0, "Food", at(2025, 1, 14, 10, 0, 0)),
            // Outside every bucket
            expense(999.0, "Food", at(2024, 10, 31, 23, 59, 59)),
            expense(999.0, "Food", at(2025, 2, 1, 0, 0, 0)),
        ];

        let buckets = bucket_by_calendar_month(&records, 3, today);

        assert_eq!(
            buckets
                .iter()
                .map(|b| (b.year, b.month, b.total))
                .collect::<Vec<_>>(),
            vec![(2024, 11, 100.0), (2024, 12, 0.0), (2025, 1, 75.0)]
        );
        assert_eq!(buckets[0].label(), "Nov 2024");
    }

    #[test]
    fn test_bucket_categories_by_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let records = vec![
            expense(10.0, "Food", at(2025, 2, 3, 10, 0, 0)),
            expense(20.0, "Bills", at(2025, 3, 2, 10, 0, 0)),
            expense(5.0, "Food", at(2025, 3, 4, 10, 0, 0)),
        ];

        let buckets = bucket_categories_by_month(&records, 2, today);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].totals.get("Food"), Some(&10.0));
        assert_eq!(buckets[1].totals.get("Bills"), Some(&20.0));
        assert_eq!(buckets[1].totals.get("Food"), Some(&5.0));
    }

    #[test]
    fn test_summarize_spending() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let records = vec![
            expense(300.0, "Food", at(2025, 1, 3, 10, 0, 0)),
            expense(100.0, "Bills", at(2025, 3, 2, 10, 0, 0)),
            expense(50.0, "Food", at(2025, 3, 4, 10, 0, 0)),
            expense(1000.0, "Travel", at(2024, 6, 1, 10, 0, 0)),
        ];

        let summary = summarize_spending(&records, 3, today);

        assert_eq!(summary.total, 450.0);
        assert_eq!(summary.monthly_average, 150.0);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.highest_month.unwrap().month, 1);
        assert_eq!(summary.lowest_month.unwrap().month, 2);
        assert_eq!(summary.top_category, Some(("Food".to_string(), 350.0)));
        assert_eq!(summary.payment_methods, vec![(PaymentMethod::Cash, 450.0)]);
    }

    #[test]
    fn test_summarize_spending_ranks_payment_methods() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let records = vec![
            MonetaryRecord::expense(40.0, "Food", at(2025, 3, 1, 9, 0, 0), PaymentMethod::Cash),
            MonetaryRecord::expense(250.0, "Bills", at(2025, 3, 2, 9, 0, 0), PaymentMethod::Upi),
            MonetaryRecord::expense(60.0, "Food", at(2025, 2, 3, 9, 0, 0), PaymentMethod::Upi),
            // Outside the two-month range
            MonetaryRecord::expense(500.0, "Food", at(2024, 12, 3, 9, 0, 0), PaymentMethod::Card),
        ];

        let summary = summarize_spending(&records, 2, today);

        assert_eq!(
            summary.payment_methods,
            vec![(PaymentMethod::Upi, 310.0), (PaymentMethod::Cash, 40.0)]
        );
    }

    #[test]
    fn test_summarize_spending_with_no_months() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let summary = summarize_spending(&[], 0, today);
        assert_eq!(summary.monthly_average, 0.0);
        assert!(summary.highest_month.is_none());
        assert!(summary.top_category.is_none());
        assert!(summary.payment_methods.is_empty());
    }
}
