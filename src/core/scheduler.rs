//! Scheduled report delivery.
//!
//! Each [`Cadence`] runs as its own task that waits on a [`ScheduleTrigger`] and
//! then hands the firing time to the [`ReportPipeline`]. The pipeline processes
//! subscribers one at a time, each under a timeout, so a failing or slow user is
//! logged and skipped without affecting the others. Missed firings are not retried.

use crate::{
    core::{
        alerts::AlertThrottle,
        notify::{Notification, Notifier},
        report::{self, ReportPayload},
        store::RecordStore,
        users::{NotificationFlag, Subscriber},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Utc};
use cron::Schedule;
use serde::Serialize;
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time,
};
use tracing::{debug, error, info, instrument, warn};

/// A recurring schedule on which notifications are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Cadence {
    /// Daily report and budget alert check
    Daily,
    /// Weekly report
    Weekly,
    /// Monthly report
    Monthly,
    /// Weekly friend payment reminder
    FriendReminder,
}

impl Cadence {
    /// Every cadence.
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::FriendReminder];

    /// The subscription flag that selects recipients.
    #[must_use]
    pub const fn flag(self) -> NotificationFlag {
        match self {
            Self::Daily => NotificationFlag::DailyReport,
            Self::Weekly => NotificationFlag::WeeklyReport,
            Self::Monthly => NotificationFlag::MonthlyReport,
            Self::FriendReminder => NotificationFlag::FriendReminders,
        }
    }

    /// Lowercase name used in logs and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::FriendReminder => "friend_reminder",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of what happened during one firing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FiringSummary {
    /// Users who were sent something
    pub delivered: usize,
    /// Users with nothing to send
    pub skipped: usize,
    /// Users whose processing failed or timed out
    pub failed: usize,
}

impl FiringSummary {
    fn merge(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

enum UserOutcome {
    Delivered,
    Skipped,
}

/// Source of cadence firings.
///
/// `next_firing` waits until the cadence is due and returns the local time it
/// fired at, or `None` when the cadence will never fire again.
#[async_trait]
pub trait ScheduleTrigger: Send + Sync {
    /// Waits for the next firing of `cadence`.
    async fn next_firing(&self, cadence: Cadence) -> Option<NaiveDateTime>;
}

/// Parses a seven-field cron expression.
pub fn parse_schedule(expression: &str) -> Result<Schedule> {
    Schedule::from_str(expression.trim()).map_err(|e| Error::Schedule {
        message: format!("invalid cron expression '{expression}': {e}"),
    })
}

/// [`ScheduleTrigger`] driven by cron expressions in server local time.
#[derive(Debug, Clone)]
pub struct CronTrigger {
    schedules: HashMap<Cadence, Schedule>,
}

impl CronTrigger {
    /// Builds a trigger from one expression per cadence.
    ///
    /// Cadences without an expression never fire.
    pub fn new<'a, I>(expressions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Cadence, &'a str)>,
    {
        let schedules = expressions
            .into_iter()
            .map(|(cadence, expression)| Ok((cadence, parse_schedule(expression)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { schedules })
    }

    /// The first firing of `cadence` strictly after `after`.
    #[must_use]
    pub fn next_after(&self, cadence: Cadence, after: DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedules.get(&cadence)?.after(&after).next()
    }
}

#[async_trait]
impl ScheduleTrigger for CronTrigger {
    async fn next_firing(&self, cadence: Cadence) -> Option<NaiveDateTime> {
        let next = self.next_after(cadence, Local::now())?;
        let wait = (next - Local::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(%cadence, next = %next, "Waiting for next firing");
        time::sleep(wait).await;
        Some(next.naive_local())
    }
}

/// Runtime options for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Limit on fetching, building and delivering for one user
    pub per_user_timeout: Duration,
    /// Currency symbol used in alert log messages
    pub currency_symbol: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            per_user_timeout: Duration::from_secs(30),
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Fetches records, builds the matching report and delivers it, per subscriber.
pub struct ReportPipeline {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    throttle: Arc<Mutex<AlertThrottle>>,
    options: PipelineOptions,
}

impl ReportPipeline {
    /// Creates a pipeline. The throttle is shared with interactive commands so
    /// an alert shown in one place is not repeated in the other.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        throttle: Arc<Mutex<AlertThrottle>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            notifier,
            throttle,
            options,
        }
    }

    /// Runs one firing of `cadence` at local time `now`.
    ///
    /// Never fails: per-user errors are logged and counted in the summary.
    #[instrument(skip(self))]
    pub async fn run_cadence(&self, cadence: Cadence, now: NaiveDateTime) -> FiringSummary {
        let mut summary = self.run_for_flag(cadence, cadence.flag(), now).await;
        if cadence == Cadence::Daily {
            summary.merge(
                self.run_for_flag(cadence, NotificationFlag::BudgetAlerts, now)
                    .await,
            );
        }

        info!(
            %cadence,
            delivered = summary.delivered,
            skipped = summary.skipped,
            failed = summary.failed,
            "Cadence firing complete"
        );
        summary
    }

    async fn run_for_flag(
        &self,
        cadence: Cadence,
        flag: NotificationFlag,
        now: NaiveDateTime,
    ) -> FiringSummary {
        let mut summary = FiringSummary::default();

        let subscribers = match self.store.list_subscribed_users(flag).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                error!(%cadence, ?flag, "Failed to list subscribed users: {}", e);
                return summary;
            }
        };

        for subscriber in &subscribers {
            let work = self.process_user(cadence, flag, subscriber, now);
            let outcome = match time::timeout(self.options.per_user_timeout, work).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    seconds: self.options.per_user_timeout.as_secs(),
                }),
            };

            match outcome {
                Ok(UserOutcome::Delivered) => summary.delivered += 1,
                Ok(UserOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    error!(%cadence, ?flag, user_id = %subscriber.id, "Scheduled notification failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    async fn process_user(
        &self,
        cadence: Cadence,
        flag: NotificationFlag,
        subscriber: &Subscriber,
        now: NaiveDateTime,
    ) -> Result<UserOutcome> {
        match (cadence, flag) {
            (_, NotificationFlag::BudgetAlerts) => self.check_budget_alerts(subscriber, now).await,
            (Cadence::FriendReminder, _) => self.send_friend_reminder(subscriber, now).await,
            _ => self.send_report(cadence, subscriber, now).await,
        }
    }

    async fn overall_budget(&self, user_id: &str, now: NaiveDateTime) -> Result<f64> {
        Ok(self
            .store
            .get_budget(user_id, now.month(), now.year())
            .await?
            .map_or(0.0, |budget| budget.amount))
    }

    async fn send_report(
        &self,
        cadence: Cadence,
        subscriber: &Subscriber,
        now: NaiveDateTime,
    ) -> Result<UserOutcome> {
        let expenses = self.store.list_expenses(&subscriber.id).await?;
        let income = self.store.list_income(&subscriber.id).await?;

        let payload = match cadence {
            Cadence::Daily => {
                let budget = self.overall_budget(&subscriber.id, now).await?;
                ReportPayload::Daily(report::build_daily(&expenses, &income, budget, now))
            }
            Cadence::Weekly => ReportPayload::Weekly(report::build_weekly(&expenses, &income, now)),
            Cadence::Monthly => {
                let budget = self.overall_budget(&subscriber.id, now).await?;
                ReportPayload::Monthly(report::build_monthly(&expenses, &income, budget, now))
            }
            Cadence::FriendReminder => return Ok(UserOutcome::Skipped),
        };

        self.notifier
            .deliver(&subscriber.destination, &Notification::Report(payload))
            .await?;
        debug!(%cadence, user_id = %subscriber.id, "Report delivered");
        Ok(UserOutcome::Delivered)
    }

    async fn send_friend_reminder(
        &self,
        subscriber: &Subscriber,
        now: NaiveDateTime,
    ) -> Result<UserOutcome> {
        let friends = self.store.list_friends(&subscriber.id).await?;
        let owing = report::friends_owing(&friends);
        if owing.is_empty() {
            return Ok(UserOutcome::Skipped);
        }

        self.notifier
            .deliver(&subscriber.destination, &Notification::FriendReminder(owing))
            .await?;
        self.store
            .mark_friends_reminded(&subscriber.id, local_to_utc(now))
            .await?;
        Ok(UserOutcome::Delivered)
    }

    async fn check_budget_alerts(
        &self,
        subscriber: &Subscriber,
        now: NaiveDateTime,
    ) -> Result<UserOutcome> {
        let (month, year) = (now.month(), now.year());
        let Some(overall) = self.store.get_budget(&subscriber.id, month, year).await? else {
            return Ok(UserOutcome::Skipped);
        };
        let category_budgets = self
            .store
            .list_category_budgets(&subscriber.id, month, year)
            .await?;
        let expenses = self.store.list_expenses(&subscriber.id).await?;

        let status = report::build_budget_status(&expenses, Some(&overall), &category_budgets, now);
        let fired_at = local_to_utc(now);
        let alerts = self
            .throttle
            .lock()
            .await
            .filter(&subscriber.id, status.alerts, fired_at);
        if alerts.is_empty() {
            return Ok(UserOutcome::Skipped);
        }

        for alert in alerts {
            self.store
                .record_alert(
                    &subscriber.id,
                    &alert,
                    &self.options.currency_symbol,
                    fired_at,
                )
                .await?;
            self.notifier
                .deliver(&subscriber.destination, &Notification::BudgetAlert(alert))
                .await?;
        }
        Ok(UserOutcome::Delivered)
    }
}

/// Converts a local wall-clock time to UTC, taking the earlier instant when the
/// local time is ambiguous.
fn local_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
}

struct RunningTasks {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

/// Owns one background task per cadence.
///
/// `start` and `stop` are idempotent. Stopping lets an in-progress firing finish
/// and cancels every pending wait, so no firing is ever cut short.
pub struct Scheduler {
    pipeline: Arc<ReportPipeline>,
    trigger: Arc<dyn ScheduleTrigger>,
    running: Option<RunningTasks>,
}

impl Scheduler {
    /// Creates a stopped scheduler.
    #[must_use]
    pub fn new(pipeline: Arc<ReportPipeline>, trigger: Arc<dyn ScheduleTrigger>) -> Self {
        Self {
            pipeline,
            trigger,
            running: None,
        }
    }

    /// Whether the cadence tasks are running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Spawns the cadence tasks. Returns false if already running.
    pub fn start(&mut self) -> bool {
        if self.running.is_some() {
            debug!("Scheduler already running");
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handles = Cadence::ALL
            .into_iter()
            .map(|cadence| {
                tokio::spawn(run_cadence_loop(
                    cadence,
                    Arc::clone(&self.pipeline),
                    Arc::clone(&self.trigger),
                    shutdown_rx.clone(),
                ))
            })
            .collect();

        self.running = Some(RunningTasks { shutdown, handles });
        info!("Scheduler started");
        true
    }

    /// Stops every cadence task and waits for them to exit. Returns false if
    /// the scheduler was not running.
    pub async fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            debug!("Scheduler already stopped");
            return false;
        };

        // Receivers may already be gone if every trigger ended
        let _ = running.shutdown.send(true);
        for handle in running.handles {
            if let Err(e) = handle.await {
                warn!("Cadence task ended abnormally: {}", e);
            }
        }

        info!("Scheduler stopped");
        true
    }
}

async fn run_cadence_loop(
    cadence: Cadence,
    pipeline: Arc<ReportPipeline>,
    trigger: Arc<dyn ScheduleTrigger>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        let fired_at = tokio::select! {
            _ = shutdown.changed() => break,
            next = trigger.next_firing(cadence) => match next {
                Some(fired_at) => fired_at,
                None => {
                    debug!(%cadence, "Trigger has no further firings");
                    break;
                }
            },
        };

        pipeline.run_cadence(cadence, fired_at).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
    use super::*;
    use crate::core::{
        alerts::{AlertEvent, AlertKind, AlertSettings},
        budget::BudgetConfig,
        record::{FriendBalance, MonetaryRecord, PaymentMethod},
    };
    use chrono::{NaiveDate, TimeDelta};
    use sea_orm::DbErr;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[derive(Default)]
    struct FakeStore {
        subscribers: Vec<(Subscriber, Vec<NotificationFlag>)>,
        expenses: HashMap<String, Vec<MonetaryRecord>>,
        friends: HashMap<String, Vec<FriendBalance>>,
        budgets: HashMap<String, f64>,
        failing_users: HashSet<String>,
        recorded_alerts: StdMutex<Vec<(String, AlertKind)>>,
        reminded: StdMutex<Vec<String>>,
    }

    impl FakeStore {
        fn subscribe(&mut self, id: &str, flags: &[NotificationFlag]) {
            self.subscribers.push((
                Subscriber {
                    id: id.to_string(),
                    name: format!("User {id}"),
                    destination: format!("channel-{id}"),
                },
                flags.to_vec(),
            ));
        }

        fn check(&self, user_id: &str) -> Result<()> {
            if self.failing_users.contains(user_id) {
                Err(Error::Database(DbErr::Custom("store unavailable".to_string())))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn list_expenses(&self, user_id: &str) -> Result<Vec<MonetaryRecord>> {
            self.check(user_id)?;
            Ok(self.expenses.get(user_id).cloned().unwrap_or_default())
        }

        async fn list_income(&self, user_id: &str) -> Result<Vec<MonetaryRecord>> {
            self.check(user_id)?;
            Ok(Vec::new())
        }

        async fn list_friends(&self, user_id: &str) -> Result<Vec<FriendBalance>> {
            self.check(user_id)?;
            Ok(self.friends.get(user_id).cloned().unwrap_or_default())
        }

        async fn get_budget(
            &self,
            user_id: &str,
            month: u32,
            year: i32,
        ) -> Result<Option<BudgetConfig>> {
            self.check(user_id)?;
            Ok(self.budgets.get(user_id).map(|&amount| BudgetConfig {
                user_id: user_id.to_string(),
                category: crate::core::budget::OVERALL_CATEGORY.to_string(),
                month,
                year,
                amount,
                alert_settings: AlertSettings::default(),
            }))
        }

        async fn list_category_budgets(
            &self,
            user_id: &str,
            _month: u32,
            _year: i32,
        ) -> Result<Vec<BudgetConfig>> {
            self.check(user_id)?;
            Ok(Vec::new())
        }

        async fn upsert_budget(
            &self,
            user_id: &str,
            month: u32,
            year: i32,
            amount: f64,
            settings: AlertSettings,
        ) -> Result<BudgetConfig> {
            Ok(BudgetConfig {
                user_id: user_id.to_string(),
                category: crate::core::budget::OVERALL_CATEGORY.to_string(),
                month,
                year,
                amount,
                alert_settings: settings,
            })
        }

        async fn list_subscribed_users(&self, flag: NotificationFlag) -> Result<Vec<Subscriber>> {
            Ok(self
                .subscribers
                .iter()
                .filter(|(_, flags)| flags.contains(&flag))
                .map(|(subscriber, _)| subscriber.clone())
                .collect())
        }

        async fn record_alert(
            &self,
            user_id: &str,
            event: &AlertEvent,
            _currency: &str,
            _triggered_at: DateTime<Utc>,
        ) -> Result<()> {
            self.recorded_alerts
                .lock()
                .unwrap()
                .push((user_id.to_string(), event.kind()));
            Ok(())
        }

        async fn mark_friends_reminded(&self, user_id: &str, _sent_at: DateTime<Utc>) -> Result<()> {
            self.reminded.lock().unwrap().push(user_id.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        delivered: StdMutex<Vec<(String, Notification)>>,
        failing_destinations: HashSet<String>,
        slow_destinations: HashSet<String>,
    }

    impl FakeNotifier {
        fn destinations(&self) -> Vec<String> {
            let mut destinations: Vec<String> = self
                .delivered
                .lock()
                .unwrap()
                .iter()
                .map(|(destination, _)| destination.clone())
                .collect();
            destinations.sort();
            destinations
        }
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn deliver(&self, destination: &str, notification: &Notification) -> Result<()> {
            if self.slow_destinations.contains(destination) {
                time::sleep(Duration::from_millis(500)).await;
            }
            if self.failing_destinations.contains(destination) {
                return Err(Error::Delivery {
                    destination: destination.to_string(),
                    message: "channel not found".to_string(),
                });
            }
            self.delivered
                .lock()
                .unwrap()
                .push((destination.to_string(), notification.clone()));
            Ok(())
        }
    }

    fn pipeline(store: Arc<FakeStore>, notifier: Arc<FakeNotifier>) -> ReportPipeline {
        ReportPipeline::new(
            store,
            notifier,
            Arc::new(Mutex::new(AlertThrottle::default())),
            PipelineOptions {
                per_user_timeout: Duration::from_millis(100),
                currency_symbol: "₹".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_failing_user_does_not_block_others() {
        let mut store = FakeStore::default();
        for id in ["1", "2", "3"] {
            store.subscribe(id, &[NotificationFlag::WeeklyReport]);
        }
        store.failing_users.insert("2".to_string());
        let store = Arc::new(store);
        let notifier = Arc::new(FakeNotifier::default());

        let summary = pipeline(Arc::clone(&store), Arc::clone(&notifier))
            .run_cadence(Cadence::Weekly, at(2025, 3, 16, 21))
            .await;

        assert_eq!(
            summary,
            FiringSummary {
                delivered: 2,
                skipped: 0,
                failed: 1
            }
        );
        assert_eq!(notifier.destinations(), vec!["channel-1", "channel-3"]);
    }

    #[tokio::test]
    async fn test_slow_delivery_times_out_without_blocking_others() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::MonthlyReport]);
        store.subscribe("2", &[NotificationFlag::MonthlyReport]);
        let notifier = FakeNotifier {
            slow_destinations: HashSet::from(["channel-1".to_string()]),
            ..FakeNotifier::default()
        };
        let notifier = Arc::new(notifier);

        let summary = pipeline(Arc::new(store), Arc::clone(&notifier))
            .run_cadence(Cadence::Monthly, at(2025, 4, 1, 21))
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(notifier.destinations(), vec!["channel-2"]);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_counted() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::DailyReport]);
        let notifier = FakeNotifier {
            failing_destinations: HashSet::from(["channel-1".to_string()]),
            ..FakeNotifier::default()
        };

        let summary = pipeline(Arc::new(store), Arc::new(notifier))
            .run_cadence(Cadence::Daily, at(2025, 3, 10, 21))
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.delivered, 0);
    }

    #[tokio::test]
    async fn test_daily_report_uses_persisted_budget() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::DailyReport]);
        store.budgets.insert("1".to_string(), 5000.0);
        store.expenses.insert(
            "1".to_string(),
            vec![MonetaryRecord::expense(
                1000.0,
                "Food",
                at(2025, 3, 10, 12),
                PaymentMethod::Upi,
            )],
        );
        let notifier = Arc::new(FakeNotifier::default());

        pipeline(Arc::new(store), Arc::clone(&notifier))
            .run_cadence(Cadence::Daily, at(2025, 3, 10, 21))
            .await;

        let delivered = notifier.delivered.lock().unwrap();
        let Some((_, Notification::Report(ReportPayload::Daily(daily)))) = delivered.first() else {
            panic!("expected a daily report, got {delivered:?}");
        };
        assert_eq!(daily.today_expenses, 1000.0);
        assert_eq!(daily.budget_used, Some(20.0));
    }

    #[tokio::test]
    async fn test_friend_reminder_skips_users_nobody_owes() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::FriendReminders]);
        store.subscribe("2", &[NotificationFlag::FriendReminders]);
        store.friends.insert(
            "1".to_string(),
            vec![
                FriendBalance {
                    name: "Asha".to_string(),
                    balance: 200.0,
                },
                FriendBalance {
                    name: "Ravi".to_string(),
                    balance: -50.0,
                },
            ],
        );
        store.friends.insert(
            "2".to_string(),
            vec![FriendBalance {
                name: "Meera".to_string(),
                balance: 0.0,
            }],
        );
        let store = Arc::new(store);
        let notifier = Arc::new(FakeNotifier::default());

        let summary = pipeline(Arc::clone(&store), Arc::clone(&notifier))
            .run_cadence(Cadence::FriendReminder, at(2025, 3, 16, 20))
            .await;

        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(*store.reminded.lock().unwrap(), vec!["1".to_string()]);

        let delivered = notifier.delivered.lock().unwrap();
        let Some((_, Notification::FriendReminder(owing))) = delivered.first() else {
            panic!("expected a friend reminder, got {delivered:?}");
        };
        assert_eq!(owing.len(), 1);
        assert_eq!(owing[0].name, "Asha");
    }

    #[tokio::test]
    async fn test_daily_budget_alerts_are_throttled() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::BudgetAlerts]);
        store.budgets.insert("1".to_string(), 5000.0);
        store.expenses.insert(
            "1".to_string(),
            vec![MonetaryRecord::expense(
                4200.0,
                "Shopping",
                at(2025, 3, 5, 12),
                PaymentMethod::Card,
            )],
        );
        let store = Arc::new(store);
        let notifier = Arc::new(FakeNotifier::default());
        let pipeline = pipeline(Arc::clone(&store), Arc::clone(&notifier));

        let first = pipeline.run_cadence(Cadence::Daily, at(2025, 3, 10, 21)).await;
        assert_eq!(first.delivered, 1);

        // Within the cooldown the same alert is suppressed
        let second = pipeline.run_cadence(Cadence::Daily, at(2025, 3, 10, 21)).await;
        assert_eq!(second.delivered, 0);
        assert_eq!(second.skipped, 1);

        // A day later it surfaces again
        let third = pipeline.run_cadence(Cadence::Daily, at(2025, 3, 11, 21)).await;
        assert_eq!(third.delivered, 1);

        let recorded = store.recorded_alerts.lock().unwrap();
        assert_eq!(
            *recorded,
            vec![
                ("1".to_string(), AlertKind::Warning80),
                ("1".to_string(), AlertKind::Warning80)
            ]
        );
        assert_eq!(notifier.delivered.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_budget_alert_check_skips_users_without_budget() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::BudgetAlerts]);

        let summary = pipeline(Arc::new(store), Arc::new(FakeNotifier::default()))
            .run_cadence(Cadence::Daily, at(2025, 3, 10, 21))
            .await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.delivered, 0);
    }

    /// Trigger fed by the test through per-cadence channels.
    struct ManualTrigger {
        receivers: HashMap<Cadence, Mutex<mpsc::UnboundedReceiver<NaiveDateTime>>>,
    }

    impl ManualTrigger {
        fn new() -> (Self, HashMap<Cadence, mpsc::UnboundedSender<NaiveDateTime>>) {
            let mut receivers = HashMap::new();
            let mut senders = HashMap::new();
            for cadence in Cadence::ALL {
                let (tx, rx) = mpsc::unbounded_channel();
                receivers.insert(cadence, Mutex::new(rx));
                senders.insert(cadence, tx);
            }
            (Self { receivers }, senders)
        }
    }

    #[async_trait]
    impl ScheduleTrigger for ManualTrigger {
        async fn next_firing(&self, cadence: Cadence) -> Option<NaiveDateTime> {
            self.receivers.get(&cadence)?.lock().await.recv().await
        }
    }

    async fn wait_for_deliveries(notifier: &FakeNotifier, count: usize) {
        for _ in 0..100 {
            if notifier.delivered.lock().unwrap().len() >= count {
                return;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_scheduler_fires_on_trigger_and_stops_cleanly() {
        let mut store = FakeStore::default();
        store.subscribe("1", &[NotificationFlag::DailyReport, NotificationFlag::WeeklyReport]);
        let notifier = Arc::new(FakeNotifier::default());
        let pipeline = Arc::new(pipeline(Arc::new(store), Arc::clone(&notifier)));
        let (trigger, senders) = ManualTrigger::new();

        let mut scheduler = Scheduler::new(pipeline, Arc::new(trigger));
        assert!(!scheduler.is_running());
        assert!(scheduler.start());
        assert!(!scheduler.start());
        assert!(scheduler.is_running());

        senders[&Cadence::Weekly].send(at(2025, 3, 16, 21)).unwrap();
        wait_for_deliveries(&notifier, 1).await;
        assert_eq!(notifier.destinations(), vec!["channel-1"]);

        assert!(scheduler.stop().await);
        assert!(!scheduler.is_running());
        assert!(!scheduler.stop().await);

        // Firings after stop are never picked up
        let _ = senders[&Cadence::Daily].send(at(2025, 3, 17, 21));
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(notifier.delivered.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_cron_trigger_next_firings() {
        let trigger = CronTrigger::new([
            (Cadence::Daily, "0 0 21 * * * *"),
            (Cadence::Weekly, "0 0 21 * * Sun *"),
            (Cadence::Monthly, "0 0 21 1 * * *"),
            (Cadence::FriendReminder, "0 0 20 * * Sun *"),
        ])
        .unwrap();
        // Monday
        let after = Local.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let next = |cadence| trigger.next_after(cadence, after).unwrap().naive_local();
        assert_eq!(next(Cadence::Daily), at(2025, 3, 10, 21));
        assert_eq!(next(Cadence::Weekly), at(2025, 3, 16, 21));
        assert_eq!(next(Cadence::FriendReminder), at(2025, 3, 16, 20));
        assert_eq!(next(Cadence::Monthly), at(2025, 4, 1, 21));

        let after_daily = Local.with_ymd_and_hms(2025, 3, 10, 21, 0, 0).unwrap();
        assert_eq!(
            trigger.next_after(Cadence::Daily, after_daily).unwrap() - after_daily,
            TimeDelta::days(1)
        );
    }

    #[test]
    fn test_cron_trigger_rejects_invalid_expression() {
        let result = CronTrigger::new([(Cadence::Daily, "every day at nine")]);
        assert!(matches!(result, Err(Error::Schedule { .. })));
    }

    #[test]
    fn test_cron_trigger_without_expression_never_fires() {
        let trigger = CronTrigger::new([(Cadence::Daily, "0 0 21 * * * *")]).unwrap();
        assert!(trigger.next_after(Cadence::Weekly, Local::now()).is_none());
    }
}
