//! Core business logic - framework-agnostic records, budgets and reporting
//!
//! Nothing in here knows about Discord. The bot layer and the scheduler both call
//! into these modules.

/// Pure aggregation over dated monetary records
pub mod aggregate;

/// Acknowledgeable log of surfaced budget alerts
pub mod alert_log;

/// Budget threshold evaluation, spending tips and alert throttling
pub mod alerts;

/// Per-month overall and category budgets
pub mod budget;

/// Notification payloads and the delivery boundary
pub mod notify;

/// Monetary record types shared by the aggregator and reports
pub mod record;

/// Expense, income and friend persistence
pub mod records;

/// Daily, weekly, monthly and budget status report builders
pub mod report;

/// Cron-driven report pipeline and its lifecycle
pub mod scheduler;

/// Record store abstraction read by the report pipeline
pub mod store;

/// User registration and notification subscriptions
pub mod users;
