//! Notification delivery boundary.

use crate::{
    core::{
        alerts::AlertEvent,
        report::{FriendOwing, ReportPayload},
    },
    errors::Result,
};
use async_trait::async_trait;
use serde::Serialize;

/// Anything the scheduler sends to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Notification {
    /// A daily, weekly or monthly report
    Report(ReportPayload),
    /// Friends who currently owe the user, largest debt first
    FriendReminder(Vec<FriendOwing>),
    /// A budget alert raised during the daily check
    BudgetAlert(AlertEvent),
}

/// Delivers notifications to a user's destination.
///
/// Implementations decide how a notification is rendered; the destination is the
/// opaque handle stored on the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn deliver(&self, destination: &str, notification: &Notification) -> Result<()>;
}
