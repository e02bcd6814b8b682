//! Acknowledgeable log of budget alerts that were surfaced to a user.

use crate::{
    core::alerts::AlertEvent,
    entities::{AlertLog, alert_log},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};

/// Stores an alert as an unacknowledged log entry.
pub async fn record_alert(
    db: &DatabaseConnection,
    user_id: &str,
    event: &AlertEvent,
    currency: &str,
    triggered_at: DateTime<Utc>,
) -> Result<alert_log::Model> {
    let entry = alert_log::ActiveModel {
        user_id: Set(user_id.to_string()),
        kind: Set(event.kind().as_str().to_string()),
        message: Set(event.message(currency)),
        triggered_at: Set(triggered_at),
        acknowledged: Set(false),
        ..Default::default()
    };

    entry.insert(db).await.map_err(Into::into)
}

/// The newest `limit` unacknowledged alerts for a user, newest first.
pub async fn unacknowledged_alerts(
    db: &DatabaseConnection,
    user_id: &str,
    limit: u64,
) -> Result<Vec<alert_log::Model>> {
    AlertLog::find()
        .filter(alert_log::Column::UserId.eq(user_id))
        .filter(alert_log::Column::Acknowledged.eq(false))
        .order_by_desc(alert_log::Column::TriggeredAt)
        .order_by_desc(alert_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// How many alerts the user has not acknowledged yet.
pub async fn count_unacknowledged(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    AlertLog::find()
        .filter(alert_log::Column::UserId.eq(user_id))
        .filter(alert_log::Column::Acknowledged.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Marks the given alerts of a user as acknowledged and returns how many changed.
///
/// Only the listed ids are touched, so alerts recorded after they were read stay
/// unacknowledged.
pub async fn acknowledge_alerts(
    db: &DatabaseConnection,
    user_id: &str,
    alert_ids: &[i64],
) -> Result<u64> {
    if alert_ids.is_empty() {
        return Ok(0);
    }

    let result = AlertLog::update_many()
        .col_expr(alert_log::Column::Acknowledged, Expr::value(true))
        .filter(alert_log::Column::UserId.eq(user_id))
        .filter(alert_log::Column::Id.is_in(alert_ids.iter().copied()))
        .filter(alert_log::Column::Acknowledged.eq(false))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn warning() -> AlertEvent {
        AlertEvent::Warning80 {
            percentage: 84.0,
            spent: 4200.0,
            budget: 5000.0,
            remaining: 800.0,
        }
    }

    #[tokio::test]
    async fn test_record_and_list_alerts() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let earlier = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 10, 21, 0, 0).unwrap();
        record_alert(&db, &user.id, &warning(), "₹", earlier).await?;
        let daily = AlertEvent::DailyLimit {
            spent_today: 700.0,
            limit: 500.0,
            overspent: 200.0,
        };
        record_alert(&db, &user.id, &daily, "₹", later).await?;

        let alerts = unacknowledged_alerts(&db, &user.id, 10).await?;
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, "daily_limit");
        assert_eq!(alerts[1].kind, "warning_80");
        assert!(alerts[1].message.contains("84"));

        Ok(())
    }

    #[tokio::test]
    async fn test_acknowledge_only_listed_alerts() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let first = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        record_alert(&db, &user.id, &warning(), "₹", first).await?;
        let listed = unacknowledged_alerts(&db, &user.id, 10).await?;
        assert_eq!(listed.len(), 1);

        // Recorded after the list was read
        let second = Utc.with_ymd_and_hms(2025, 3, 10, 21, 0, 0).unwrap();
        let late = record_alert(&db, &user.id, &warning(), "₹", second).await?;

        let ids: Vec<i64> = listed.iter().map(|a| a.id).collect();
        assert_eq!(acknowledge_alerts(&db, &user.id, &ids).await?, 1);

        let remaining = unacknowledged_alerts(&db, &user.id, 10).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, late.id);

        // Already acknowledged ids and empty lists change nothing
        assert_eq!(acknowledge_alerts(&db, &user.id, &ids).await?, 0);
        assert_eq!(acknowledge_alerts(&db, &user.id, &[]).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_acknowledge_ignores_other_users_alerts() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let other = create_custom_user(&db, "other_user", "Other", "").await?;

        let theirs = record_alert(&db, &other.id, &warning(), "₹", Utc::now()).await?;
        assert_eq!(acknowledge_alerts(&db, &user.id, &[theirs.id]).await?, 0);
        assert_eq!(count_unacknowledged(&db, &other.id).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_unacknowledged_alerts_limit_and_count() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        for hour in 0..5 {
            let at = Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap();
            record_alert(&db, &user.id, &warning(), "₹", at).await?;
        }

        let newest = unacknowledged_alerts(&db, &user.id, 2).await?;
        assert_eq!(newest.len(), 2);
        assert!(newest[0].triggered_at > newest[1].triggered_at);
        assert_eq!(count_unacknowledged(&db, &user.id).await?, 5);

        Ok(())
    }
}
