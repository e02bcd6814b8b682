//! Notification settings commands - `subscribe`, `unsubscribe` and `notifications`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::users::{self, NotificationFlag},
        errors::{Error, Result},
    };
    use poise::ChoiceParameter;

    /// Scheduled notification kinds a user can toggle.
    #[derive(Debug, Clone, Copy, ChoiceParameter)]
    pub enum NotificationKind {
        #[name = "Daily report"]
        Daily,
        #[name = "Weekly report"]
        Weekly,
        #[name = "Monthly report"]
        Monthly,
        #[name = "Budget alerts"]
        BudgetAlerts,
        #[name = "Friend reminders"]
        FriendReminders,
    }

    impl From<NotificationKind> for NotificationFlag {
        fn from(kind: NotificationKind) -> Self {
            match kind {
                NotificationKind::Daily => Self::DailyReport,
                NotificationKind::Weekly => Self::WeeklyReport,
                NotificationKind::Monthly => Self::MonthlyReport,
                NotificationKind::BudgetAlerts => Self::BudgetAlerts,
                NotificationKind::FriendReminders => Self::FriendReminders,
            }
        }
    }

    /// Sends your scheduled reports and alerts to this channel.
    #[poise::command(slash_command)]
    pub async fn subscribe(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let author = ctx.author();
        let destination = ctx.channel_id().to_string();

        users::subscribe(
            &ctx.data().database,
            &author.id.to_string(),
            &author.name,
            &destination,
        )
        .await?;

        ctx.say(format!(
            "🔔 Subscribed. Scheduled reports will be posted in <#{destination}>."
        ))
        .await?;
        Ok(())
    }

    /// Stops all scheduled reports and alerts.
    #[poise::command(slash_command)]
    pub async fn unsubscribe(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let author = ctx.author();
        let db = &ctx.data().database;
        let user_id = author.id.to_string();

        users::ensure_user(db, &user_id, &author.name).await?;
        users::unsubscribe(db, &user_id).await?;

        ctx.say("🔕 Unsubscribed. Use `/subscribe` to turn scheduled reports back on.")
            .await?;
        Ok(())
    }

    /// Turns one kind of scheduled notification on or off.
    #[poise::command(slash_command)]
    pub async fn notifications(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Notification kind"] kind: NotificationKind,
        #[description = "Whether it should be sent"] enabled: bool,
    ) -> Result<()> {
        let author = ctx.author();
        let db = &ctx.data().database;
        let user_id = author.id.to_string();

        let user = users::ensure_user(db, &user_id, &author.name).await?;
        let flag = NotificationFlag::from(kind);
        let state = if enabled { "on" } else { "off" };
        if flag.is_set(&user) == enabled {
            ctx.say(format!("ℹ️ {} is already {state}.", kind.name()))
                .await?;
            return Ok(());
        }
        users::set_notification_flag(db, &user_id, flag, enabled).await?;

        let mut response = format!("✅ {} turned {state}.", kind.name());
        if enabled && !user.notifications_enabled {
            response.push_str("\nUse `/subscribe` in a channel to start receiving them.");
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
