//! Budget Discord commands - `budget`, `set_budget` and `alerts`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::ensure_author, handlers::autocomplete, render},
        core::{
            alert_log,
            alerts::AlertSettings,
            budget::{self, OVERALL_CATEGORY},
            record::Category,
            report,
            store::RecordStore,
        },
        errors::{Error, Result},
    };
    use chrono::{Datelike, Local};
    use std::fmt::Write;

    const ALERTS_PER_MESSAGE: u64 = 15;

    /// Shows this month's budget usage, active alerts and spending tips.
    #[poise::command(slash_command)]
    pub async fn budget(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let store = ctx.data().store();
        let now = Local::now().naive_local();

        let expenses = store.list_expenses(&user.id).await?;
        let overall = store.get_budget(&user.id, now.month(), now.year()).await?;
        let category_budgets = store
            .list_category_budgets(&user.id, now.month(), now.year())
            .await?;

        let status =
            report::build_budget_status(&expenses, overall.as_ref(), &category_budgets, now);
        let mut response = render::render_budget_status(&status, ctx.data().currency())?;

        if !category_budgets.is_empty() {
            writeln!(&mut response, "\n**Category budgets**")?;
            for category_budget in &category_budgets {
                writeln!(
                    &mut response,
                    "{} {}: {}",
                    Category::from_name(&category_budget.category).icon(),
                    category_budget.category,
                    render::money(ctx.data().currency(), category_budget.amount)
                )?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Sets this month's overall budget, or a category budget when a category is given.
    #[poise::command(slash_command)]
    pub async fn set_budget(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Budget amount for this month"] amount: f64,
        #[description = "Category (leave empty for the overall monthly budget)"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: Option<String>,
        #[description = "Daily spending limit, 0 to disable (overall budget only)"]
        daily_limit: Option<f64>,
    ) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            ctx.say("❌ Invalid amount: must be a number of at least zero")
                .await?;
            return Ok(());
        }
        if daily_limit.is_some_and(|limit| !limit.is_finite() || limit < 0.0) {
            ctx.say("❌ Invalid daily limit: must be a number of at least zero")
                .await?;
            return Ok(());
        }

        let user = ensure_author(ctx).await?;
        let db = &ctx.data().database;
        let now = Local::now();
        let (month, year) = (now.month(), now.year());
        let currency = ctx.data().currency();

        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(OVERALL_CATEGORY));

        if let Some(category) = category {
            let existing =
                budget::get_category_budget(db, &user.id, &category, month, year).await?;
            let settings = existing.map_or_else(AlertSettings::default, |b| b.alert_settings);
            budget::upsert_category_budget(db, &user.id, &category, month, year, amount, settings)
                .await?;

            ctx.say(format!(
                "✅ {category} budget for {} set to {}",
                now.format("%B %Y"),
                render::money(currency, amount)
            ))
            .await?;
            return Ok(());
        }

        let existing = budget::get_budget(db, &user.id, month, year).await?;
        let mut settings = existing.map_or_else(AlertSettings::default, |b| b.alert_settings);
        if let Some(limit) = daily_limit {
            settings.daily_limit = limit;
        }
        let saved = budget::upsert_budget(db, &user.id, month, year, amount, settings).await?;

        let mut response = format!(
            "✅ Monthly budget for {} set to {}",
            now.format("%B %Y"),
            render::money(currency, saved.amount)
        );
        if saved.alert_settings.daily_limit > 0.0 {
            write!(
                &mut response,
                "\n📅 Daily limit: {}",
                render::money(currency, saved.alert_settings.daily_limit)
            )?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Shows your unacknowledged budget alerts and marks the listed ones as read.
    #[poise::command(slash_command)]
    pub async fn alerts(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let db = &ctx.data().database;

        let entries = alert_log::unacknowledged_alerts(db, &user.id, ALERTS_PER_MESSAGE).await?;
        if entries.is_empty() {
            ctx.say("🔕 No new budget alerts.").await?;
            return Ok(());
        }
        let total = alert_log::count_unacknowledged(db, &user.id).await?;

        let mut response = format!("🔔 **{total} new alert(s)**\n");
        let mut shown_ids = Vec::with_capacity(entries.len());
        for entry in &entries {
            let line = format!(
                "• `{}` {}\n",
                entry
                    .triggered_at
                    .with_timezone(&Local)
                    .format("%d %b %H:%M"),
                entry.message
            );
            // Leave room for the footer line; the first entry is always shown
            let too_long =
                response.chars().count() + line.chars().count() > render::MESSAGE_LIMIT - 100;
            if too_long && !shown_ids.is_empty() {
                break;
            }
            response.push_str(&line);
            shown_ids.push(entry.id);
        }
        let unlisted = total.saturating_sub(shown_ids.len() as u64);
        if unlisted > 0 {
            write!(
                &mut response,
                "…and {unlisted} more. Run `/alerts` again to see them."
            )?;
        }

        ctx.say(render::fit_message(response)).await?;

        alert_log::acknowledge_alerts(db, &user.id, &shown_ids).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
