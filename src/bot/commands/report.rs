//! Report Discord commands - `today`, `week`, `month` and `trend`.
//!
//! These build the same reports the scheduler sends, on demand, for the command
//! author.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::ensure_author, render},
        core::{aggregate, report, store::RecordStore},
        errors::{Error, Result},
    };
    use chrono::{Datelike, Local};

    const DEFAULT_TREND_MONTHS: u32 = 6;
    const MAX_TREND_MONTHS: u32 = 12;

    /// Shows today's spending, income and budget usage.
    #[poise::command(slash_command)]
    pub async fn today(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let store = ctx.data().store();
        let now = Local::now().naive_local();

        let expenses = store.list_expenses(&user.id).await?;
        let income = store.list_income(&user.id).await?;
        let budget = store
            .get_budget(&user.id, now.month(), now.year())
            .await?
            .map_or(0.0, |b| b.amount);

        let daily = report::build_daily(&expenses, &income, budget, now);
        ctx.say(render::render_daily(&daily, ctx.data().currency())?)
            .await?;
        Ok(())
    }

    /// Shows the last seven days with a category breakdown and trend.
    #[poise::command(slash_command)]
    pub async fn week(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let store = ctx.data().store();
        let now = Local::now().naive_local();

        let expenses = store.list_expenses(&user.id).await?;
        let income = store.list_income(&user.id).await?;

        let weekly = report::build_weekly(&expenses, &income, now);
        ctx.say(render::render_weekly(&weekly, ctx.data().currency())?)
            .await?;
        Ok(())
    }

    /// Shows this month's totals, budget and savings.
    #[poise::command(slash_command)]
    pub async fn month(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let store = ctx.data().store();
        let now = Local::now().naive_local();

        let expenses = store.list_expenses(&user.id).await?;
        let income = store.list_income(&user.id).await?;
        let budget = store
            .get_budget(&user.id, now.month(), now.year())
            .await?
            .map_or(0.0, |b| b.amount);

        let monthly = report::build_monthly(&expenses, &income, budget, now);
        ctx.say(render::render_monthly(&monthly, ctx.data().currency())?)
            .await?;
        Ok(())
    }

    /// Shows spending per month over the last few months.
    #[poise::command(slash_command)]
    pub async fn trend(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Number of months to show (1-12, default 6)"]
        #[min = 1]
        #[max = 12]
        months: Option<u32>,
    ) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let months = months
            .unwrap_or(DEFAULT_TREND_MONTHS)
            .clamp(1, MAX_TREND_MONTHS);
        let today = Local::now().date_naive();

        let expenses = ctx.data().store().list_expenses(&user.id).await?;
        let summary = aggregate::summarize_spending(&expenses, months, today);
        let categories = aggregate::bucket_categories_by_month(&expenses, months, today);

        ctx.say(render::render_trend(
            &summary,
            &categories,
            ctx.data().currency(),
        )?)
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
