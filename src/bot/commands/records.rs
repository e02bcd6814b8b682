//! Record Discord commands - `expense`, `income`, `friend` and `friends`.
//!
//! Recording an expense re-evaluates the author's budget and shows any alert that
//! was not already shown within the cooldown.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{check_positive_amount, ensure_author},
            handlers::autocomplete,
            render,
        },
        core::{
            alert_log,
            alerts::AlertEvent,
            record::{Category, PaymentMethod},
            records, report,
            store::RecordStore,
        },
        entities::user,
        errors::{Error, Result},
    };
    use chrono::{Datelike, Local, Utc};
    use std::fmt::Write;

    /// Evaluates the author's budgets after a new expense and returns the alerts
    /// that pass the throttle. Surfaced alerts are added to the alert log.
    async fn fresh_alerts(
        ctx: poise::Context<'_, BotData, Error>,
        user: &user::Model,
    ) -> Result<Vec<AlertEvent>> {
        let data = ctx.data();
        let store = data.store();
        let now = Local::now().naive_local();

        let expenses = store.list_expenses(&user.id).await?;
        let overall = store.get_budget(&user.id, now.month(), now.year()).await?;
        let category_budgets = store
            .list_category_budgets(&user.id, now.month(), now.year())
            .await?;
        if overall.is_none() && category_budgets.is_empty() {
            return Ok(Vec::new());
        }

        let status =
            report::build_budget_status(&expenses, overall.as_ref(), &category_budgets, now);
        let shown_at = Utc::now();
        let alerts = data
            .throttle
            .lock()
            .await
            .filter(&user.id, status.alerts, shown_at);

        for alert in &alerts {
            alert_log::record_alert(&data.database, &user.id, alert, data.currency(), shown_at)
                .await?;
        }
        Ok(alerts)
    }

    /// Records an expense.
    #[poise::command(slash_command)]
    pub async fn expense(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount spent"] amount: f64,
        #[description = "Spending category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "Payment method (default Cash)"]
        #[autocomplete = "autocomplete::autocomplete_payment_method"]
        payment: Option<String>,
        #[description = "Optional description of the expense"] description: Option<String>,
    ) -> Result<()> {
        if !check_positive_amount(ctx, amount).await? {
            return Ok(());
        }

        let category = category.trim().to_string();
        if category.is_empty() {
            ctx.say("❌ Category cannot be empty").await?;
            return Ok(());
        }

        let user = ensure_author(ctx).await?;
        let payment_method = payment
            .as_deref()
            .map_or(PaymentMethod::Cash, PaymentMethod::parse);
        let currency = ctx.data().currency();

        records::create_expense(
            &ctx.data().database,
            &user.id,
            amount,
            category.clone(),
            description.clone(),
            payment_method,
            Utc::now(),
        )
        .await?;

        let mut response = format!(
            "✅ {} Spent {} on {category} ({payment_method})",
            Category::from_name(&category).icon(),
            render::money(currency, amount)
        );
        if let Some(desc) = description.as_deref() {
            write!(&mut response, " - {desc}")?;
        }

        for alert in fresh_alerts(ctx, &user).await? {
            write!(&mut response, "\n\n{}", render::render_alert(&alert, currency))?;
        }

        ctx.say(response).await?;
        Ok(())
    }

    /// Records income.
    #[poise::command(slash_command)]
    pub async fn income(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount received"] amount: f64,
        #[description = "Where the money came from"] source: String,
        #[description = "Optional description of the income"] description: Option<String>,
    ) -> Result<()> {
        if !check_positive_amount(ctx, amount).await? {
            return Ok(());
        }

        let source = source.trim().to_string();
        if source.is_empty() {
            ctx.say("❌ Source cannot be empty").await?;
            return Ok(());
        }

        let user = ensure_author(ctx).await?;
        records::create_income(
            &ctx.data().database,
            &user.id,
            amount,
            source.clone(),
            description,
            Utc::now(),
        )
        .await?;

        ctx.say(format!(
            "✅ 💰 Received {} from {source}",
            render::money(ctx.data().currency(), amount)
        ))
        .await?;
        Ok(())
    }

    /// Sets a friend's balance. Positive means they owe you, negative means you owe them.
    #[poise::command(slash_command)]
    pub async fn friend(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Friend's name"]
        #[autocomplete = "autocomplete::autocomplete_friend_name"]
        name: String,
        #[description = "Balance (positive if they owe you)"] balance: f64,
    ) -> Result<()> {
        if !balance.is_finite() {
            ctx.say("❌ Invalid balance: must be a valid number").await?;
            return Ok(());
        }
        if name.trim().is_empty() {
            ctx.say("❌ Friend name cannot be empty").await?;
            return Ok(());
        }

        let user = ensure_author(ctx).await?;
        let saved = records::set_friend_balance(&ctx.data().database, &user.id, &name, balance)
            .await?;
        let currency = ctx.data().currency();

        let message = if saved.balance > 0.0 {
            format!(
                "✅ {} owes you {}",
                saved.friend_name,
                render::money(currency, saved.balance)
            )
        } else if saved.balance < 0.0 {
            format!(
                "✅ You owe {} {}",
                saved.friend_name,
                render::money(currency, -saved.balance)
            )
        } else {
            format!("✅ You and {} are settled up", saved.friend_name)
        };

        ctx.say(message).await?;
        Ok(())
    }

    /// Lists friend balances, largest debt to you first.
    #[poise::command(slash_command)]
    pub async fn friends(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user = ensure_author(ctx).await?;
        let friends = ctx.data().store().list_friends(&user.id).await?;
        let currency = ctx.data().currency();

        if friends.is_empty() {
            ctx.say("👥 No friends yet. Add one with `/friend <name> <balance>`.")
                .await?;
            return Ok(());
        }

        let owing = report::friends_owing(&friends);
        let mut response = String::from("👥 **Friends**\n");
        for friend in &owing {
            writeln!(
                &mut response,
                "• {} owes you {}",
                friend.name,
                render::money(currency, friend.amount)
            )?;
        }
        for friend in friends.iter().filter(|f| f.balance <= 0.0) {
            if friend.balance < 0.0 {
                writeln!(
                    &mut response,
                    "• You owe {} {}",
                    friend.name,
                    render::money(currency, -friend.balance)
                )?;
            } else {
                writeln!(&mut response, "• {}: settled", friend.name)?;
            }
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
