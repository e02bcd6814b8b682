//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Budget status, budget setting and alert log commands
pub mod budget;

/// General utility commands
pub mod general;

/// Expense, income and friend balance commands
pub mod records;

/// Daily, weekly, monthly and trend report commands
pub mod report;

/// Notification subscription commands
pub mod settings;

use crate::{
    bot::BotData,
    core::users,
    entities::user,
    errors::{Error, Result},
};

/// Registers the command author on first use and returns their user row.
pub(crate) async fn ensure_author(ctx: poise::Context<'_, BotData, Error>) -> Result<user::Model> {
    let author = ctx.author();
    users::ensure_user(&ctx.data().database, &author.id.to_string(), &author.name).await
}

/// Rejects amounts that are not finite or not above zero, replying with the reason.
/// Returns true when the amount is usable.
pub(crate) async fn check_positive_amount(
    ctx: poise::Context<'_, BotData, Error>,
    amount: f64,
) -> Result<bool> {
    if !amount.is_finite() {
        ctx.say("❌ Invalid amount: must be a valid number").await?;
        return Ok(false);
    }
    if amount <= 0.0 {
        ctx.say("❌ Invalid amount: must be greater than zero")
            .await?;
        return Ok(false);
    }
    Ok(true)
}

// Export commands
pub use budget::*;
pub use general::*;
pub use records::*;
pub use report::*;
pub use settings::*;
