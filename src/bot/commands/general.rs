//! General Discord commands - ping and help.
//! These commands don't touch the database and provide basic bot functionality
//! and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**ExpenseBuddy Help**\n\
        Track spending, set budgets and get scheduled reports.\n\n\
        **Recording**\n\
        • `/expense <amount> <category> [payment] [description]` - Records an expense.\n\
        • `/income <amount> <source> [description]` - Records income.\n\
        • `/friend <name> <balance>` - Sets what a friend owes you (negative if you owe them).\n\
        • `/friends` - Lists friend balances.\n\n\
        **Reports**\n\
        • `/today`, `/week`, `/month` - Shows the daily, weekly or monthly report.\n\
        • `/trend [months]` - Shows spending per month and per payment method.\n\n\
        **Budget**\n\
        • `/budget` - Shows this month's budget status and tips.\n\
        • `/set_budget <amount> [category] [daily_limit]` - Sets the monthly or a category budget.\n\
        • `/alerts` - Shows new budget alerts and marks them as read.\n\n\
        **Notifications**\n\
        • `/subscribe` - Sends scheduled reports to this channel.\n\
        • `/unsubscribe` - Stops scheduled reports.\n\
        • `/notifications <kind> <enabled>` - Turns one scheduled notification on or off.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
