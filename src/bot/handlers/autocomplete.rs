//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are filtered case-insensitively on the user's partial input and
//! capped at Discord's limit of 25 choices.

use crate::{
    bot::BotData,
    core::{
        record::{Category, PaymentMethod},
        records,
    },
    errors::Error,
};

const DISCORD_CHOICE_LIMIT: usize = 25;

fn matching<'a, I>(options: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let partial_lower = partial.to_lowercase();
    options
        .into_iter()
        .filter(|option| option.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .take(DISCORD_CHOICE_LIMIT)
        .collect()
}

/// Suggests spending category names.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_category(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(Category::ALL.map(Category::as_str), partial)
}

/// Suggests payment methods.
#[allow(clippy::unused_async)] // poise awaits every autocomplete callback
pub async fn autocomplete_payment_method(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(PaymentMethod::ALL.map(PaymentMethod::as_str), partial)
}

/// Suggests the names of the author's existing friends.
pub async fn autocomplete_friend_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let user_id = ctx.author().id.to_string();

    let Ok(friends) = records::list_friends(db, &user_id).await else {
        return Vec::new();
    };

    matching(friends.iter().map(|f| f.friend_name.as_str()), partial)
}
