//! Discord-backed [`Notifier`] that posts rendered notifications to a channel.

use crate::{
    bot::render,
    core::notify::{Notification, Notifier},
    errors::{Error, Result},
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Posts notifications to the Discord channel stored as the user's destination.
pub struct DiscordNotifier {
    http: Arc<serenity::Http>,
    currency_symbol: String,
}

impl DiscordNotifier {
    /// Creates a notifier that sends through `http`.
    #[must_use]
    pub const fn new(http: Arc<serenity::Http>, currency_symbol: String) -> Self {
        Self {
            http,
            currency_symbol,
        }
    }
}

/// Parses a destination into a Discord channel ID.
pub fn parse_channel_id(destination: &str) -> Result<serenity::ChannelId> {
    destination
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&id| id != 0)
        .map(serenity::ChannelId::new)
        .ok_or_else(|| Error::Delivery {
            destination: destination.to_string(),
            message: "destination is not a Discord channel ID".to_string(),
        })
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, destination: &str, notification: &Notification) -> Result<()> {
        let channel_id = parse_channel_id(destination)?;
        let text = render::fit_message(render::render_notification(
            notification,
            &self.currency_symbol,
        )?);

        channel_id
            .say(self.http.as_ref(), text)
            .await
            .map_err(|e| Error::Delivery {
                destination: destination.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(destination, "Notification posted");
        Ok(())
    }
}
