//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `ExpenseBuddy` application,
//! including all slash commands, autocomplete handlers, message rendering and the
//! Discord-backed notifier used by the scheduler.

/// Discord command implementations (reports, budget, records, settings, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// Discord notifier for scheduled reports and alerts
pub mod notifier;
/// Markdown rendering of reports and alerts
pub mod render;

use crate::{
    config::app::AppConfig,
    core::{
        alerts::AlertThrottle,
        scheduler::{ReportPipeline, Scheduler},
        store::DatabaseStore,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded configuration and the
/// alert throttle shared with the scheduler.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Last time each alert kind was shown to each user
    pub throttle: Arc<Mutex<AlertThrottle>>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(
        database: DatabaseConnection,
        config: Arc<AppConfig>,
        throttle: Arc<Mutex<AlertThrottle>>,
    ) -> Self {
        Self {
            database,
            config,
            throttle,
        }
    }

    /// Record store over the bot's database connection.
    #[must_use]
    pub fn store(&self) -> DatabaseStore {
        DatabaseStore::new(self.database.clone())
    }

    /// Configured currency symbol.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.config.display.currency_symbol
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Every slash command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::today(),
        commands::week(),
        commands::month(),
        commands::trend(),
        commands::budget(),
        commands::set_budget(),
        commands::alerts(),
        commands::expense(),
        commands::income(),
        commands::friend(),
        commands::friends(),
        commands::subscribe(),
        commands::unsubscribe(),
        commands::notifications(),
    ]
}

/// Runs the Discord client and the report scheduler until the client exits or
/// Ctrl-C is received, then stops the scheduler.
pub async fn run_bot(token: String, config: Arc<AppConfig>, database: DatabaseConnection) -> Result<()> {
    let trigger = Arc::new(config.schedule.trigger()?);
    let throttle = Arc::new(Mutex::new(AlertThrottle::new(config.alert_cooldown())));

    let framework_config = Arc::clone(&config);
    let framework_throttle = Arc::clone(&throttle);
    let framework_database = database.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands globally", framework.options().commands.len());
                Ok(BotData::new(
                    framework_database,
                    framework_config,
                    framework_throttle,
                ))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await?;

    let notifier = notifier::DiscordNotifier::new(
        Arc::clone(&client.http),
        config.display.currency_symbol.clone(),
    );
    let pipeline = ReportPipeline::new(
        Arc::new(DatabaseStore::new(database)),
        Arc::new(notifier),
        throttle,
        config.pipeline_options(),
    );
    let mut scheduler = Scheduler::new(Arc::new(pipeline), trigger);
    scheduler.start();

    let outcome = tokio::select! {
        result = client.start() => result.map_err(Error::from),
        signal = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
            signal.map_err(Error::from)
        }
    };

    scheduler.stop().await;
    client.shard_manager.shutdown_all().await;
    outcome
}
