//! Application configuration loading from config.toml
//!
//! Every field has a default, so an absent file or an empty table yields the
//! default configuration. Cron expressions are validated at load time so a typo
//! fails at startup instead of silently never firing.

use crate::{
    core::{
        alerts::DEFAULT_ALERT_COOLDOWN_MINUTES,
        scheduler::{Cadence, CronTrigger, PipelineOptions, parse_schedule},
    },
    errors::{Error, Result},
};
use chrono::TimeDelta;
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// When each scheduled notification fires
    pub schedule: ScheduleConfig,
    /// Delivery limits and alert cooldown
    pub notifications: NotificationConfig,
    /// Presentation settings
    pub display: DisplayConfig,
}

/// Seven-field cron expressions (sec min hour day month weekday year), local time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Daily report and budget alert check
    pub daily: String,
    /// Weekly report
    pub weekly: String,
    /// Monthly report
    pub monthly: String,
    /// Friend payment reminder
    pub friend_reminder: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily: "0 0 21 * * * *".to_string(),
            weekly: "0 0 21 * * Sun *".to_string(),
            monthly: "0 0 21 1 * * *".to_string(),
            friend_reminder: "0 0 20 * * Sun *".to_string(),
        }
    }
}

impl ScheduleConfig {
    /// The expression configured for a cadence.
    #[must_use]
    pub fn expression(&self, cadence: Cadence) -> &str {
        match cadence {
            Cadence::Daily => &self.daily,
            Cadence::Weekly => &self.weekly,
            Cadence::Monthly => &self.monthly,
            Cadence::FriendReminder => &self.friend_reminder,
        }
    }

    /// Builds the cron trigger for every cadence.
    pub fn trigger(&self) -> Result<CronTrigger> {
        CronTrigger::new(
            Cadence::ALL
                .into_iter()
                .map(|cadence| (cadence, self.expression(cadence))),
        )
    }
}

/// Notification delivery settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Seconds allowed for one user's report during a scheduled firing
    pub per_user_timeout_secs: u64,
    /// Minutes before the same alert kind is shown to a user again
    pub alert_cooldown_minutes: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            per_user_timeout_secs: 30,
            alert_cooldown_minutes: DEFAULT_ALERT_COOLDOWN_MINUTES,
        }
    }
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Symbol prefixed to every amount
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

impl AppConfig {
    /// Checks values serde cannot: cron syntax and positive limits.
    pub fn validate(&self) -> Result<()> {
        for cadence in Cadence::ALL {
            parse_schedule(self.schedule.expression(cadence)).map_err(|e| Error::Config {
                message: format!("[schedule] {cadence}: {e}"),
            })?;
        }

        if self.notifications.per_user_timeout_secs == 0 {
            return Err(Error::Config {
                message: "[notifications] per_user_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.notifications.alert_cooldown_minutes < 0 {
            return Err(Error::Config {
                message: "[notifications] alert_cooldown_minutes cannot be negative".to_string(),
            });
        }

        if TimeDelta::try_minutes(self.notifications.alert_cooldown_minutes).is_none() {
            return Err(Error::Config {
                message: format!(
                    "[notifications] alert_cooldown_minutes {} is out of range",
                    self.notifications.alert_cooldown_minutes
                ),
            });
        }

        Ok(())
    }

    /// Cooldown used by the alert throttle. Out-of-range values saturate; `validate`
    /// rejects them at load time.
    #[must_use]
    pub fn alert_cooldown(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.notifications.alert_cooldown_minutes).unwrap_or(TimeDelta::MAX)
    }

    /// Options for the scheduled report pipeline.
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            per_user_timeout: Duration::from_secs(self.notifications.per_user_timeout_secs),
            currency_symbol: self.display.currency_symbol.clone(),
        }
    }
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file, using defaults when the file is absent.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - A cron expression or limit is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No config file at {:?}, using defaults", path);
        let config = AppConfig::default();
        config.validate()?;
        return Ok(config);
    }

    tracing::debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}
