//! User-adjustable pipeline tunables.
//!
//! Four keys control how deep the kill feed digs. Every write validates
//! the key against the allow-list and the value against its bounds; a
//! rejected write changes nothing. Reads go through an in-memory snapshot
//! that is invalidated on every write and on bulk reset.

use std::sync::Mutex;

use sea_orm::DatabaseConnection;

use crate::data::settings::SettingsRepository;
use crate::error::settings::SettingsError;
use crate::error::Error;

/// Allow-listed setting keys with their bounds and defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKey {
    /// Upper bound on killmail bodies fetched per analysis.
    MaxKillmailsToFetch,
    /// Minimum kill references before pagination may stop.
    MinKillmails,
    /// Days of history the feed aims to cover.
    TargetDays,
    /// Hard page cap per feed.
    MaxPages,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        Self::MaxKillmailsToFetch,
        Self::MinKillmails,
        Self::TargetDays,
        Self::MaxPages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxKillmailsToFetch => "MAX_KILLMAILS_TO_FETCH",
            Self::MinKillmails => "ZKILL_MIN_KILLMAILS",
            Self::TargetDays => "ZKILL_TARGET_DAYS",
            Self::MaxPages => "ZKILL_MAX_PAGES",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    /// Inclusive `(min, max)` bounds for the value.
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            Self::MaxKillmailsToFetch => (100, 5000),
            Self::MinKillmails => (50, 500),
            Self::TargetDays => (7, 90),
            Self::MaxPages => (1, 20),
        }
    }

    pub fn default_value(&self) -> i64 {
        match self {
            Self::MaxKillmailsToFetch => 1000,
            Self::MinKillmails => 100,
            Self::TargetDays => 30,
            Self::MaxPages => 10,
        }
    }
}

/// Snapshot of every tunable, as consumed by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub max_killmails_to_fetch: i64,
    pub min_killmails: i64,
    pub target_days: i64,
    pub max_pages: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_killmails_to_fetch: SettingKey::MaxKillmailsToFetch.default_value(),
            min_killmails: SettingKey::MinKillmails.default_value(),
            target_days: SettingKey::TargetDays.default_value(),
            max_pages: SettingKey::MaxPages.default_value(),
        }
    }
}

impl Settings {
    fn get(&self, key: SettingKey) -> i64 {
        match key {
            SettingKey::MaxKillmailsToFetch => self.max_killmails_to_fetch,
            SettingKey::MinKillmails => self.min_killmails,
            SettingKey::TargetDays => self.target_days,
            SettingKey::MaxPages => self.max_pages,
        }
    }

    fn set(&mut self, key: SettingKey, value: i64) {
        match key {
            SettingKey::MaxKillmailsToFetch => self.max_killmails_to_fetch = value,
            SettingKey::MinKillmails => self.min_killmails = value,
            SettingKey::TargetDays => self.target_days = value,
            SettingKey::MaxPages => self.max_pages = value,
        }
    }
}

pub struct SettingsService {
    db: DatabaseConnection,
    cache: Mutex<Option<Settings>>,
}

impl SettingsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            cache: Mutex::new(None),
        }
    }

    /// Current settings: defaults overlaid with persisted values.
    pub async fn get_settings(&self) -> Result<Settings, Error> {
        if let Some(cached) = *self.cache.lock().expect("settings cache lock poisoned") {
            return Ok(cached);
        }

        let mut settings = Settings::default();
        let rows = SettingsRepository::new(&self.db).all().await?;
        for row in rows {
            if let Some(key) = SettingKey::parse(&row.key) {
                let (min, max) = key.bounds();
                // Out-of-range persisted values (e.g. from a downgraded
                // schema) fall back to the default instead of escaping
                // their bounds.
                if (min..=max).contains(&row.value) {
                    settings.set(key, row.value);
                }
            }
        }

        *self.cache.lock().expect("settings cache lock poisoned") = Some(settings);
        Ok(settings)
    }

    /// Validates and persists one setting. A failed validation returns a
    /// precise reason and leaves stored state untouched.
    pub async fn set_setting(&self, key: &str, value: i64) -> Result<(), Error> {
        let setting = SettingKey::parse(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        let (min, max) = setting.bounds();
        if !(min..=max).contains(&value) {
            return Err(SettingsError::OutOfBounds {
                key: setting.as_str(),
                value,
                min,
                max,
            }
            .into());
        }

        // Writing the current value back is a no-op.
        if self.get_settings().await?.get(setting) == value {
            return Ok(());
        }

        SettingsRepository::new(&self.db)
            .upsert(setting.as_str(), value)
            .await?;
        *self.cache.lock().expect("settings cache lock poisoned") = None;

        Ok(())
    }

    /// Drops every override and returns to defaults.
    pub async fn reset_settings(&self) -> Result<(), Error> {
        SettingsRepository::new(&self.db).clear().await?;
        *self.cache.lock().expect("settings cache lock poisoned") = None;

        Ok(())
    }
}
