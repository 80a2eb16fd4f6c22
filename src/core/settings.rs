//! Gate settings - persistence and coercion.
//!
//! The gate reads four scalar settings through the narrow [`SettingsStore`]
//! interface. Values are text; flags follow host truthiness (empty and `"0"`
//! are false) and identifiers are parsed like an integer cast, so a bad
//! value degrades to its default instead of failing.

use crate::{
    entities::{Setting, setting},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{Set, prelude::*};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Maintenance flag, `0` | `1`.
pub const MAINTENANCE_ENABLED_KEY: &str = "maintenance_mode_wp_enabled";
/// Coming-soon flag, `0` | `1`.
pub const COMING_SOON_KEY: &str = "maintenance_mode_wp_coming_soon";
/// Launch date as submitted, or empty.
pub const LAUNCH_DATE_KEY: &str = "maintenance_mode_wp_date";
/// Landing document id, or `0`.
pub const LANDING_DOCUMENT_KEY: &str = "maintenance_mode_wp_cpt_id";
/// Timestamp of the first activation; its presence means setup already ran.
pub const ACTIVATED_KEY: &str = "maintenance_mode_wp_activated";

/// Every setting with its first-activation default.
pub const DEFAULTS: [(&str, &str); 4] = [
    (MAINTENANCE_ENABLED_KEY, "0"),
    (COMING_SOON_KEY, "0"),
    (LAUNCH_DATE_KEY, ""),
    (LANDING_DOCUMENT_KEY, "0"),
];

/// Key/value persistence the gate depends on.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces the value for `key`.
    async fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Returns the stored value or `default` when absent.
    async fn get_setting_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .get_setting(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl SettingsStore for DatabaseConnection {
    #[instrument(skip(self))]
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = Setting::find()
            .filter(setting::Column::Key.eq(key))
            .one(self)
            .await?
            .map(|row| row.value);
        debug!("Setting '{}': {:?}", key, value);
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().naive_utc();

        let existing = Setting::find()
            .filter(setting::Column::Key.eq(key))
            .one(self)
            .await?;

        if let Some(row) = existing {
            let mut active_model: setting::ActiveModel = row.into();
            active_model.value = Set(value.to_string());
            active_model.updated_at = Set(now);
            active_model.update(self).await?;
        } else {
            let new_row = setting::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
                ..Default::default()
            };
            new_row.insert(self).await?;
        }

        debug!("Set setting: {} = {}", key, value);
        Ok(())
    }
}

/// Writes `value` only when `key` has never been written.
///
/// # Returns
/// `true` when the value was written, `false` when a value already existed
/// (even an empty one).
///
/// # Errors
/// Returns an error if the store read or write fails.
pub async fn set_setting_if_absent<S>(store: &S, key: &str, value: &str) -> Result<bool>
where
    S: SettingsStore + ?Sized,
{
    if store.get_setting(key).await?.is_some() {
        return Ok(false);
    }
    store.set_setting(key, value).await?;
    Ok(true)
}

/// Host truthiness: empty and `"0"` are false, anything else is true.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    !(value.is_empty() || value == "0")
}

/// Parses an integer the way a lenient cast does.
///
/// Leading whitespace and an optional sign are accepted, digits are read
/// until the first non-digit, and anything unparseable is `0`. Out of range
/// values saturate.
#[must_use]
pub fn coerce_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut result: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(byte - b'0');
        result = result.saturating_mul(10).saturating_add(digit);
    }

    if negative { result.saturating_neg() } else { result }
}

/// Snapshot of the persisted gate settings, passed explicitly to the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GateSettings {
    /// Serve 503 landing content to anonymous visitors
    pub maintenance_enabled: bool,
    /// Serve 200 landing content to anonymous visitors
    pub coming_soon_enabled: bool,
    /// Operator-entered launch date, `None` when empty
    pub launch_date: Option<String>,
    /// Landing document id, `0` when unset
    pub landing_document_id: i64,
}

impl GateSettings {
    /// Reads all four settings, applying defaults for absent keys.
    ///
    /// # Defaults
    /// * flags: off
    /// * `launch_date`: `None` (also for an empty stored value)
    /// * `landing_document_id`: 0
    ///
    /// # Errors
    /// Returns an error if a store read fails.
    pub async fn load<S>(store: &S) -> Result<Self>
    where
        S: SettingsStore + ?Sized,
    {
        let maintenance = store.get_setting_or(MAINTENANCE_ENABLED_KEY, "0").await?;
        let coming_soon = store.get_setting_or(COMING_SOON_KEY, "0").await?;
        let launch_date = store.get_setting_or(LAUNCH_DATE_KEY, "").await?;
        let landing_id = store.get_setting_or(LANDING_DOCUMENT_KEY, "0").await?;

        let launch_date = launch_date.trim();
        Ok(Self {
            maintenance_enabled: is_truthy(&maintenance),
            coming_soon_enabled: is_truthy(&coming_soon),
            launch_date: (!launch_date.is_empty()).then(|| launch_date.to_string()),
            landing_document_id: coerce_int(&landing_id),
        })
    }
}

/// Raw settings form submission.
///
/// Fields are `None` when the form did not submit them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsInput {
    /// Submitted maintenance flag
    pub maintenance_enabled: Option<String>,
    /// Submitted coming-soon flag
    pub coming_soon_enabled: Option<String>,
    /// Submitted launch date
    pub launch_date: Option<String>,
    /// Submitted landing document id
    pub landing_document_id: Option<String>,
}

impl SettingsInput {
    /// Builds the input from decoded form pairs; the last value of a
    /// repeated key wins, unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut input = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                MAINTENANCE_ENABLED_KEY => &mut input.maintenance_enabled,
                COMING_SOON_KEY => &mut input.coming_soon_enabled,
                LAUNCH_DATE_KEY => &mut input.launch_date,
                LANDING_DOCUMENT_KEY => &mut input.landing_document_id,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        input
    }

    /// Coerces the submission into the values that will be persisted.
    #[must_use]
    pub fn normalize(&self) -> [(&'static str, String); 4] {
        let flag = |value: Option<&String>| {
            let on = value.is_some_and(|v| is_truthy(v));
            String::from(if on { "1" } else { "0" })
        };

        [
            (MAINTENANCE_ENABLED_KEY, flag(self.maintenance_enabled.as_ref())),
            (COMING_SOON_KEY, flag(self.coming_soon_enabled.as_ref())),
            (
                LAUNCH_DATE_KEY,
                self.launch_date
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
            ),
            (
                LANDING_DOCUMENT_KEY,
                coerce_int(self.landing_document_id.as_deref().unwrap_or_default()).to_string(),
            ),
        ]
    }
}

/// Persists a settings form submission and returns the resulting settings.
///
/// Saving the same input twice leaves the store in the same state.
///
/// # Arguments
/// * `store` - Settings store
/// * `input` - Submitted form fields; missing flags are stored as `"0"`
///
/// # Errors
/// Returns an error if a store write fails. Earlier keys may already have
/// been written at that point.
pub async fn save_settings<S>(store: &S, input: &SettingsInput) -> Result<GateSettings>
where
    S: SettingsStore + ?Sized,
{
    for (key, value) in input.normalize() {
        store.set_setting(key, &value).await?;
    }
    let saved = GateSettings::load(store).await?;
    info!(
        "Saved gate settings: maintenance={} coming_soon={} launch_date={:?} landing_document={}",
        saved.maintenance_enabled,
        saved.coming_soon_enabled,
        saved.launch_date,
        saved.landing_document_id
    );
    Ok(saved)
}
