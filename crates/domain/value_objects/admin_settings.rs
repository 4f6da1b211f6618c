use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::value_objects::zoom_links::parse_send_time;

pub const TELEGRAM_SEND_TIME_KEY: &str = "telegram_send_time";
pub const PROGRAM_START_DATE_KEY: &str = "program_start_date";
pub const INACTIVITY_SWEEP_LAST_DATE_KEY: &str = "inactivity_sweep_last_date";
pub const DEFAULT_SEND_TIME: &str = "07:00";

pub const DASHBOARD_SETTING_KEYS: [&str; 2] = [TELEGRAM_SEND_TIME_KEY, PROGRAM_START_DATE_KEY];

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingsModel {
    pub settings: BTreeMap<String, String>,
    #[serde(default)]
    pub confirm: bool,
}

/// Checks a value against the format its key requires.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        TELEGRAM_SEND_TIME_KEY => parse_send_time(value)
            .map(|_| ())
            .ok_or_else(|| format!("{key} must be HH:MM")),
        PROGRAM_START_DATE_KEY | INACTIVITY_SWEEP_LAST_DATE_KEY => {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| format!("{key} must be YYYY-MM-DD"))
        }
        _ => Ok(()),
    }
}

impl UpdateSettingsModel {
    /// Whether the request would change the program start date.
    pub fn changes_program_start_date(&self) -> bool {
        self.settings.contains_key(PROGRAM_START_DATE_KEY)
    }

    /// Trims keys and values in place, dropping blank pairs.
    pub fn normalize(mut self) -> Self {
        self.settings = normalize_settings(self.settings);
        self
    }
}

/// Trims keys and values and drops blank pairs. Keys that collapse onto the
/// same trimmed name keep a single entry, so an upsert batch never touches a
/// row twice.
pub fn normalize_settings(settings: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut normalized = BTreeMap::new();
    for (key, value) in settings {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        normalized.insert(key.to_string(), value.to_string());
    }
    normalized
}
