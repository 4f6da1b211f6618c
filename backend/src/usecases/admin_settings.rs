use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use crates::domain::{
    entities::admin_settings::{AdminSettingEntity, UpsertAdminSettingEntity},
    repositories::admin_settings::AdminSettingsRepository,
    value_objects::{
        admin_settings::{
            DASHBOARD_SETTING_KEYS, PROGRAM_START_DATE_KEY, TELEGRAM_SEND_TIME_KEY,
            normalize_settings, validate_setting,
        },
        capabilities::SchemaCapabilities,
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Invalid(String),
    #[error("admin_settings table is missing; run the SQL setup for admin_settings")]
    SchemaNotReady,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SettingsError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SettingsError::Invalid(_) => StatusCode::BAD_REQUEST,
            SettingsError::SchemaNotReady => StatusCode::SERVICE_UNAVAILABLE,
            SettingsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SettingsError>;

/// Settings the dashboard reads, with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSettings {
    pub telegram_send_time: String,
    pub program_start_date: Option<String>,
}

impl DashboardSettings {
    pub fn from_rows(rows: &[AdminSettingEntity], default_send_time: &str) -> Self {
        let value_of = |key: &str| {
            rows.iter()
                .find(|row| row.key == key)
                .map(|row| row.value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            telegram_send_time: value_of(TELEGRAM_SEND_TIME_KEY)
                .filter(|value| validate_setting(TELEGRAM_SEND_TIME_KEY, value).is_ok())
                .unwrap_or_else(|| default_send_time.to_string()),
            program_start_date: value_of(PROGRAM_START_DATE_KEY),
        }
    }
}

pub struct SettingsUseCase<S>
where
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    settings_repo: Arc<S>,
    capabilities: SchemaCapabilities,
    default_send_time: String,
}

impl<S> SettingsUseCase<S>
where
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    pub fn new(
        settings_repo: Arc<S>,
        capabilities: SchemaCapabilities,
        default_send_time: String,
    ) -> Self {
        Self {
            settings_repo,
            capabilities,
            default_send_time,
        }
    }

    pub async fn get(&self, keys: Vec<String>) -> UseCaseResult<Vec<AdminSettingEntity>> {
        if !self.capabilities.admin_settings_table {
            warn!("settings: admin_settings table is missing, returning no settings");
            return Ok(Vec::new());
        }

        self.settings_repo.list(keys).await.map_err(|err| {
            error!(db_error = ?err, "settings: failed to load settings");
            SettingsError::Internal(err)
        })
    }

    pub async fn dashboard_settings(&self) -> UseCaseResult<DashboardSettings> {
        let keys = DASHBOARD_SETTING_KEYS.iter().map(|key| key.to_string()).collect();
        let rows = self.get(keys).await?;
        Ok(DashboardSettings::from_rows(&rows, &self.default_send_time))
    }

    /// Validates then upserts every non-empty pair; nothing is written if
    /// any value is malformed.
    pub async fn update(
        &self,
        settings: BTreeMap<String, String>,
    ) -> UseCaseResult<Vec<AdminSettingEntity>> {
        if !self.capabilities.admin_settings_table {
            return Err(SettingsError::SchemaNotReady);
        }

        let now = Utc::now();
        let mut rows = Vec::new();
        for (key, value) in normalize_settings(settings) {
            validate_setting(&key, &value).map_err(SettingsError::Invalid)?;
            rows.push(UpsertAdminSettingEntity {
                key,
                value,
                updated_at: now,
            });
        }

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = rows.iter().map(|row| row.key.clone()).collect();
        let saved = self.settings_repo.upsert(rows).await.map_err(|err| {
            error!(db_error = ?err, "settings: failed to save settings");
            SettingsError::Internal(err)
        })?;

        info!(?keys, "settings: saved");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::admin_settings::MockAdminSettingsRepository;

    fn row(key: &str, value: &str) -> AdminSettingEntity {
        AdminSettingEntity {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_table_reads_as_empty() {
        let mut capabilities = SchemaCapabilities::full();
        capabilities.admin_settings_table = false;
        let mut repo = MockAdminSettingsRepository::new();
        repo.expect_list().never();

        let usecase = SettingsUseCase::new(Arc::new(repo), capabilities, "07:00".to_string());

        let settings = usecase.dashboard_settings().await.unwrap();
        assert_eq!(settings.telegram_send_time, "07:00");
        assert!(settings.program_start_date.is_none());
    }

    #[tokio::test]
    async fn stored_send_time_overrides_default() {
        let mut repo = MockAdminSettingsRepository::new();
        repo.expect_list()
            .returning(|_| Ok(vec![row("telegram_send_time", "06:15"), row("program_start_date", "2024-09-01")]));

        let settings = SettingsUseCase::new(Arc::new(repo), SchemaCapabilities::full(), "07:00".to_string())
            .dashboard_settings()
            .await
            .unwrap();

        assert_eq!(settings.telegram_send_time, "06:15");
        assert_eq!(settings.program_start_date.as_deref(), Some("2024-09-01"));
    }

    #[tokio::test]
    async fn update_rejects_malformed_values_without_writing() {
        let mut repo = MockAdminSettingsRepository::new();
        repo.expect_upsert().never();

        let err = SettingsUseCase::new(Arc::new(repo), SchemaCapabilities::full(), "07:00".to_string())
            .update(BTreeMap::from([
                ("telegram_send_time".to_string(), "7h".to_string()),
                ("program_start_date".to_string(), "2024-09-01".to_string()),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[tokio::test]
    async fn update_skips_blank_values() {
        let mut repo = MockAdminSettingsRepository::new();
        repo.expect_upsert()
            .withf(|rows| rows.len() == 1 && rows[0].key == "telegram_send_time" && rows[0].value == "08:30")
            .times(1)
            .returning(|rows| {
                Ok(rows
                    .into_iter()
                    .map(|r| AdminSettingEntity {
                        key: r.key,
                        value: r.value,
                        updated_at: r.updated_at,
                    })
                    .collect())
            });

        let saved = SettingsUseCase::new(Arc::new(repo), SchemaCapabilities::full(), "07:00".to_string())
            .update(BTreeMap::from([
                ("telegram_send_time".to_string(), " 08:30 ".to_string()),
                ("program_start_date".to_string(), "   ".to_string()),
            ]))
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn update_collapses_keys_that_differ_only_by_whitespace() {
        let mut repo = MockAdminSettingsRepository::new();
        repo.expect_upsert()
            .withf(|rows| rows.len() == 1 && rows[0].key == "telegram_send_time")
            .times(1)
            .returning(|_| Ok(Vec::new()));

        SettingsUseCase::new(Arc::new(repo), SchemaCapabilities::full(), "07:00".to_string())
            .update(BTreeMap::from([
                ("telegram_send_time".to_string(), "08:30".to_string()),
                (" telegram_send_time".to_string(), "09:00".to_string()),
            ]))
            .await
            .unwrap();
    }
}
