use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::admin_settings::{AdminSettingEntity, UpsertAdminSettingEntity};

#[automock]
#[async_trait]
pub trait AdminSettingsRepository {
    async fn list(&self, keys: Vec<String>) -> Result<Vec<AdminSettingEntity>>;
    async fn upsert(
        &self,
        settings: Vec<UpsertAdminSettingEntity>,
    ) -> Result<Vec<AdminSettingEntity>>;
}
