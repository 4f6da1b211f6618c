use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*, upsert::excluded};
use std::sync::Arc;

use crate::domain::{
    entities::admin_settings::{AdminSettingEntity, UpsertAdminSettingEntity},
    repositories::admin_settings::AdminSettingsRepository,
};
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::admin_settings};

pub struct AdminSettingsPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AdminSettingsPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AdminSettingsRepository for AdminSettingsPostgres {
    async fn list(&self, keys: Vec<String>) -> Result<Vec<AdminSettingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = if keys.is_empty() {
            admin_settings::table
                .select(AdminSettingEntity::as_select())
                .load::<AdminSettingEntity>(&mut conn)?
        } else {
            admin_settings::table
                .filter(admin_settings::key.eq_any(keys))
                .select(AdminSettingEntity::as_select())
                .load::<AdminSettingEntity>(&mut conn)?
        };

        Ok(results)
    }

    async fn upsert(
        &self,
        settings: Vec<UpsertAdminSettingEntity>,
    ) -> Result<Vec<AdminSettingEntity>> {
        if settings.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = insert_into(admin_settings::table)
            .values(&settings)
            .on_conflict(admin_settings::key)
            .do_update()
            .set((
                admin_settings::value.eq(excluded(admin_settings::value)),
                admin_settings::updated_at.eq(excluded(admin_settings::updated_at)),
            ))
            .returning(AdminSettingEntity::as_returning())
            .get_results::<AdminSettingEntity>(&mut conn)?;

        Ok(results)
    }
}
