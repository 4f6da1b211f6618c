use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::infra::db::postgres::schema::admin_settings;

#[derive(Debug, Clone, PartialEq, Selectable, Queryable, Serialize)]
#[diesel(table_name = admin_settings)]
pub struct AdminSettingEntity {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_settings)]
pub struct UpsertAdminSettingEntity {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
