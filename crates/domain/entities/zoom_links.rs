use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{daily_zoom_links, zoom_links};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = zoom_links)]
pub struct ZoomLinkEntity {
    pub id: Uuid,
    pub url: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = zoom_links)]
pub struct InsertZoomLinkEntity {
    pub url: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = daily_zoom_links)]
pub struct DailyZoomLinkEntity {
    pub id: Uuid,
    pub zoom_link_id: Option<Uuid>,
    pub scheduled_for: NaiveDate,
    pub telegram_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_zoom_links)]
pub struct InsertDailyZoomLinkEntity {
    pub zoom_link_id: Option<Uuid>,
    pub scheduled_for: NaiveDate,
    pub telegram_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A day's row joined with the link it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyZoomLinkDetails {
    #[serde(flatten)]
    pub daily: DailyZoomLinkEntity,
    pub zoom_link: Option<ZoomLinkEntity>,
}

impl DailyZoomLinkDetails {
    /// The referenced link, provided it is still part of the active pool.
    pub fn active_link(&self) -> Option<&ZoomLinkEntity> {
        self.zoom_link.as_ref().filter(|link| link.is_active)
    }

    pub fn is_sent(&self) -> bool {
        self.daily.telegram_sent_at.is_some()
    }
}
