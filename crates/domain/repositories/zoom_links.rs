use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::zoom_links::{DailyZoomLinkDetails, ZoomLinkEntity};

#[automock]
#[async_trait]
pub trait ZoomLinkRepository {
    /// Active links, oldest first.
    async fn list_active(&self) -> Result<Vec<ZoomLinkEntity>>;
    async fn insert_links(&self, urls: Vec<String>) -> Result<usize>;
    async fn deactivate_links(&self, link_ids: Vec<Uuid>) -> Result<usize>;
}

#[automock]
#[async_trait]
pub trait DailyZoomLinkRepository {
    async fn find_for_date(&self, date: NaiveDate) -> Result<Option<DailyZoomLinkDetails>>;
    /// First writer wins: creates the day's row if missing and fills the link
    /// only when the row has none or points outside `active_link_ids`.
    async fn assign_if_unassigned(
        &self,
        date: NaiveDate,
        zoom_link_id: Uuid,
        active_link_ids: Vec<Uuid>,
    ) -> Result<DailyZoomLinkDetails>;
    /// Unconditional override; clears `telegram_sent_at`.
    async fn upsert_for_date(
        &self,
        date: NaiveDate,
        zoom_link_id: Uuid,
    ) -> Result<DailyZoomLinkDetails>;
    async fn mark_sent(
        &self,
        daily_zoom_link_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<DailyZoomLinkDetails>;
}
