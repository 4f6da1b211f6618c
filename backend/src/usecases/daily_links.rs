use std::{collections::HashSet, sync::Arc};

use chrono::{NaiveDate, Utc};
use crates::domain::{
    entities::zoom_links::{DailyZoomLinkDetails, ZoomLinkEntity},
    repositories::zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
    value_objects::{capabilities::SchemaCapabilities, zoom_links::normalize_link_lines},
};
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DailyLinkError {
    #[error("zoom link tables are missing; run the SQL setup for zoom_links and daily_zoom_links")]
    SchemaNotReady,
    #[error("zoom link not found in the active pool")]
    LinkNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DailyLinkError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            DailyLinkError::SchemaNotReady => StatusCode::SERVICE_UNAVAILABLE,
            DailyLinkError::LinkNotFound => StatusCode::NOT_FOUND,
            DailyLinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, DailyLinkError>;

pub struct DailyLinkUseCase<Z, D>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    zoom_link_repo: Arc<Z>,
    daily_link_repo: Arc<D>,
    capabilities: SchemaCapabilities,
}

impl<Z, D> DailyLinkUseCase<Z, D>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    pub fn new(
        zoom_link_repo: Arc<Z>,
        daily_link_repo: Arc<D>,
        capabilities: SchemaCapabilities,
    ) -> Self {
        Self {
            zoom_link_repo,
            daily_link_repo,
            capabilities,
        }
    }

    fn ensure_ready(&self) -> UseCaseResult<()> {
        if self.capabilities.link_pool_ready() {
            Ok(())
        } else {
            Err(DailyLinkError::SchemaNotReady)
        }
    }

    /// Active links, oldest first.
    pub async fn list_pool(&self) -> UseCaseResult<Vec<ZoomLinkEntity>> {
        self.ensure_ready()?;
        self.zoom_link_repo.list_active().await.map_err(|err| {
            error!(db_error = ?err, "daily_links: failed to list link pool");
            DailyLinkError::Internal(err)
        })
    }

    /// Replaces the active pool with the pasted lines.
    ///
    /// Links that disappear are deactivated rather than deleted so past
    /// days keep their reference.
    pub async fn sync_pool(&self, raw_links: &str) -> UseCaseResult<Vec<ZoomLinkEntity>> {
        let wanted = normalize_link_lines(raw_links);
        let current = self.list_pool().await?;

        let wanted_set: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let current_set: HashSet<&str> = current.iter().map(|link| link.url.as_str()).collect();

        let stale: Vec<Uuid> = current
            .iter()
            .filter(|link| !wanted_set.contains(link.url.as_str()))
            .map(|link| link.id)
            .collect();
        let fresh: Vec<String> = wanted
            .iter()
            .filter(|url| !current_set.contains(url.as_str()))
            .cloned()
            .collect();

        if !stale.is_empty() {
            let deactivated = self
                .zoom_link_repo
                .deactivate_links(stale)
                .await
                .map_err(|err| {
                    error!(db_error = ?err, "daily_links: failed to deactivate stale links");
                    DailyLinkError::Internal(err)
                })?;
            info!(deactivated, "daily_links: stale links deactivated");
        }

        if !fresh.is_empty() {
            let inserted = self
                .zoom_link_repo
                .insert_links(fresh)
                .await
                .map_err(|err| {
                    error!(db_error = ?err, "daily_links: failed to insert links");
                    DailyLinkError::Internal(err)
                })?;
            info!(inserted, "daily_links: links inserted");
        }

        self.list_pool().await
    }

    pub async fn find_for_date(&self, date: NaiveDate) -> UseCaseResult<Option<DailyZoomLinkDetails>> {
        self.ensure_ready()?;
        self.daily_link_repo.find_for_date(date).await.map_err(|err| {
            error!(scheduled_for = %date, db_error = ?err, "daily_links: failed to load daily link");
            DailyLinkError::Internal(err)
        })
    }

    /// Returns the link for `date`, picking one at random if the day has
    /// none yet. Concurrent callers converge on the first stored pick.
    pub async fn ensure_for_date(&self, date: NaiveDate) -> UseCaseResult<Option<DailyZoomLinkDetails>> {
        let pool = self.list_pool().await?;
        self.ensure_with_pool(date, &pool).await
    }

    /// Same as `ensure_for_date` with an already loaded pool.
    pub async fn ensure_with_pool(
        &self,
        date: NaiveDate,
        pool: &[ZoomLinkEntity],
    ) -> UseCaseResult<Option<DailyZoomLinkDetails>> {
        if let Some(existing) = self.find_for_date(date).await? {
            if existing.active_link().is_some() {
                return Ok(Some(existing));
            }
            warn!(scheduled_for = %date, "daily_links: stored link is missing or inactive");
        }

        let chosen = {
            let mut rng = rand::thread_rng();
            pool.choose(&mut rng).map(|link| link.id)
        };
        let Some(chosen) = chosen else {
            warn!(scheduled_for = %date, "daily_links: link pool is empty");
            return Ok(None);
        };

        let active_ids: Vec<Uuid> = pool.iter().map(|link| link.id).collect();
        let details = self
            .daily_link_repo
            .assign_if_unassigned(date, chosen, active_ids)
            .await
            .map_err(|err| {
                error!(scheduled_for = %date, db_error = ?err, "daily_links: failed to assign daily link");
                DailyLinkError::Internal(err)
            })?;

        info!(
            scheduled_for = %date,
            zoom_link_id = ?details.daily.zoom_link_id,
            "daily_links: daily link resolved"
        );
        Ok(Some(details))
    }

    /// Pins `zoom_link_id` to `date`, replacing any earlier pick.
    pub async fn assign_for_date(
        &self,
        zoom_link_id: Uuid,
        date: NaiveDate,
    ) -> UseCaseResult<DailyZoomLinkDetails> {
        let pool = self.list_pool().await?;
        if !pool.iter().any(|link| link.id == zoom_link_id) {
            return Err(DailyLinkError::LinkNotFound);
        }

        let details = self
            .daily_link_repo
            .upsert_for_date(date, zoom_link_id)
            .await
            .map_err(|err| {
                error!(scheduled_for = %date, %zoom_link_id, db_error = ?err, "daily_links: failed to assign link");
                DailyLinkError::Internal(err)
            })?;

        info!(scheduled_for = %date, %zoom_link_id, "daily_links: link assigned manually");
        Ok(details)
    }

    pub async fn mark_sent(&self, daily_zoom_link_id: Uuid) -> UseCaseResult<DailyZoomLinkDetails> {
        self.daily_link_repo
            .mark_sent(daily_zoom_link_id, Utc::now())
            .await
            .map_err(|err| {
                error!(%daily_zoom_link_id, db_error = ?err, "daily_links: failed to record telegram send");
                DailyLinkError::Internal(err)
            })
    }
}
