use std::sync::Arc;

use chrono::NaiveDate;
use crates::domain::{
    repositories::{
        admin_settings::AdminSettingsRepository,
        applicants::ApplicantRepository,
        members::MemberRepository,
        zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
    },
    value_objects::enums::applicant_statuses::ApplicantStatus,
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    dashboard::state::DashboardState,
    usecases::{
        admin_settings::{SettingsError, SettingsUseCase},
        daily_links::{DailyLinkError, DailyLinkUseCase},
    },
};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            DashboardError::Settings(inner) => inner.status_code(),
            DashboardError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub const DAILY_LINK_UNAVAILABLE: &str = "could not pick today's zoom link";

/// Loads everything the dashboard page shows in one round.
pub struct DashboardUseCase<A, M, Z, D, S>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    applicant_repo: Arc<A>,
    member_repo: Arc<M>,
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
    settings: Arc<SettingsUseCase<S>>,
}

impl<A, M, Z, D, S> DashboardUseCase<A, M, Z, D, S>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    pub fn new(
        applicant_repo: Arc<A>,
        member_repo: Arc<M>,
        daily_links: Arc<DailyLinkUseCase<Z, D>>,
        settings: Arc<SettingsUseCase<S>>,
    ) -> Self {
        Self {
            applicant_repo,
            member_repo,
            daily_links,
            settings,
        }
    }

    /// Applicants, members, link pool and settings load in parallel; today's
    /// link is resolved afterwards from the loaded pool. A missing link
    /// schema leaves the pool empty; a failed daily pick is reported in
    /// `daily_link_error`.
    pub async fn load(&self, today: NaiveDate) -> Result<DashboardState, DashboardError> {
        let (applicants, members, zoom_links, settings) = tokio::try_join!(
            async {
                self.applicant_repo
                    .list_by_status(ApplicantStatus::Pending)
                    .await
                    .map_err(|err| {
                        error!(db_error = ?err, "dashboard: failed to load applicants");
                        DashboardError::Internal(err)
                    })
            },
            async {
                self.member_repo.list(None).await.map_err(|err| {
                    error!(db_error = ?err, "dashboard: failed to load members");
                    DashboardError::Internal(err)
                })
            },
            async {
                match self.daily_links.list_pool().await {
                    Ok(links) => Ok(links),
                    Err(DailyLinkError::SchemaNotReady) => {
                        warn!("dashboard: zoom link tables missing, showing empty pool");
                        Ok(Vec::new())
                    }
                    Err(err) => Err(DashboardError::Internal(anyhow::Error::new(err))),
                }
            },
            async { self.settings.dashboard_settings().await.map_err(DashboardError::from) },
        )?;

        let (daily_link, daily_link_error) = if zoom_links.is_empty() {
            (None, None)
        } else {
            match self.daily_links.ensure_with_pool(today, &zoom_links).await {
                Ok(daily_link) => (daily_link, None),
                Err(err) => {
                    warn!(scheduled_for = %today, error = %err, "dashboard: could not resolve today's link");
                    let message = match err {
                        DailyLinkError::Internal(_) => DAILY_LINK_UNAVAILABLE.to_string(),
                        other => other.to_string(),
                    };
                    (None, Some(message))
                }
            }
        };

        info!(
            applicants = applicants.len(),
            members = members.len(),
            zoom_links = zoom_links.len(),
            has_daily_link = daily_link.is_some(),
            "dashboard: loaded"
        );

        Ok(DashboardState {
            loaded: true,
            applicants,
            members,
            zoom_links,
            daily_link,
            daily_link_error,
            settings: Some(settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use crates::domain::{
        entities::zoom_links::ZoomLinkEntity,
        repositories::{
            admin_settings::MockAdminSettingsRepository, applicants::MockApplicantRepository,
            members::MockMemberRepository,
            zoom_links::{MockDailyZoomLinkRepository, MockZoomLinkRepository},
        },
        value_objects::capabilities::SchemaCapabilities,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    type TestDashboard = DashboardUseCase<
        MockApplicantRepository,
        MockMemberRepository,
        MockZoomLinkRepository,
        MockDailyZoomLinkRepository,
        MockAdminSettingsRepository,
    >;

    fn build(
        applicant_repo: MockApplicantRepository,
        member_repo: MockMemberRepository,
        zoom: MockZoomLinkRepository,
        daily: MockDailyZoomLinkRepository,
        capabilities: SchemaCapabilities,
    ) -> TestDashboard {
        let mut settings_repo = MockAdminSettingsRepository::new();
        settings_repo.expect_list().returning(|_| Ok(vec![]));
        DashboardUseCase::new(
            Arc::new(applicant_repo),
            Arc::new(member_repo),
            Arc::new(DailyLinkUseCase::new(
                Arc::new(zoom),
                Arc::new(daily),
                capabilities,
            )),
            Arc::new(SettingsUseCase::new(
                Arc::new(settings_repo),
                capabilities,
                "07:00".to_string(),
            )),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()
    }

    #[tokio::test]
    async fn missing_link_tables_still_load_the_rest() {
        let mut capabilities = SchemaCapabilities::full();
        capabilities.zoom_links_table = false;

        let mut applicant_repo = MockApplicantRepository::new();
        let mut member_repo = MockMemberRepository::new();
        applicant_repo
            .expect_list_by_status()
            .with(eq(ApplicantStatus::Pending))
            .returning(|_| Ok(vec![]));
        member_repo.expect_list().returning(|_| Ok(vec![]));

        let state = build(
            applicant_repo,
            member_repo,
            MockZoomLinkRepository::new(),
            MockDailyZoomLinkRepository::new(),
            capabilities,
        )
        .load(today())
        .await
        .unwrap();

        assert!(state.loaded);
        assert!(state.zoom_links.is_empty());
        assert!(state.daily_link.is_none());
        assert!(state.daily_link_error.is_none());
        assert_eq!(
            state.settings.map(|s| s.telegram_send_time).as_deref(),
            Some("07:00")
        );
    }

    #[tokio::test]
    async fn daily_link_failure_is_not_fatal() {
        let now = Utc::now();
        let link = ZoomLinkEntity {
            id: Uuid::new_v4(),
            url: "https://zoom.us/j/1".to_string(),
            label: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut applicant_repo = MockApplicantRepository::new();
        let mut member_repo = MockMemberRepository::new();
        let mut zoom = MockZoomLinkRepository::new();
        let mut daily = MockDailyZoomLinkRepository::new();
        applicant_repo.expect_list_by_status().returning(|_| Ok(vec![]));
        member_repo.expect_list().returning(|_| Ok(vec![]));
        zoom.expect_list_active()
            .returning(move || Ok(vec![link.clone()]));
        daily
            .expect_find_for_date()
            .returning(|_| Err(anyhow!("connection reset")));

        let state = build(
            applicant_repo,
            member_repo,
            zoom,
            daily,
            SchemaCapabilities::full(),
        )
        .load(today())
        .await
        .unwrap();

        assert_eq!(state.zoom_links.len(), 1);
        assert!(state.daily_link.is_none());
        assert_eq!(state.daily_link_error.as_deref(), Some(DAILY_LINK_UNAVAILABLE));
    }

    #[tokio::test]
    async fn member_load_failure_fails_the_dashboard() {
        let mut applicant_repo = MockApplicantRepository::new();
        let mut member_repo = MockMemberRepository::new();
        let mut zoom = MockZoomLinkRepository::new();
        applicant_repo.expect_list_by_status().returning(|_| Ok(vec![]));
        member_repo
            .expect_list()
            .returning(|_| Err(anyhow!("relation does not exist")));
        zoom.expect_list_active().returning(|| Ok(vec![]));

        let err = build(
            applicant_repo,
            member_repo,
            zoom,
            MockDailyZoomLinkRepository::new(),
            SchemaCapabilities::full(),
        )
        .load(today())
        .await
        .unwrap_err();

        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
