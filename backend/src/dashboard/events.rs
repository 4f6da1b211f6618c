use crates::domain::entities::{
    applicants::ApplicantEntity,
    members::MemberEntity,
    zoom_links::{DailyZoomLinkDetails, ZoomLinkEntity},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{dashboard::state::DashboardState, usecases::admin_settings::DashboardSettings};

/// Everything that can change what the dashboard shows. User commands and
/// database change notifications both arrive as one of these.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardEvent {
    Loaded(Box<DashboardState>),
    ApplicantInserted(ApplicantEntity),
    ApplicantUpdated(ApplicantEntity),
    ApplicantDeleted { id: Uuid },
    ApplicantsApproved {
        applicant_ids: Vec<Uuid>,
        members: Vec<MemberEntity>,
    },
    MemberUpserted(MemberEntity),
    ZoomLinksReplaced(Vec<ZoomLinkEntity>),
    DailyLinkResolved(Option<DailyZoomLinkDetails>),
    SettingsUpdated(DashboardSettings),
}

impl DashboardEvent {
    /// SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardEvent::Loaded(_) => "loaded",
            DashboardEvent::ApplicantInserted(_) => "applicant_inserted",
            DashboardEvent::ApplicantUpdated(_) => "applicant_updated",
            DashboardEvent::ApplicantDeleted { .. } => "applicant_deleted",
            DashboardEvent::ApplicantsApproved { .. } => "applicants_approved",
            DashboardEvent::MemberUpserted(_) => "member_upserted",
            DashboardEvent::ZoomLinksReplaced(_) => "zoom_links_replaced",
            DashboardEvent::DailyLinkResolved(_) => "daily_link_resolved",
            DashboardEvent::SettingsUpdated(_) => "settings_updated",
        }
    }
}
