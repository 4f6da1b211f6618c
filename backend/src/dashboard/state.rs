use std::collections::HashSet;

use crates::domain::{
    entities::{
        applicants::ApplicantEntity,
        members::MemberEntity,
        zoom_links::{DailyZoomLinkDetails, ZoomLinkEntity},
    },
    value_objects::members::{
        ListMembersQuery, member_matches_search, sort_members_by_recent_approval,
    },
};
use serde::Serialize;

use crate::{dashboard::events::DashboardEvent, usecases::admin_settings::DashboardSettings};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub loaded: bool,
    /// Pending applicants, newest first.
    pub applicants: Vec<ApplicantEntity>,
    pub members: Vec<MemberEntity>,
    pub zoom_links: Vec<ZoomLinkEntity>,
    pub daily_link: Option<DailyZoomLinkDetails>,
    /// Set when today's link could not be resolved; the previous link stays.
    pub daily_link_error: Option<String>,
    pub settings: Option<DashboardSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub member_count: usize,
    pub pending_applicant_count: usize,
    pub zoom_link_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub applicants: Vec<ApplicantEntity>,
    pub members: Vec<MemberEntity>,
    pub zoom_links: Vec<ZoomLinkEntity>,
    pub daily_link: Option<DailyZoomLinkDetails>,
    pub daily_link_error: Option<String>,
    pub settings: Option<DashboardSettings>,
}

impl DashboardState {
    pub fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Loaded(state) => {
                let previous_link = self.daily_link.take();
                *self = *state;
                if self.daily_link_error.is_some() && self.daily_link.is_none() {
                    self.daily_link = previous_link;
                }
                self.loaded = true;
                sort_members_by_recent_approval(&mut self.members);
                self.applicants.retain(ApplicantEntity::is_pending);
            }
            DashboardEvent::ApplicantInserted(applicant)
            | DashboardEvent::ApplicantUpdated(applicant) => {
                self.applicants.retain(|existing| existing.id != applicant.id);
                if applicant.is_pending() {
                    self.applicants.push(applicant);
                }
            }
            DashboardEvent::ApplicantDeleted { id } => {
                self.applicants.retain(|existing| existing.id != id);
            }
            DashboardEvent::ApplicantsApproved {
                applicant_ids,
                members,
            } => {
                let approved: HashSet<_> = applicant_ids.into_iter().collect();
                self.applicants.retain(|existing| !approved.contains(&existing.id));
                for member in members {
                    self.upsert_member(member);
                }
            }
            DashboardEvent::MemberUpserted(member) => self.upsert_member(member),
            DashboardEvent::ZoomLinksReplaced(links) => self.zoom_links = links,
            DashboardEvent::DailyLinkResolved(daily_link) => {
                self.daily_link = daily_link;
                self.daily_link_error = None;
            }
            DashboardEvent::SettingsUpdated(settings) => self.settings = Some(settings),
        }

        self.drop_applicants_who_are_members();
        self.applicants
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    pub fn snapshot(&self, query: &ListMembersQuery) -> DashboardSnapshot {
        let mut members: Vec<MemberEntity> = self
            .members
            .iter()
            .filter(|member| query.status.matches(member))
            .cloned()
            .collect();
        let member_count = members.len();
        if let Some(keyword) = query.search.as_deref() {
            members.retain(|member| member_matches_search(member, keyword));
        }

        DashboardSnapshot {
            stats: DashboardStats {
                member_count,
                pending_applicant_count: self.applicants.len(),
                zoom_link_count: self.zoom_links.len(),
            },
            applicants: self.applicants.clone(),
            members,
            zoom_links: self.zoom_links.clone(),
            daily_link: self.daily_link.clone(),
            daily_link_error: self.daily_link_error.clone(),
            settings: self.settings.clone(),
        }
    }

    fn upsert_member(&mut self, member: MemberEntity) {
        match self.members.iter_mut().find(|existing| existing.id == member.id) {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
        sort_members_by_recent_approval(&mut self.members);
    }

    fn drop_applicants_who_are_members(&mut self) {
        let member_emails: HashSet<String> = self
            .members
            .iter()
            .map(|member| member.email.to_lowercase())
            .collect();
        self.applicants
            .retain(|applicant| !member_emails.contains(&applicant.email.to_lowercase()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crates::domain::{
        entities::zoom_links::DailyZoomLinkEntity, value_objects::members::MemberListFilter,
    };
    use uuid::Uuid;

    fn applicant(email: &str, hours_ago: i64, status: &str) -> ApplicantEntity {
        ApplicantEntity {
            id: Uuid::new_v4(),
            full_name: email.to_string(),
            email: email.to_string(),
            phone: None,
            telegram: None,
            birth_year: None,
            gender: None,
            address: None,
            joined_before: None,
            share_link: None,
            goal: None,
            discipline_rating: None,
            reason: None,
            wake_up_time: None,
            exercise_frequency: None,
            activity_level: None,
            health_condition: None,
            consent: true,
            status: status.to_string(),
            approved_at: None,
            created_at: Utc::now() - Duration::hours(hours_ago),
            updated_at: None,
        }
    }

    fn member(email: &str, status: &str, approved_hours_ago: i64) -> MemberEntity {
        MemberEntity {
            id: Uuid::new_v4(),
            full_name: Some(email.to_string()),
            email: email.to_string(),
            phone: None,
            telegram: None,
            birth_year: None,
            status: status.to_string(),
            drop_reason: None,
            applicant_id: None,
            approved_at: Some(Utc::now() - Duration::hours(approved_hours_ago)),
            start_date: None,
            created_at: Utc::now() - Duration::days(30),
            updated_at: None,
        }
    }

    fn loaded(applicants: Vec<ApplicantEntity>, members: Vec<MemberEntity>) -> DashboardState {
        let mut state = DashboardState::default();
        state.apply(DashboardEvent::Loaded(Box::new(DashboardState {
            applicants,
            members,
            ..DashboardState::default()
        })));
        state
    }

    #[test]
    fn inserted_applicants_are_deduped_and_newest_first() {
        let older = applicant("old@example.com", 5, "pending");
        let mut state = loaded(vec![older.clone()], vec![]);

        let newer = applicant("new@example.com", 1, "pending");
        state.apply(DashboardEvent::ApplicantInserted(newer.clone()));
        state.apply(DashboardEvent::ApplicantInserted(newer.clone()));

        let ids: Vec<Uuid> = state.applicants.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn updated_applicant_leaves_when_no_longer_pending() {
        let mut pending = applicant("a@example.com", 2, "pending");
        let mut state = loaded(vec![pending.clone()], vec![]);

        pending.status = "rejected".to_string();
        state.apply(DashboardEvent::ApplicantUpdated(pending));

        assert!(state.applicants.is_empty());
    }

    #[test]
    fn member_upsert_removes_matching_applicant_case_insensitively() {
        let pending = applicant("Lan@Example.com", 2, "pending");
        let mut state = loaded(vec![pending], vec![]);

        state.apply(DashboardEvent::MemberUpserted(member("lan@example.com", "active", 0)));

        assert!(state.applicants.is_empty());
        assert_eq!(state.members.len(), 1);
    }

    #[test]
    fn member_upsert_replaces_by_id_and_resorts() {
        let first = member("a@example.com", "active", 10);
        let second = member("b@example.com", "active", 5);
        let mut state = loaded(vec![], vec![first.clone(), second.clone()]);
        assert_eq!(state.members[0].id, second.id);

        let mut reapproved = first.clone();
        reapproved.approved_at = Some(Utc::now());
        state.apply(DashboardEvent::MemberUpserted(reapproved));

        assert_eq!(state.members.len(), 2);
        assert_eq!(state.members[0].id, first.id);
    }

    #[test]
    fn bulk_approval_removes_only_approved_ids() {
        let approved = applicant("ok@example.com", 3, "pending");
        let failed = applicant("fail@example.com", 2, "pending");
        let mut state = loaded(vec![approved.clone(), failed.clone()], vec![]);

        state.apply(DashboardEvent::ApplicantsApproved {
            applicant_ids: vec![approved.id],
            members: vec![member("ok@example.com", "active", 0)],
        });

        let ids: Vec<Uuid> = state.applicants.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![failed.id]);
    }

    fn daily_link() -> DailyZoomLinkDetails {
        let now = Utc::now();
        let link_id = Uuid::new_v4();
        DailyZoomLinkDetails {
            daily: DailyZoomLinkEntity {
                id: Uuid::new_v4(),
                zoom_link_id: Some(link_id),
                scheduled_for: now.date_naive(),
                telegram_sent_at: None,
                created_at: now,
                updated_at: now,
            },
            zoom_link: Some(ZoomLinkEntity {
                id: link_id,
                url: "https://zoom.us/j/1".to_string(),
                label: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            }),
        }
    }

    #[test]
    fn reload_with_failed_daily_link_keeps_the_previous_link() {
        let link = daily_link();
        let mut state = loaded(vec![], vec![]);
        state.apply(DashboardEvent::DailyLinkResolved(Some(link.clone())));

        state.apply(DashboardEvent::Loaded(Box::new(DashboardState {
            daily_link_error: Some("connection reset".to_string()),
            ..DashboardState::default()
        })));

        assert_eq!(state.daily_link, Some(link));
        let snapshot = state.snapshot(&ListMembersQuery::default());
        assert_eq!(snapshot.daily_link_error.as_deref(), Some("connection reset"));
        assert!(snapshot.daily_link.is_some());
    }

    #[test]
    fn clean_reload_replaces_the_daily_link() {
        let mut state = loaded(vec![], vec![]);
        state.apply(DashboardEvent::DailyLinkResolved(Some(daily_link())));

        state.apply(DashboardEvent::Loaded(Box::default()));

        assert!(state.daily_link.is_none());
        assert!(state.daily_link_error.is_none());
    }

    #[test]
    fn resolved_link_clears_the_error() {
        let mut state = DashboardState::default();
        state.apply(DashboardEvent::Loaded(Box::new(DashboardState {
            daily_link_error: Some("timeout".to_string()),
            ..DashboardState::default()
        })));

        state.apply(DashboardEvent::DailyLinkResolved(Some(daily_link())));

        assert!(state.daily_link_error.is_none());
        assert!(state.daily_link.is_some());
    }

    #[test]
    fn snapshot_filters_members_and_counts_stats() {
        let state = loaded(
            vec![applicant("p@example.com", 1, "pending")],
            vec![
                member("lan@example.com", "active", 1),
                member("minh@example.com", "active", 2),
                member("tuan@example.com", "dropped", 3),
            ],
        );

        let snapshot = state.snapshot(&ListMembersQuery {
            status: MemberListFilter::Active,
            search: Some("lan".to_string()),
        });

        assert_eq!(snapshot.stats.member_count, 2);
        assert_eq!(snapshot.stats.pending_applicant_count, 1);
        assert_eq!(snapshot.members.len(), 1);
        assert_eq!(snapshot.members[0].email, "lan@example.com");
    }
}
