use serde::{Deserialize, Serialize};

use crate::domain::entities::members::MemberEntity;
use crate::domain::value_objects::enums::member_statuses::MemberStatus;

/// Fixed reason recorded by the inactivity sweep.
pub const INACTIVITY_DROP_REASON: &str = "No gratitude entry or homework submission for one day";

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberListFilter {
    #[default]
    All,
    Active,
    Dropped,
}

impl MemberListFilter {
    pub fn status(&self) -> Option<MemberStatus> {
        match self {
            MemberListFilter::All => None,
            MemberListFilter::Active => Some(MemberStatus::Active),
            MemberListFilter::Dropped => Some(MemberStatus::Dropped),
        }
    }

    pub fn matches(&self, member: &MemberEntity) -> bool {
        match self.status() {
            None => true,
            Some(status) => member.status() == Some(status),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMembersQuery {
    #[serde(default)]
    pub status: MemberListFilter,
    pub search: Option<String>,
}

/// Case-insensitive keyword match over name, email, telegram handle and phone.
pub fn member_matches_search(member: &MemberEntity, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return true;
    }

    [
        member.full_name.as_deref(),
        Some(member.email.as_str()),
        member.telegram.as_deref(),
        member.phone.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|value| value.to_lowercase().contains(&keyword))
}

/// Newest approval first, falling back to start date then creation time.
pub fn sort_members_by_recent_approval(members: &mut [MemberEntity]) {
    members.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
}

#[derive(Debug, Clone, Deserialize)]
pub struct DropMemberModel {
    pub reason: String,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmModel {
    #[serde(default)]
    pub confirm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use uuid::Uuid;

    fn member(name: &str, email: &str) -> MemberEntity {
        MemberEntity {
            id: Uuid::new_v4(),
            full_name: Some(name.to_string()),
            email: email.to_string(),
            phone: Some("0901234567".to_string()),
            telegram: Some("@lan_nguyen".to_string()),
            birth_year: Some(1995),
            status: MemberStatus::Active.to_string(),
            drop_reason: None,
            applicant_id: None,
            approved_at: None,
            start_date: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn search_matches_any_contact_field_ignoring_case() {
        let m = member("Nguyen Thi Lan", "lan@example.com");

        assert!(member_matches_search(&m, "LAN"));
        assert!(member_matches_search(&m, "0901"));
        assert!(member_matches_search(&m, "@lan_"));
        assert!(member_matches_search(&m, "  "));
        assert!(!member_matches_search(&m, "minh"));
    }

    #[test]
    fn filter_keeps_only_requested_status() {
        let active = member("A", "a@example.com");
        let mut dropped = member("B", "b@example.com");
        dropped.status = MemberStatus::Dropped.to_string();

        assert!(MemberListFilter::Active.matches(&active));
        assert!(!MemberListFilter::Active.matches(&dropped));
        assert!(MemberListFilter::Dropped.matches(&dropped));
        assert!(MemberListFilter::All.matches(&dropped));
    }

    #[test]
    fn sorts_by_approval_then_start_date_then_created_at() {
        let now = Utc::now();

        let mut approved_recently = member("A", "a@example.com");
        approved_recently.approved_at = Some(now);

        let mut started_last_week = member("B", "b@example.com");
        started_last_week.start_date = Some((now - Duration::days(7)).date_naive());

        let mut created_long_ago = member("C", "c@example.com");
        created_long_ago.created_at = now - Duration::days(30);

        let mut members = vec![
            created_long_ago.clone(),
            started_last_week.clone(),
            approved_recently.clone(),
        ];
        sort_members_by_recent_approval(&mut members);

        assert_eq!(members[0].id, approved_recently.id);
        assert_eq!(members[1].id, started_last_week.id);
        assert_eq!(members[2].id, created_long_ago.id);
    }

    #[test]
    fn drop_date_uses_last_update() {
        let mut m = member("A", "a@example.com");
        m.status = MemberStatus::Dropped.to_string();
        m.start_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        m.updated_at = Some(
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
                .and_utc(),
        );

        assert_eq!(m.drop_date(), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(m.challenge_start_date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
