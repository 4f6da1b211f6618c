use std::sync::Arc;

use crates::domain::{
    entities::members::MemberEntity,
    repositories::members::MemberRepository,
    value_objects::{
        enums::member_statuses::MemberStatus,
        members::{ListMembersQuery, member_matches_search, sort_members_by_recent_approval},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MemberError {
    #[error("member not found")]
    NotFound,
    #[error("a drop reason is required")]
    DropReasonRequired,
    #[error("cannot {action} a member whose status is {status}")]
    InvalidTransition {
        action: &'static str,
        status: String,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MemberError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            MemberError::NotFound => StatusCode::NOT_FOUND,
            MemberError::DropReasonRequired => StatusCode::BAD_REQUEST,
            MemberError::InvalidTransition { .. } => StatusCode::CONFLICT,
            MemberError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, MemberError>;

pub struct MemberUseCase<M>
where
    M: MemberRepository + Send + Sync + 'static,
{
    member_repo: Arc<M>,
}

impl<M> MemberUseCase<M>
where
    M: MemberRepository + Send + Sync + 'static,
{
    pub fn new(member_repo: Arc<M>) -> Self {
        Self { member_repo }
    }

    /// Members matching the filter and keyword, most recently approved first.
    pub async fn list(&self, query: &ListMembersQuery) -> UseCaseResult<Vec<MemberEntity>> {
        let mut members = self
            .member_repo
            .list(query.status.status())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "members: failed to list members");
                MemberError::Internal(err)
            })?;

        if let Some(keyword) = query.search.as_deref() {
            members.retain(|member| member_matches_search(member, keyword));
        }
        sort_members_by_recent_approval(&mut members);

        info!(count = members.len(), filter = ?query.status, "members: listed");
        Ok(members)
    }

    pub async fn drop_member(&self, member_id: Uuid, reason: &str) -> UseCaseResult<MemberEntity> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(MemberError::DropReasonRequired);
        }

        let member = self.load(member_id).await?;
        if member.is_dropped() {
            return Err(MemberError::InvalidTransition {
                action: "drop",
                status: member.status,
            });
        }

        let member = self
            .member_repo
            .update_status(member_id, MemberStatus::Dropped, Some(reason.to_string()))
            .await
            .map_err(|err| {
                error!(%member_id, db_error = ?err, "members: failed to drop member");
                MemberError::Internal(err)
            })?;

        info!(%member_id, reason, "members: dropped");
        Ok(member)
    }

    pub async fn restore(&self, member_id: Uuid) -> UseCaseResult<MemberEntity> {
        let member = self.load(member_id).await?;
        if !member.is_dropped() {
            return Err(MemberError::InvalidTransition {
                action: "restore",
                status: member.status,
            });
        }

        let member = self
            .member_repo
            .update_status(member_id, MemberStatus::Active, None)
            .await
            .map_err(|err| {
                error!(%member_id, db_error = ?err, "members: failed to restore member");
                MemberError::Internal(err)
            })?;

        info!(%member_id, "members: restored");
        Ok(member)
    }

    async fn load(&self, member_id: Uuid) -> UseCaseResult<MemberEntity> {
        self.member_repo
            .find_by_id(member_id)
            .await
            .map_err(|err| {
                error!(%member_id, db_error = ?err, "members: failed to load member");
                MemberError::Internal(err)
            })?
            .ok_or(MemberError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crates::domain::{
        repositories::members::MockMemberRepository, value_objects::members::MemberListFilter,
    };
    use mockall::predicate::eq;

    fn member(status: &str, name: &str, approved_days_ago: i64) -> MemberEntity {
        let now = Utc::now();
        MemberEntity {
            id: Uuid::new_v4(),
            full_name: Some(name.to_string()),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            telegram: None,
            birth_year: None,
            status: status.to_string(),
            drop_reason: None,
            applicant_id: None,
            approved_at: Some(now - Duration::days(approved_days_ago)),
            start_date: None,
            created_at: now - Duration::days(90),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn list_filters_by_keyword_and_sorts_by_approval() {
        let older = member("active", "Lan", 10);
        let newer = member("active", "Lanh", 1);
        let other = member("active", "Minh", 0);
        let rows = vec![older.clone(), other, newer.clone()];

        let mut repo = MockMemberRepository::new();
        repo.expect_list()
            .with(eq(Some(MemberStatus::Active)))
            .returning(move |_| Ok(rows.clone()));

        let members = MemberUseCase::new(Arc::new(repo))
            .list(&ListMembersQuery {
                status: MemberListFilter::Active,
                search: Some("  LAN ".to_string()),
            })
            .await
            .unwrap();

        let ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn drop_requires_a_reason_before_touching_storage() {
        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id().never();

        let err = MemberUseCase::new(Arc::new(repo))
            .drop_member(Uuid::new_v4(), "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, MemberError::DropReasonRequired));
    }

    #[tokio::test]
    async fn drop_trims_reason_and_marks_dropped() {
        let current = member("active", "Lan", 3);
        let member_id = current.id;
        let mut dropped = current.clone();
        dropped.status = "dropped".to_string();
        dropped.drop_reason = Some("skipped homework".to_string());

        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id()
            .with(eq(member_id))
            .returning(move |_| Ok(Some(current.clone())));
        repo.expect_update_status()
            .with(
                eq(member_id),
                eq(MemberStatus::Dropped),
                eq(Some("skipped homework".to_string())),
            )
            .times(1)
            .returning(move |_, _, _| Ok(dropped.clone()));

        let member = MemberUseCase::new(Arc::new(repo))
            .drop_member(member_id, "  skipped homework \n")
            .await
            .unwrap();

        assert!(member.is_dropped());
    }

    #[tokio::test]
    async fn dropping_a_dropped_member_is_rejected() {
        let current = member("dropped", "Lan", 3);
        let member_id = current.id;

        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        repo.expect_update_status().never();

        let err = MemberUseCase::new(Arc::new(repo))
            .drop_member(member_id, "again")
            .await
            .unwrap_err();

        assert!(matches!(err, MemberError::InvalidTransition { action: "drop", .. }));
    }

    #[tokio::test]
    async fn restore_only_applies_to_dropped_members() {
        let paused = member("paused", "Lan", 3);
        let member_id = paused.id;

        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(paused.clone())));
        repo.expect_update_status().never();

        let err = MemberUseCase::new(Arc::new(repo))
            .restore(member_id)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn restore_reactivates_and_clears_reason() {
        let mut current = member("dropped", "Lan", 3);
        current.drop_reason = Some("inactive".to_string());
        let member_id = current.id;
        let mut restored = current.clone();
        restored.status = "active".to_string();
        restored.drop_reason = None;

        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        repo.expect_update_status()
            .with(eq(member_id), eq(MemberStatus::Active), eq(None))
            .returning(move |_, _, _| Ok(restored.clone()));

        let member = MemberUseCase::new(Arc::new(repo))
            .restore(member_id)
            .await
            .unwrap();

        assert_eq!(member.status, "active");
        assert!(member.drop_reason.is_none());
    }
}
