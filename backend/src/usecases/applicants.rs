use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use crates::domain::{
    entities::{
        applicants::ApplicantEntity,
        members::{InsertMemberEntity, MemberEntity},
    },
    repositories::{
        applicants::ApplicantRepository, identity::IdentityProvider, members::MemberRepository,
    },
    value_objects::{
        enums::{applicant_statuses::ApplicantStatus, member_statuses::MemberStatus},
        identity::InviteOutcome,
    },
};
use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApplicantError {
    #[error("applicant not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApplicantError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ApplicantError::NotFound => StatusCode::NOT_FOUND,
            ApplicantError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ApplicantError>;

#[derive(Debug, Clone, Serialize)]
pub struct ApprovedApplicant {
    pub applicant_id: Uuid,
    pub member: MemberEntity,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedApproval {
    pub applicant_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkApproveResult {
    pub succeeded: Vec<ApprovedApplicant>,
    pub failed: Vec<FailedApproval>,
}

pub struct ApplicantUseCase<A, M, I>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    applicant_repo: Arc<A>,
    member_repo: Arc<M>,
    identity: Arc<I>,
    password_reset_redirect: Option<String>,
}

impl<A, M, I> ApplicantUseCase<A, M, I>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    pub fn new(
        applicant_repo: Arc<A>,
        member_repo: Arc<M>,
        identity: Arc<I>,
        password_reset_redirect: Option<String>,
    ) -> Self {
        Self {
            applicant_repo,
            member_repo,
            identity,
            password_reset_redirect,
        }
    }

    /// Applicants with the given status, newest first.
    pub async fn list(&self, status: ApplicantStatus) -> UseCaseResult<Vec<ApplicantEntity>> {
        let applicants = self
            .applicant_repo
            .list_by_status(status)
            .await
            .map_err(|err| {
                error!(%status, db_error = ?err, "applicants: failed to list applicants");
                ApplicantError::Internal(err)
            })?;
        info!(%status, count = applicants.len(), "applicants: listed");
        Ok(applicants)
    }

    /// Promotes an applicant to an active member.
    ///
    /// Login provisioning and removal of the applicant row are best effort:
    /// their failures are logged and the member is still returned.
    pub async fn approve(&self, applicant_id: Uuid) -> UseCaseResult<MemberEntity> {
        info!(%applicant_id, "applicants: approving");

        let applicant = self
            .applicant_repo
            .find_by_id(applicant_id)
            .await
            .map_err(|err| {
                error!(%applicant_id, db_error = ?err, "applicants: failed to load applicant");
                ApplicantError::Internal(err)
            })?
            .ok_or(ApplicantError::NotFound)?;

        let existing = self
            .member_repo
            .find_by_email(applicant.email.clone())
            .await
            .map_err(|err| {
                error!(%applicant_id, db_error = ?err, "applicants: failed to look up member by email");
                ApplicantError::Internal(err)
            })?;

        let now = Utc::now();
        let insert_member = InsertMemberEntity {
            id: existing.as_ref().map(|member| member.id).unwrap_or_else(Uuid::new_v4),
            full_name: Some(applicant.full_name.clone()),
            email: applicant.email.clone(),
            phone: applicant.phone.clone(),
            telegram: applicant.telegram.clone(),
            birth_year: applicant.birth_year,
            status: MemberStatus::Active.to_string(),
            drop_reason: None,
            applicant_id: Some(applicant.id),
            created_at: existing.as_ref().map(|member| member.created_at).unwrap_or(now),
            updated_at: Some(now),
        };

        let member = self
            .member_repo
            .upsert_approved(insert_member, now)
            .await
            .map_err(|err| {
                error!(%applicant_id, db_error = ?err, "applicants: failed to upsert member");
                ApplicantError::Internal(err)
            })?;
        info!(%applicant_id, member_id = %member.id, reused = existing.is_some(), "applicants: member upserted");

        self.applicant_repo
            .update_status(applicant_id, ApplicantStatus::Approved, Some(now))
            .await
            .map_err(|err| {
                error!(%applicant_id, db_error = ?err, "applicants: failed to mark applicant approved");
                ApplicantError::Internal(err)
            })?;

        self.provision_login(&applicant).await;

        if let Err(err) = self.applicant_repo.delete(applicant_id).await {
            warn!(%applicant_id, db_error = ?err, "applicants: failed to delete approved applicant");
        }

        info!(%applicant_id, member_id = %member.id, "applicants: approved");
        Ok(member)
    }

    /// Approves every id concurrently and reports each outcome.
    pub async fn bulk_approve(&self, applicant_ids: Vec<Uuid>) -> BulkApproveResult {
        let mut seen = HashSet::new();
        let applicant_ids: Vec<Uuid> = applicant_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        info!(count = applicant_ids.len(), "applicants: bulk approving");

        let outcomes = join_all(applicant_ids.iter().map(|id| self.approve(*id))).await;

        let mut result = BulkApproveResult::default();
        for (applicant_id, outcome) in applicant_ids.into_iter().zip(outcomes) {
            match outcome {
                Ok(member) => result.succeeded.push(ApprovedApplicant {
                    applicant_id,
                    member,
                }),
                Err(err) => {
                    warn!(%applicant_id, error = %err, "applicants: bulk approval item failed");
                    result.failed.push(FailedApproval {
                        applicant_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "applicants: bulk approval finished"
        );
        result
    }

    pub async fn reject(&self, applicant_id: Uuid) -> UseCaseResult<ApplicantEntity> {
        info!(%applicant_id, "applicants: rejecting");
        let applicant = self
            .applicant_repo
            .update_status(applicant_id, ApplicantStatus::Rejected, None)
            .await
            .map_err(|err| {
                error!(%applicant_id, db_error = ?err, "applicants: failed to reject applicant");
                ApplicantError::Internal(err)
            })?
            .ok_or(ApplicantError::NotFound)?;

        info!(%applicant_id, "applicants: rejected");
        Ok(applicant)
    }

    async fn provision_login(&self, applicant: &ApplicantEntity) {
        let applicant_id = applicant.id;
        if !self.identity.can_provision() {
            warn!(%applicant_id, "applicants: no service role key, skipping login provisioning");
            return;
        }

        let outcome = match self
            .identity
            .invite_user(applicant.email.clone(), Some(applicant.full_name.clone()))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%applicant_id, error = ?err, "applicants: failed to invite member");
                return;
            }
        };

        if outcome == InviteOutcome::Invited {
            info!(%applicant_id, "applicants: invite sent");
            return;
        }

        let Some(redirect_to) = self.password_reset_redirect.clone() else {
            info!(%applicant_id, "applicants: already registered and no member app url, skipping reset email");
            return;
        };

        match self
            .identity
            .send_password_reset(applicant.email.clone(), redirect_to)
            .await
        {
            Ok(()) => info!(%applicant_id, "applicants: password reset sent to existing login"),
            Err(err) => {
                warn!(%applicant_id, error = ?err, "applicants: failed to send password reset")
            }
        }
    }
}
