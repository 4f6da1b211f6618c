use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::members::{InsertMemberEntity, MemberEntity};
use crate::domain::value_objects::enums::member_statuses::MemberStatus;

#[automock]
#[async_trait]
pub trait MemberRepository {
    async fn find_by_id(&self, member_id: Uuid) -> Result<Option<MemberEntity>>;
    async fn find_by_email(&self, email: String) -> Result<Option<MemberEntity>>;
    async fn list(&self, status: Option<MemberStatus>) -> Result<Vec<MemberEntity>>;
    /// Inserts or updates the member keyed on email and returns the stored row.
    async fn upsert_approved(
        &self,
        member: InsertMemberEntity,
        approved_at: DateTime<Utc>,
    ) -> Result<MemberEntity>;
    async fn update_status(
        &self,
        member_id: Uuid,
        status: MemberStatus,
        drop_reason: Option<String>,
    ) -> Result<MemberEntity>;
}
