use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::member_activity::{
    GratitudeEntryEntity, HomeworkSubmissionEntity, ProgressUpdateEntity,
};

#[automock]
#[async_trait]
pub trait MemberActivityRepository {
    async fn list_gratitude_entries(&self, member_id: Uuid) -> Result<Vec<GratitudeEntryEntity>>;
    async fn list_homework_submissions(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<HomeworkSubmissionEntity>>;
    async fn list_progress_updates(&self, member_id: Uuid) -> Result<Vec<ProgressUpdateEntity>>;
    /// True when the member logged gratitude or homework on `date`.
    async fn has_activity_on(&self, member_id: Uuid, date: NaiveDate) -> Result<bool>;
}
