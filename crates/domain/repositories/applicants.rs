use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::applicants::ApplicantEntity;
use crate::domain::value_objects::enums::applicant_statuses::ApplicantStatus;

#[automock]
#[async_trait]
pub trait ApplicantRepository {
    async fn find_by_id(&self, applicant_id: Uuid) -> Result<Option<ApplicantEntity>>;
    async fn list_by_status(&self, status: ApplicantStatus) -> Result<Vec<ApplicantEntity>>;
    /// Returns the updated row, or `None` when no applicant has that id.
    async fn update_status(
        &self,
        applicant_id: Uuid,
        status: ApplicantStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ApplicantEntity>>;
    async fn delete(&self, applicant_id: Uuid) -> Result<()>;
}
