use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{dsl::exists, prelude::*, select};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::member_activity::{
        GratitudeEntryEntity, HomeworkSubmissionEntity, ProgressUpdateEntity,
    },
    repositories::member_activity::MemberActivityRepository,
};
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{gratitude_entries, homework_submissions, progress_updates},
};

pub struct MemberActivityPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MemberActivityPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MemberActivityRepository for MemberActivityPostgres {
    async fn list_gratitude_entries(&self, member_id: Uuid) -> Result<Vec<GratitudeEntryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = gratitude_entries::table
            .filter(gratitude_entries::member_id.eq(member_id))
            .order(gratitude_entries::entry_date.desc())
            .select(GratitudeEntryEntity::as_select())
            .load::<GratitudeEntryEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_homework_submissions(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<HomeworkSubmissionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = homework_submissions::table
            .filter(homework_submissions::member_id.eq(member_id))
            .order(homework_submissions::submission_date.desc())
            .select(HomeworkSubmissionEntity::as_select())
            .load::<HomeworkSubmissionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_progress_updates(&self, member_id: Uuid) -> Result<Vec<ProgressUpdateEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = progress_updates::table
            .filter(progress_updates::member_id.eq(member_id))
            .order((
                progress_updates::recorded_for.desc(),
                progress_updates::recorded_at.desc(),
            ))
            .select(ProgressUpdateEntity::as_select())
            .load::<ProgressUpdateEntity>(&mut conn)?;

        Ok(results)
    }

    async fn has_activity_on(&self, member_id: Uuid, date: NaiveDate) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let has_gratitude = select(exists(
            gratitude_entries::table
                .filter(gratitude_entries::member_id.eq(member_id))
                .filter(gratitude_entries::entry_date.eq(date)),
        ))
        .get_result::<bool>(&mut conn)?;

        if has_gratitude {
            return Ok(true);
        }

        let has_homework = select(exists(
            homework_submissions::table
                .filter(homework_submissions::member_id.eq(member_id))
                .filter(homework_submissions::submission_date.eq(date)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(has_homework)
    }
}
