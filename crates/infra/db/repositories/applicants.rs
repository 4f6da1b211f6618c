use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    dsl::sql,
    expression::SqlLiteral,
    prelude::*,
    sql_query,
    sql_types::{Nullable, Timestamptz, Uuid as SqlUuid},
    update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::applicants::ApplicantEntity,
    repositories::applicants::ApplicantRepository,
    value_objects::{
        capabilities::SchemaCapabilities, enums::applicant_statuses::ApplicantStatus,
    },
};
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::applicants};

type ApplicantColumns = (
    applicants::id,
    applicants::full_name,
    applicants::email,
    applicants::phone,
    applicants::telegram,
    applicants::birth_year,
    applicants::gender,
    applicants::address,
    applicants::joined_before,
    applicants::share_link,
    applicants::goal,
    applicants::discipline_rating,
    applicants::reason,
    applicants::wake_up_time,
    applicants::exercise_frequency,
    applicants::activity_level,
    applicants::health_condition,
    applicants::consent,
    applicants::status,
    SqlLiteral<Nullable<Timestamptz>>,
    applicants::created_at,
    applicants::updated_at,
);

fn applicant_columns(capabilities: &SchemaCapabilities) -> ApplicantColumns {
    let approved_at = if capabilities.applicants_approved_at {
        "approved_at"
    } else {
        "NULL::timestamptz"
    };

    (
        applicants::id,
        applicants::full_name,
        applicants::email,
        applicants::phone,
        applicants::telegram,
        applicants::birth_year,
        applicants::gender,
        applicants::address,
        applicants::joined_before,
        applicants::share_link,
        applicants::goal,
        applicants::discipline_rating,
        applicants::reason,
        applicants::wake_up_time,
        applicants::exercise_frequency,
        applicants::activity_level,
        applicants::health_condition,
        applicants::consent,
        applicants::status,
        sql::<Nullable<Timestamptz>>(approved_at),
        applicants::created_at,
        applicants::updated_at,
    )
}

pub struct ApplicantPostgres {
    db_pool: Arc<PgPoolSquad>,
    capabilities: SchemaCapabilities,
}

impl ApplicantPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, capabilities: SchemaCapabilities) -> Self {
        Self {
            db_pool,
            capabilities,
        }
    }
}

#[async_trait]
impl ApplicantRepository for ApplicantPostgres {
    async fn find_by_id(&self, applicant_id: Uuid) -> Result<Option<ApplicantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = applicants::table
            .filter(applicants::id.eq(applicant_id))
            .select(applicant_columns(&self.capabilities))
            .first::<ApplicantEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_status(&self, status: ApplicantStatus) -> Result<Vec<ApplicantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = applicants::table
            .filter(applicants::status.eq(status.to_string()))
            .order(applicants::created_at.desc())
            .select(applicant_columns(&self.capabilities))
            .load::<ApplicantEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_status(
        &self,
        applicant_id: Uuid,
        status: ApplicantStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ApplicantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let capabilities = self.capabilities;

        let result = conn.transaction::<Option<ApplicantEntity>, diesel::result::Error, _>(|tx| {
            let updated = update(applicants::table.filter(applicants::id.eq(applicant_id)))
                .set(applicants::status.eq(status.to_string()))
                .execute(tx)?;

            if updated == 0 {
                return Ok(None);
            }

            if capabilities.applicants_approved_at {
                sql_query("UPDATE applicants SET approved_at = $1 WHERE id = $2")
                    .bind::<Nullable<Timestamptz>, _>(approved_at)
                    .bind::<SqlUuid, _>(applicant_id)
                    .execute(tx)?;
            }

            applicants::table
                .filter(applicants::id.eq(applicant_id))
                .select(applicant_columns(&capabilities))
                .first::<ApplicantEntity>(tx)
                .optional()
        })?;

        Ok(result)
    }

    async fn delete(&self, applicant_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(applicants::table.filter(applicants::id.eq(applicant_id)))
            .execute(&mut conn)?;

        Ok(())
    }
}
