use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    dsl::sql,
    expression::SqlLiteral,
    insert_into,
    prelude::*,
    sql_query,
    sql_types::{Date, Nullable, Timestamptz, Uuid as SqlUuid},
    update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::members::{ApprovedMemberChangeset, InsertMemberEntity, MemberEntity},
    repositories::members::MemberRepository,
    value_objects::{capabilities::SchemaCapabilities, enums::member_statuses::MemberStatus},
};
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::members};

type MemberColumns = (
    members::id,
    members::full_name,
    members::email,
    members::phone,
    members::telegram,
    members::birth_year,
    members::status,
    members::drop_reason,
    members::applicant_id,
    SqlLiteral<Nullable<Timestamptz>>,
    SqlLiteral<Nullable<Date>>,
    members::created_at,
    members::updated_at,
);

fn member_columns(capabilities: &SchemaCapabilities) -> MemberColumns {
    let approved_at = if capabilities.members_approved_at {
        "approved_at"
    } else {
        "NULL::timestamptz"
    };
    let start_date = if capabilities.members_start_date {
        "start_date"
    } else {
        "NULL::date"
    };

    (
        members::id,
        members::full_name,
        members::email,
        members::phone,
        members::telegram,
        members::birth_year,
        members::status,
        members::drop_reason,
        members::applicant_id,
        sql::<Nullable<Timestamptz>>(approved_at),
        sql::<Nullable<Date>>(start_date),
        members::created_at,
        members::updated_at,
    )
}

pub struct MemberPostgres {
    db_pool: Arc<PgPoolSquad>,
    capabilities: SchemaCapabilities,
}

impl MemberPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>, capabilities: SchemaCapabilities) -> Self {
        Self {
            db_pool,
            capabilities,
        }
    }
}

#[async_trait]
impl MemberRepository for MemberPostgres {
    async fn find_by_id(&self, member_id: Uuid) -> Result<Option<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = members::table
            .filter(members::id.eq(member_id))
            .select(member_columns(&self.capabilities))
            .first::<MemberEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_email(&self, email: String) -> Result<Option<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = members::table
            .filter(members::email.eq(email))
            .select(member_columns(&self.capabilities))
            .first::<MemberEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(&self, status: Option<MemberStatus>) -> Result<Vec<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let columns = member_columns(&self.capabilities);

        let results = match status {
            Some(status) => members::table
                .filter(members::status.eq(status.to_string()))
                .select(columns)
                .load::<MemberEntity>(&mut conn)?,
            None => members::table
                .select(columns)
                .load::<MemberEntity>(&mut conn)?,
        };

        Ok(results)
    }

    async fn upsert_approved(
        &self,
        member: InsertMemberEntity,
        approved_at: DateTime<Utc>,
    ) -> Result<MemberEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let capabilities = self.capabilities;
        let changeset = ApprovedMemberChangeset::from(&member);

        let result = conn.transaction::<MemberEntity, diesel::result::Error, _>(|tx| {
            let member_id = insert_into(members::table)
                .values(&member)
                .on_conflict(members::email)
                .do_update()
                .set(&changeset)
                .returning(members::id)
                .get_result::<Uuid>(tx)?;

            if capabilities.members_approved_at {
                sql_query("UPDATE members SET approved_at = $1 WHERE id = $2")
                    .bind::<Timestamptz, _>(approved_at)
                    .bind::<SqlUuid, _>(member_id)
                    .execute(tx)?;
            }

            members::table
                .filter(members::id.eq(member_id))
                .select(member_columns(&capabilities))
                .first::<MemberEntity>(tx)
        })?;

        Ok(result)
    }

    async fn update_status(
        &self,
        member_id: Uuid,
        status: MemberStatus,
        drop_reason: Option<String>,
    ) -> Result<MemberEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let updated = update(members::table.filter(members::id.eq(member_id)))
            .set((
                members::status.eq(status.to_string()),
                members::drop_reason.eq(drop_reason),
                members::updated_at.eq(Some(now)),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(anyhow!("member {member_id} not found"));
        }

        let result = members::table
            .filter(members::id.eq(member_id))
            .select(member_columns(&self.capabilities))
            .first::<MemberEntity>(&mut conn)?;

        Ok(result)
    }
}
