use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{PgConnection, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::zoom_links::{
        DailyZoomLinkDetails, DailyZoomLinkEntity, InsertDailyZoomLinkEntity,
        InsertZoomLinkEntity, ZoomLinkEntity,
    },
    repositories::zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
};
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{daily_zoom_links, zoom_links},
};

pub struct ZoomLinkPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ZoomLinkPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ZoomLinkRepository for ZoomLinkPostgres {
    async fn list_active(&self) -> Result<Vec<ZoomLinkEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = zoom_links::table
            .filter(zoom_links::is_active.eq(true))
            .order(zoom_links::created_at.asc())
            .select(ZoomLinkEntity::as_select())
            .load::<ZoomLinkEntity>(&mut conn)?;

        Ok(results)
    }

    async fn insert_links(&self, urls: Vec<String>) -> Result<usize> {
        if urls.is_empty() {
            return Ok(0);
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let rows: Vec<InsertZoomLinkEntity> = urls
            .into_iter()
            .map(|url| InsertZoomLinkEntity {
                url,
                label: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let inserted = insert_into(zoom_links::table)
            .values(&rows)
            .execute(&mut conn)?;

        Ok(inserted)
    }

    async fn deactivate_links(&self, link_ids: Vec<Uuid>) -> Result<usize> {
        if link_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(zoom_links::table.filter(zoom_links::id.eq_any(link_ids)))
            .set((
                zoom_links::is_active.eq(false),
                zoom_links::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated)
    }
}

pub struct DailyZoomLinkPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DailyZoomLinkPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn details_for_date(
    conn: &mut PgConnection,
    date: NaiveDate,
) -> QueryResult<Option<DailyZoomLinkDetails>> {
    let row = daily_zoom_links::table
        .left_join(zoom_links::table)
        .filter(daily_zoom_links::scheduled_for.eq(date))
        .select((
            DailyZoomLinkEntity::as_select(),
            Option::<ZoomLinkEntity>::as_select(),
        ))
        .first::<(DailyZoomLinkEntity, Option<ZoomLinkEntity>)>(conn)
        .optional()?;

    Ok(row.map(|(daily, zoom_link)| DailyZoomLinkDetails { daily, zoom_link }))
}

fn details_by_id(conn: &mut PgConnection, daily_id: Uuid) -> QueryResult<DailyZoomLinkDetails> {
    let (daily, zoom_link) = daily_zoom_links::table
        .left_join(zoom_links::table)
        .filter(daily_zoom_links::id.eq(daily_id))
        .select((
            DailyZoomLinkEntity::as_select(),
            Option::<ZoomLinkEntity>::as_select(),
        ))
        .first::<(DailyZoomLinkEntity, Option<ZoomLinkEntity>)>(conn)?;

    Ok(DailyZoomLinkDetails { daily, zoom_link })
}

#[async_trait]
impl DailyZoomLinkRepository for DailyZoomLinkPostgres {
    async fn find_for_date(&self, date: NaiveDate) -> Result<Option<DailyZoomLinkDetails>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = details_for_date(&mut conn, date)?;

        Ok(result)
    }

    async fn assign_if_unassigned(
        &self,
        date: NaiveDate,
        zoom_link_id: Uuid,
        active_link_ids: Vec<Uuid>,
    ) -> Result<DailyZoomLinkDetails> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let result = conn.transaction::<DailyZoomLinkDetails, diesel::result::Error, _>(|tx| {
            insert_into(daily_zoom_links::table)
                .values(&InsertDailyZoomLinkEntity {
                    zoom_link_id: Some(zoom_link_id),
                    scheduled_for: date,
                    telegram_sent_at: None,
                    created_at: now,
                    updated_at: now,
                })
                .on_conflict(daily_zoom_links::scheduled_for)
                .do_nothing()
                .execute(tx)?;

            // Repairs a row whose link was cleared or removed from the pool.
            update(
                daily_zoom_links::table
                    .filter(daily_zoom_links::scheduled_for.eq(date))
                    .filter(
                        daily_zoom_links::zoom_link_id
                            .is_null()
                            .or(daily_zoom_links::zoom_link_id.ne_all(active_link_ids)),
                    ),
            )
            .set((
                daily_zoom_links::zoom_link_id.eq(Some(zoom_link_id)),
                daily_zoom_links::telegram_sent_at.eq(None::<DateTime<Utc>>),
                daily_zoom_links::updated_at.eq(now),
            ))
            .execute(tx)?;

            details_for_date(tx, date)?.ok_or(diesel::result::Error::NotFound)
        })?;

        Ok(result)
    }

    async fn upsert_for_date(
        &self,
        date: NaiveDate,
        zoom_link_id: Uuid,
    ) -> Result<DailyZoomLinkDetails> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let daily_id = insert_into(daily_zoom_links::table)
            .values(&InsertDailyZoomLinkEntity {
                zoom_link_id: Some(zoom_link_id),
                scheduled_for: date,
                telegram_sent_at: None,
                created_at: now,
                updated_at: now,
            })
            .on_conflict(daily_zoom_links::scheduled_for)
            .do_update()
            .set((
                daily_zoom_links::zoom_link_id.eq(Some(zoom_link_id)),
                daily_zoom_links::telegram_sent_at.eq(None::<DateTime<Utc>>),
                daily_zoom_links::updated_at.eq(now),
            ))
            .returning(daily_zoom_links::id)
            .get_result::<Uuid>(&mut conn)?;

        let result = details_by_id(&mut conn, daily_id)?;

        Ok(result)
    }

    async fn mark_sent(
        &self,
        daily_zoom_link_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<DailyZoomLinkDetails> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(daily_zoom_links::table.filter(daily_zoom_links::id.eq(daily_zoom_link_id)))
            .set((
                daily_zoom_links::telegram_sent_at.eq(Some(sent_at)),
                daily_zoom_links::updated_at.eq(sent_at),
            ))
            .execute(&mut conn)?;

        let result = details_by_id(&mut conn, daily_zoom_link_id)?;

        Ok(result)
    }
}
