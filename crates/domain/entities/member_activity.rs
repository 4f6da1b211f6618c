use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{gratitude_entries, homework_submissions, progress_updates};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = gratitude_entries)]
pub struct GratitudeEntryEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub entry_date: NaiveDate,
    pub gratitude: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = homework_submissions)]
pub struct HomeworkSubmissionEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub submission_date: NaiveDate,
    pub lesson: String,
    pub submission: String,
    pub mentor_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = progress_updates)]
pub struct ProgressUpdateEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub recorded_for: NaiveDate,
    pub weight: f64,
    pub height: f64,
    pub waist: Option<f64>,
    pub bust: Option<f64>,
    pub hips: Option<f64>,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
