use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::member_statuses::MemberStatus;
use crate::infra::db::postgres::schema::members;

/// Positional row; `approved_at` and `start_date` are selected through
/// `SchemaCapabilities` and come back `None` on schemas without them.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize, Deserialize)]
pub struct MemberEntity {
    pub id: Uuid,
    #[serde(alias = "ho_ten")]
    pub full_name: Option<String>,
    pub email: String,
    #[serde(alias = "so_dien_thoai")]
    pub phone: Option<String>,
    pub telegram: Option<String>,
    #[serde(alias = "nam_sinh")]
    pub birth_year: Option<i32>,
    pub status: String,
    pub drop_reason: Option<String>,
    pub applicant_id: Option<Uuid>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MemberEntity {
    /// Rows with a hand-edited, unrecognised status read as `None`.
    pub fn status(&self) -> Option<MemberStatus> {
        MemberStatus::try_from(self.status.as_str()).ok()
    }

    pub fn is_dropped(&self) -> bool {
        self.status() == Some(MemberStatus::Dropped)
    }

    /// Sort key for "most recently approved first".
    pub fn recency_key(&self) -> DateTime<Utc> {
        self.approved_at
            .or_else(|| {
                self.start_date
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            })
            .unwrap_or(self.created_at)
    }

    /// First day of the member's challenge.
    pub fn challenge_start_date(&self) -> NaiveDate {
        self.start_date
            .or_else(|| self.approved_at.map(|at| at.date_naive()))
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    /// Day the member was dropped, if they were.
    pub fn drop_date(&self) -> Option<NaiveDate> {
        if !self.is_dropped() {
            return None;
        }
        let dropped_at = self
            .updated_at
            .or(self.approved_at)
            .unwrap_or(self.created_at);
        Some(dropped_at.date_naive())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub struct InsertMemberEntity {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub birth_year: Option<i32>,
    pub status: String,
    pub drop_reason: Option<String>,
    pub applicant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Applied when an approval hits an email that is already a member.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = members, treat_none_as_null = true)]
pub struct ApprovedMemberChangeset {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub birth_year: Option<i32>,
    pub status: String,
    pub drop_reason: Option<String>,
    pub applicant_id: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&InsertMemberEntity> for ApprovedMemberChangeset {
    fn from(value: &InsertMemberEntity) -> Self {
        Self {
            full_name: value.full_name.clone(),
            phone: value.phone.clone(),
            telegram: value.telegram.clone(),
            birth_year: value.birth_year,
            status: value.status.clone(),
            drop_reason: value.drop_reason.clone(),
            applicant_id: value.applicant_id,
            updated_at: value.updated_at,
        }
    }
}
