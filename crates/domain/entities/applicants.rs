use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::applicant_statuses::ApplicantStatus;

/// A sign-up awaiting review.
///
/// Loaded positionally (see `ApplicantPostgres`) because `approved_at` only
/// exists on newer schemas. The serde aliases accept raw rows from the
/// database change feed, which uses the stored column names.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize, Deserialize)]
pub struct ApplicantEntity {
    pub id: Uuid,
    #[serde(alias = "ho_ten")]
    pub full_name: String,
    pub email: String,
    #[serde(alias = "so_dien_thoai")]
    pub phone: Option<String>,
    pub telegram: Option<String>,
    #[serde(alias = "nam_sinh")]
    pub birth_year: Option<i32>,
    #[serde(alias = "gioi_tinh")]
    pub gender: Option<String>,
    #[serde(alias = "dia_chi")]
    pub address: Option<String>,
    #[serde(alias = "da_tham_gia_truoc")]
    pub joined_before: Option<String>,
    #[serde(alias = "link_bai_chia_se")]
    pub share_link: Option<String>,
    #[serde(alias = "muc_tieu")]
    pub goal: Option<String>,
    #[serde(alias = "ky_luat_rating")]
    pub discipline_rating: Option<i32>,
    #[serde(alias = "ly_do")]
    pub reason: Option<String>,
    #[serde(alias = "thoi_gian_thuc_day")]
    pub wake_up_time: Option<String>,
    #[serde(alias = "tan_suat_tap_the_duc")]
    pub exercise_frequency: Option<String>,
    #[serde(alias = "muc_do_van_dong")]
    pub activity_level: Option<i32>,
    #[serde(alias = "tinh_trang_suc_khoe")]
    pub health_condition: Option<String>,
    #[serde(alias = "dong_y", default)]
    pub consent: bool,
    #[serde(default = "pending_status")]
    pub status: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn pending_status() -> String {
    ApplicantStatus::Pending.to_string()
}

impl ApplicantEntity {
    pub fn status(&self) -> ApplicantStatus {
        ApplicantStatus::from_str(&self.status)
    }

    pub fn is_pending(&self) -> bool {
        self.status() == ApplicantStatus::Pending
    }
}
