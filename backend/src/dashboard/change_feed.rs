//! Converts Supabase database webhook payloads into dashboard events.

use crates::domain::entities::members::MemberEntity;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::dashboard::events::DashboardEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Insert,
    Update,
    Delete,
}

/// Body Supabase posts for a row change.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub table: String,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub old_record: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ChangeFeedError {
    #[error("{change:?} on {table} has no {field}")]
    MissingRecord {
        change: ChangeType,
        table: String,
        field: &'static str,
    },
    #[error("malformed {table} row: {source}")]
    Malformed {
        table: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RowId {
    id: Uuid,
}

impl DatabaseChange {
    /// `Ok(None)` for tables and changes the dashboard does not track.
    pub fn into_event(self) -> Result<Option<DashboardEvent>, ChangeFeedError> {
        let event = match (self.table.as_str(), self.change_type) {
            ("applicants", ChangeType::Insert) => {
                Some(DashboardEvent::ApplicantInserted(self.parse_record()?))
            }
            ("applicants", ChangeType::Update) => {
                Some(DashboardEvent::ApplicantUpdated(self.parse_record()?))
            }
            ("applicants", ChangeType::Delete) => {
                let row: RowId = self.parse_old_record()?;
                Some(DashboardEvent::ApplicantDeleted { id: row.id })
            }
            ("members", ChangeType::Insert | ChangeType::Update) => {
                let member: MemberEntity = self.parse_record()?;
                Some(DashboardEvent::MemberUpserted(member))
            }
            _ => None,
        };
        Ok(event)
    }

    fn parse_record<T: for<'de> Deserialize<'de>>(&self) -> Result<T, ChangeFeedError> {
        self.parse(self.record.as_ref(), "record")
    }

    fn parse_old_record<T: for<'de> Deserialize<'de>>(&self) -> Result<T, ChangeFeedError> {
        self.parse(self.old_record.as_ref(), "old_record")
    }

    fn parse<T: for<'de> Deserialize<'de>>(
        &self,
        value: Option<&Value>,
        field: &'static str,
    ) -> Result<T, ChangeFeedError> {
        let value = value
            .filter(|value| !value.is_null())
            .ok_or_else(|| ChangeFeedError::MissingRecord {
                change: self.change_type,
                table: self.table.clone(),
                field,
            })?;
        T::deserialize(value).map_err(|source| ChangeFeedError::Malformed {
            table: self.table.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn applicant_row(status: &str) -> Value {
        json!({
            "id": "5f0c6a3e-1a53-4a39-9f0e-3a4a9c1d2b10",
            "ho_ten": "Nguyen Van A",
            "email": "a@example.com",
            "so_dien_thoai": "0900000000",
            "telegram": null,
            "nam_sinh": 1995,
            "gioi_tinh": "nam",
            "dia_chi": null,
            "da_tham_gia_truoc": null,
            "link_bai_chia_se": null,
            "muc_tieu": "Run",
            "ky_luat_rating": 8,
            "ly_do": null,
            "thoi_gian_thuc_day": "05:00",
            "tan_suat_tap_the_duc": null,
            "muc_do_van_dong": 3,
            "tinh_trang_suc_khoe": null,
            "dong_y": true,
            "status": status,
            "created_at": "2024-09-01T01:02:03+00:00"
        })
    }

    #[test]
    fn applicant_insert_uses_stored_column_names() {
        let change: DatabaseChange = serde_json::from_value(json!({
            "type": "INSERT",
            "table": "applicants",
            "schema": "public",
            "record": applicant_row("pending"),
            "old_record": null
        }))
        .unwrap();

        match change.into_event().unwrap() {
            Some(DashboardEvent::ApplicantInserted(applicant)) => {
                assert_eq!(applicant.full_name, "Nguyen Van A");
                assert_eq!(applicant.birth_year, Some(1995));
                assert!(applicant.approved_at.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn applicant_delete_reads_old_record_id() {
        let change: DatabaseChange = serde_json::from_value(json!({
            "type": "DELETE",
            "table": "applicants",
            "record": null,
            "old_record": { "id": "5f0c6a3e-1a53-4a39-9f0e-3a4a9c1d2b10" }
        }))
        .unwrap();

        assert!(matches!(
            change.into_event().unwrap(),
            Some(DashboardEvent::ApplicantDeleted { .. })
        ));
    }

    #[test]
    fn member_update_becomes_upsert() {
        let change: DatabaseChange = serde_json::from_value(json!({
            "type": "UPDATE",
            "table": "members",
            "record": {
                "id": "0b7f6f3e-1a53-4a39-9f0e-3a4a9c1d2b10",
                "ho_ten": "Lan",
                "email": "lan@example.com",
                "so_dien_thoai": null,
                "telegram": null,
                "nam_sinh": null,
                "status": "dropped",
                "drop_reason": "inactive",
                "applicant_id": null,
                "created_at": "2024-09-01T01:02:03+00:00",
                "updated_at": "2024-09-05T01:02:03+00:00"
            }
        }))
        .unwrap();

        assert!(matches!(
            change.into_event().unwrap(),
            Some(DashboardEvent::MemberUpserted(member)) if member.is_dropped()
        ));
    }

    #[test]
    fn untracked_tables_are_ignored() {
        let change: DatabaseChange = serde_json::from_value(json!({
            "type": "INSERT",
            "table": "gratitude_entries",
            "record": { "id": "0b7f6f3e-1a53-4a39-9f0e-3a4a9c1d2b10" }
        }))
        .unwrap();

        assert!(change.into_event().unwrap().is_none());
    }

    #[test]
    fn insert_without_record_is_an_error() {
        let change: DatabaseChange = serde_json::from_value(json!({
            "type": "INSERT",
            "table": "applicants",
            "record": null
        }))
        .unwrap();

        assert!(matches!(
            change.into_event(),
            Err(ChangeFeedError::MissingRecord { field: "record", .. })
        ));
    }
}
