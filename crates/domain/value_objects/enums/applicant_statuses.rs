use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Display for ApplicantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ApplicantStatus::Pending => "pending",
            ApplicantStatus::Approved => "approved",
            ApplicantStatus::Rejected => "rejected",
        };
        write!(f, "{}", status)
    }
}

impl ApplicantStatus {
    /// Unknown values are treated as pending so they stay visible for review.
    pub fn from_str(value: &str) -> Self {
        match value {
            "approved" => ApplicantStatus::Approved,
            "rejected" => ApplicantStatus::Rejected,
            _ => ApplicantStatus::Pending,
        }
    }
}
