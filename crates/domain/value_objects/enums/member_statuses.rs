use std::fmt::Display;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a member.
///
/// Only `Active` and `Dropped` are written by this service. `Paused` and the
/// two `Reborn*` states are set by hand in the database (the reborn states
/// belong to an earlier program format) and are read-only here.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Paused,
    Dropped,
    RebornPending,
    RebornActive,
}

impl Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            MemberStatus::Active => "active",
            MemberStatus::Paused => "paused",
            MemberStatus::Dropped => "dropped",
            MemberStatus::RebornPending => "reborn_pending",
            MemberStatus::RebornActive => "reborn_active",
        };
        write!(f, "{}", status)
    }
}

impl TryFrom<&str> for MemberStatus {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "active" => Ok(MemberStatus::Active),
            "paused" => Ok(MemberStatus::Paused),
            "dropped" => Ok(MemberStatus::Dropped),
            "reborn_pending" => Ok(MemberStatus::RebornPending),
            "reborn_active" => Ok(MemberStatus::RebornActive),
            other => Err(anyhow!("unknown member status: {other}")),
        }
    }
}

impl MemberStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Paused => "Paused",
            MemberStatus::Dropped => "Dropped",
            MemberStatus::RebornPending => "Reborn (pending)",
            MemberStatus::RebornActive => "Reborn (active)",
        }
    }
}
