use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// One guarantor on a loan application.
///
/// The list of sureties is fixed when the application is created; only the
/// status moves, and only once: `Pending -> Approved` or `Pending -> Rejected`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuretyModel {
    pub member_id: Uuid,
    pub status: SuretyStatus,
    pub responded_at: Option<DateTime<Utc>>,
}

impl SuretyModel {
    pub fn pending(member_id: Uuid) -> Self {
        Self {
            member_id,
            status: SuretyStatus::Pending,
            responded_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "surety_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SuretyStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for SuretyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuretyStatus::Pending => write!(f, "pending"),
            SuretyStatus::Approved => write!(f, "approved"),
            SuretyStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for SuretyStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SuretyStatus::Pending),
            "approved" => Ok(SuretyStatus::Approved),
            "rejected" => Ok(SuretyStatus::Rejected),
            _ => Err(()),
        }
    }
}
