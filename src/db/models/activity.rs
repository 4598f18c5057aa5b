//! Activity ledger models.
//!
//! An activity is one unit of logged effort. `xp_earned` is a snapshot taken
//! at creation time; it is never recomputed when a category multiplier later
//! changes. Only `Approved` activities contribute to aggregates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Pending,
    Approved,
    Denied,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Approved => "approved",
            ActivityStatus::Denied => "denied",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub duration_hours: f64,
    pub xp_earned: i64,
    pub status: ActivityStatus,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new activity. Id, XP and timestamps are
/// filled in by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub user_id: String,
    pub category_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub duration_hours: f64,
}
