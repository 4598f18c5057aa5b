use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl BadgeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeTier::Bronze => "bronze",
            BadgeTier::Silver => "silver",
            BadgeTier::Gold => "gold",
            BadgeTier::Platinum => "platinum",
        }
    }
}

/// Milestone thresholds. A badge is earned when every threshold that is
/// present has been reached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCriteria {
    pub activities_count: Option<i64>,
    pub xp_amount: Option<i64>,
    pub hours_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    /// None means the badge is evaluated against all-category totals.
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub tier: BadgeTier,
    pub criteria: BadgeCriteria,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub id: i64,
    pub user_id: String,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}
