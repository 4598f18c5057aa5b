use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Semester,
    Year,
    Custom,
}

impl GoalPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalPeriod::Semester => "semester",
            GoalPeriod::Year => "year",
            GoalPeriod::Custom => "custom",
        }
    }
}

/// User-declared hours target within a category and time window.
/// `target_xp` is derived from the category multiplier at creation and then
/// frozen. `is_completed` transitions false -> true exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub target_hours: f64,
    pub target_xp: i64,
    pub period: GoalPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Goal plus its live evaluation against the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal: Goal,
    pub current_hours: f64,
    pub current_xp: i64,
    pub progress_percentage: f64,
    /// True only on the evaluation that first reaches 100%.
    pub completion_event: bool,
}
