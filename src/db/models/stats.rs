use serde::{Deserialize, Serialize};

/// Aggregated hours/XP for one user in one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category_id: String,
    pub total_hours: f64,
    pub total_xp: i64,
    pub activities_count: i64,
    /// Clamped to [0, 100].
    pub progress_percentage: f64,
}

/// One row of a per-category ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub total_xp: i64,
    pub activities_count: i64,
    pub rank: i64,
}
