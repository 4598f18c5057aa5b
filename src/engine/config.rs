use serde::{Deserialize, Serialize};

/// Tunable scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// XP awarded per hour before the category multiplier is applied.
    pub base_xp_per_hour: f64,

    /// Width of one level band.
    pub xp_per_level: i64,

    /// Target used for category progress when no goal overrides it.
    pub default_target_hours: f64,

    /// Maximum rows returned by a leaderboard query.
    pub leaderboard_limit: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_xp_per_hour: 50.0,
            xp_per_level: 1000,
            default_target_hours: 50.0,
            leaderboard_limit: 10,
        }
    }
}
