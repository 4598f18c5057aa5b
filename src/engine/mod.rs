mod badges;
mod config;
mod leaderboard;
mod stats;

pub use badges::criteria_met;
pub use config::ScoringConfig;
pub use leaderboard::compute_leaderboard;
pub use stats::{category_stats, level_for_xp, level_title, xp_for_activity};
