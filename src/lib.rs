pub mod db;
pub mod engine;
pub mod goals;
pub mod settings;
pub mod tracker;

pub use db::{
    Activity, ActivityStatus, Badge, BadgeCriteria, BadgeTier, Category, CategoryStats, Database,
    Goal, GoalPeriod, GoalProgress, LeaderboardEntry, NewActivity, Profile, UserBadge,
};
pub use engine::ScoringConfig;
pub use goals::GoalDraft;
pub use settings::SettingsStore;
pub use tracker::Tracker;

/// Initialize logging (reads RUST_LOG env var).
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
