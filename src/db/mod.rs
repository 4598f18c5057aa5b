mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{
    Activity, ActivityStatus, Badge, BadgeCriteria, BadgeTier, Category, CategoryStats, Goal,
    GoalPeriod, GoalProgress, LeaderboardEntry, NewActivity, Profile, UserBadge,
};
