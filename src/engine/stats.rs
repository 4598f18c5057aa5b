//! Pure XP and aggregation math. No I/O, no mutation of inputs; everything
//! here is deterministic over the slices it is given.

use anyhow::{bail, Result};

use crate::db::models::{Activity, ActivityStatus, Category, CategoryStats};
use crate::engine::config::ScoringConfig;

/// XP snapshot for a new activity: `round(base_xp * hours * multiplier)`.
/// The result is stored on the activity and never recomputed, even if the
/// category multiplier is edited later.
pub fn xp_for_activity(
    duration_hours: f64,
    category: &Category,
    config: &ScoringConfig,
) -> Result<i64> {
    if !duration_hours.is_finite() || duration_hours <= 0.0 {
        bail!("duration must be a positive number of hours, got {duration_hours}");
    }
    if !category.xp_multiplier.is_finite() || category.xp_multiplier <= 0.0 {
        bail!(
            "category {} has invalid multiplier {}",
            category.id,
            category.xp_multiplier
        );
    }

    Ok((config.base_xp_per_hour * duration_hours * category.xp_multiplier).round() as i64)
}

/// Level bands are fixed-width: level 1 covers [0, xp_per_level).
/// Monotonically non-decreasing in `total_xp`.
pub fn level_for_xp(total_xp: i64, config: &ScoringConfig) -> i64 {
    total_xp.max(0) / config.xp_per_level + 1
}

pub fn level_title(level: i64) -> &'static str {
    if level >= 50 {
        return "Legend";
    }
    if level >= 40 {
        return "Elite";
    }
    if level >= 30 {
        return "Expert";
    }
    if level >= 20 {
        return "Advanced";
    }
    if level >= 10 {
        return "Trailblazer";
    }
    if level >= 5 {
        return "Rising Star";
    }
    "Newcomer"
}

/// Aggregate one user's activities in one category. Rows that are not
/// approved or belong to another category are ignored; progress is clamped
/// to [0, 100]. Empty input yields all-zero stats.
pub fn category_stats(
    category_id: &str,
    activities: &[Activity],
    target_hours: f64,
) -> Result<CategoryStats> {
    if !target_hours.is_finite() || target_hours <= 0.0 {
        bail!("target hours must be positive, got {target_hours}");
    }

    let mut total_hours = 0.0;
    let mut total_xp = 0i64;
    let mut activities_count = 0i64;

    for activity in activities {
        if activity.status != ActivityStatus::Approved || activity.category_id != category_id {
            continue;
        }
        if !activity.duration_hours.is_finite() || activity.duration_hours <= 0.0 {
            bail!(
                "activity {} has invalid duration {}",
                activity.id,
                activity.duration_hours
            );
        }
        total_hours += activity.duration_hours;
        total_xp += activity.xp_earned;
        activities_count += 1;
    }

    let progress_percentage = (100.0 * total_hours / target_hours).min(100.0);

    Ok(CategoryStats {
        category_id: category_id.to_string(),
        total_hours,
        total_xp,
        activities_count,
        progress_percentage,
    })
}
