use std::collections::HashMap;

use anyhow::{bail, Result};

use crate::db::models::{Activity, ActivityStatus, LeaderboardEntry};

/// Rank users by approved XP within one category's activity set.
///
/// Grouping order does not affect the output: ties on XP break by activity
/// count (descending), then by user id (ascending). Ranks are contiguous
/// 1-based positions and the result is truncated to `limit`.
pub fn compute_leaderboard(activities: &[Activity], limit: usize) -> Result<Vec<LeaderboardEntry>> {
    let mut totals: HashMap<String, (i64, i64)> = HashMap::new();

    for activity in activities {
        if activity.status != ActivityStatus::Approved {
            continue;
        }
        if activity.xp_earned < 0 {
            bail!(
                "activity {} has negative xp_earned {}",
                activity.id,
                activity.xp_earned
            );
        }
        let entry = totals.entry(activity.user_id.clone()).or_insert((0, 0));
        entry.0 += activity.xp_earned;
        entry.1 += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = totals
        .into_iter()
        .map(|(user_id, (total_xp, activities_count))| LeaderboardEntry {
            user_id,
            total_xp,
            activities_count,
            rank: 0,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_xp
            .cmp(&a.total_xp)
            .then(b.activities_count.cmp(&a.activities_count))
            .then(a.user_id.cmp(&b.user_id))
    });
    entries.truncate(limit);

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as i64 + 1;
    }

    Ok(entries)
}
