//! Goal lifecycle: drafting with derived fields, and live evaluation against
//! the ledger. A goal has two states, active and completed; the only
//! transition is active -> completed, detected here and persisted by the
//! caller.

use anyhow::{bail, Result};
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Activity, ActivityStatus, Category, Goal, GoalPeriod, GoalProgress};
use crate::engine::{self, ScoringConfig};

/// Caller-supplied fields for a new goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    pub user_id: String,
    pub category_id: String,
    pub target_hours: f64,
    pub period: GoalPeriod,
    pub start_date: NaiveDate,
    /// Required for `Custom`, ignored otherwise.
    pub end_date: Option<NaiveDate>,
}

/// Semester and year periods add calendar months, clamping to the end of the
/// month (Oct 31 + 4 months = Feb 28/29). Custom periods take the explicit
/// end date verbatim.
fn derive_end_date(period: GoalPeriod, start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<NaiveDate> {
    match period {
        GoalPeriod::Semester => start_date
            .checked_add_months(Months::new(4))
            .ok_or_else(|| anyhow::anyhow!("start date {start_date} out of range")),
        GoalPeriod::Year => start_date
            .checked_add_months(Months::new(12))
            .ok_or_else(|| anyhow::anyhow!("start date {start_date} out of range")),
        GoalPeriod::Custom => {
            let end = match end_date {
                Some(end) => end,
                None => bail!("custom goals require an explicit end date"),
            };
            if end <= start_date {
                bail!("goal end date {end} must be after start date {start_date}");
            }
            Ok(end)
        }
    }
}

/// Validate a draft and build the goal. `target_xp` is derived from the
/// category's multiplier as it stands right now, then frozen on the row.
pub fn build_goal(
    draft: &GoalDraft,
    category: &Category,
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> Result<Goal> {
    if draft.category_id != category.id {
        bail!(
            "draft category {} does not match category {}",
            draft.category_id,
            category.id
        );
    }

    let target_xp = engine::xp_for_activity(draft.target_hours, category, config)?;
    let end_date = derive_end_date(draft.period, draft.start_date, draft.end_date)?;

    Ok(Goal {
        id: Uuid::new_v4().to_string(),
        user_id: draft.user_id.clone(),
        category_id: draft.category_id.clone(),
        target_hours: draft.target_hours,
        target_xp,
        period: draft.period,
        start_date: draft.start_date,
        end_date,
        is_completed: false,
        completed_at: None,
        created_at: now,
    })
}

/// Evaluate live progress. Activities outside the goal's user, category,
/// window (inclusive on both ends) or not approved are ignored.
/// `completion_event` is true only when this evaluation first reaches 100%;
/// re-evaluating a completed goal is a no-op signal-wise.
pub fn evaluate(goal: &Goal, activities: &[Activity]) -> Result<GoalProgress> {
    if !goal.target_hours.is_finite() || goal.target_hours <= 0.0 {
        bail!("goal {} has invalid target hours {}", goal.id, goal.target_hours);
    }

    let mut current_hours = 0.0;
    let mut current_xp = 0i64;

    for activity in activities {
        if activity.status != ActivityStatus::Approved
            || activity.user_id != goal.user_id
            || activity.category_id != goal.category_id
            || activity.date < goal.start_date
            || activity.date > goal.end_date
        {
            continue;
        }
        if !activity.duration_hours.is_finite() || activity.duration_hours <= 0.0 {
            bail!(
                "activity {} has invalid duration {}",
                activity.id,
                activity.duration_hours
            );
        }
        current_hours += activity.duration_hours;
        current_xp += activity.xp_earned;
    }

    let progress_percentage = (100.0 * current_hours / goal.target_hours).min(100.0);
    let completion_event = progress_percentage >= 100.0 && !goal.is_completed;

    Ok(GoalProgress {
        goal: goal.clone(),
        current_hours,
        current_xp,
        progress_percentage,
        completion_event,
    })
}
