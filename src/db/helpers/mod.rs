use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::{ActivityStatus, BadgeTier, GoalPeriod};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_activity_status(value: &str) -> Result<ActivityStatus> {
    match value {
        "pending" => Ok(ActivityStatus::Pending),
        "approved" => Ok(ActivityStatus::Approved),
        "denied" => Ok(ActivityStatus::Denied),
        other => Err(anyhow!("unknown activity status {other}")),
    }
}

pub fn parse_goal_period(value: &str) -> Result<GoalPeriod> {
    match value {
        "semester" => Ok(GoalPeriod::Semester),
        "year" => Ok(GoalPeriod::Year),
        "custom" => Ok(GoalPeriod::Custom),
        other => Err(anyhow!("unknown goal period {other}")),
    }
}

pub fn parse_badge_tier(value: &str) -> Result<BadgeTier> {
    match value {
        "bronze" => Ok(BadgeTier::Bronze),
        "silver" => Ok(BadgeTier::Silver),
        "gold" => Ok(BadgeTier::Gold),
        "platinum" => Ok(BadgeTier::Platinum),
        other => Err(anyhow!("unknown badge tier {other}")),
    }
}
