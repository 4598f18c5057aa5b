use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_badge_tier, parse_datetime},
    models::{Badge, BadgeCriteria, UserBadge},
};

fn row_to_badge(row: &Row) -> Result<Badge> {
    let tier: String = row.get("tier")?;
    let criteria: String = row.get("criteria")?;
    let created_at: String = row.get("created_at")?;

    let criteria: BadgeCriteria =
        serde_json::from_str(&criteria).context("failed to parse badge criteria")?;

    Ok(Badge {
        id: row.get("id")?,
        category_id: row.get("category_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        tier: parse_badge_tier(&tier)?,
        criteria,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn row_to_user_badge(row: &Row) -> Result<UserBadge> {
    let earned_at: String = row.get("earned_at")?;

    Ok(UserBadge {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        badge_id: row.get("badge_id")?,
        earned_at: parse_datetime(&earned_at, "earned_at")?,
    })
}

impl Database {
    pub async fn insert_badge(&self, badge: &Badge) -> Result<()> {
        let record = badge.clone();
        self.execute(move |conn| {
            let criteria =
                serde_json::to_string(&record.criteria).context("failed to encode criteria")?;
            conn.execute(
                "INSERT INTO badges (id, category_id, name, description, icon, tier, criteria, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.category_id,
                    record.name,
                    record.description,
                    record.icon,
                    record.tier.as_str(),
                    criteria,
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn list_badges(&self) -> Result<Vec<Badge>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, category_id, name, description, icon, tier, criteria, created_at
                 FROM badges
                 ORDER BY name ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut badges = Vec::new();
            while let Some(row) = rows.next()? {
                badges.push(row_to_badge(row)?);
            }
            Ok(badges)
        })
        .await
    }

    /// Awarding the same badge twice is an error surfaced to the caller.
    /// The uniqueness check runs inside the worker task, so it cannot race
    /// with a concurrent award.
    pub async fn award_badge(
        &self,
        user_id: &str,
        badge_id: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<UserBadge> {
        let user_id = user_id.to_string();
        let badge_id = badge_id.to_string();
        self.execute(move |conn| {
            let already: i64 = conn.query_row(
                "SELECT COUNT(*) FROM user_badges WHERE user_id = ?1 AND badge_id = ?2",
                params![user_id, badge_id],
                |row| row.get(0),
            )?;
            if already > 0 {
                bail!("user {user_id} already has badge {badge_id}");
            }

            conn.execute(
                "INSERT INTO user_badges (user_id, badge_id, earned_at)
                 VALUES (?1, ?2, ?3)",
                params![user_id, badge_id, earned_at.to_rfc3339()],
            )?;
            let row_id = conn.last_insert_rowid();

            let mut stmt = conn.prepare(
                "SELECT id, user_id, badge_id, earned_at
                 FROM user_badges
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![row_id])?;
            match rows.next()? {
                Some(row) => row_to_user_badge(row),
                None => Err(anyhow!("user badge not found after insert")),
            }
        })
        .await
    }

    pub async fn list_user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, badge_id, earned_at
                 FROM user_badges
                 WHERE user_id = ?1
                 ORDER BY earned_at ASC",
            )?;
            let mut rows = stmt.query(params![user_id])?;
            let mut earned = Vec::new();
            while let Some(row) = rows.next()? {
                earned.push(row_to_user_badge(row)?);
            }
            Ok(earned)
        })
        .await
    }
}
