use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_date, parse_datetime, parse_goal_period, parse_optional_datetime},
    models::Goal,
};

const GOAL_COLUMNS: &str = "id, user_id, category_id, target_hours, target_xp, period, \
     start_date, end_date, is_completed, completed_at, created_at";

fn row_to_goal(row: &Row) -> Result<Goal> {
    let period: String = row.get("period")?;
    let start_date: String = row.get("start_date")?;
    let end_date: String = row.get("end_date")?;
    let is_completed: i64 = row.get("is_completed")?;
    let completed_at: Option<String> = row.get("completed_at")?;
    let created_at: String = row.get("created_at")?;

    Ok(Goal {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        category_id: row.get("category_id")?,
        target_hours: row.get("target_hours")?,
        target_xp: row.get("target_xp")?,
        period: parse_goal_period(&period)?,
        start_date: parse_date(&start_date, "start_date")?,
        end_date: parse_date(&end_date, "end_date")?,
        is_completed: is_completed != 0,
        completed_at: parse_optional_datetime(completed_at, "completed_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_goal(&self, goal: &Goal) -> Result<()> {
        let record = goal.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO goals (id, user_id, category_id, target_hours, target_xp, period,
                     start_date, end_date, is_completed, completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.id,
                    record.user_id,
                    record.category_id,
                    record.target_hours,
                    record.target_xp,
                    record.period.as_str(),
                    record.start_date.to_string(),
                    record.end_date.to_string(),
                    record.is_completed as i64,
                    record.completed_at.as_ref().map(|dt| dt.to_rfc3339()),
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        let goal_id = goal_id.to_string();
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"))?;
            let mut rows = stmt.query(params![goal_id])?;
            match rows.next()? {
                Some(row) => row_to_goal(row),
                None => Err(anyhow!("goal {goal_id} not found")),
            }
        })
        .await
    }

    pub async fn list_goals_for_user(&self, user_id: &str) -> Result<Vec<Goal>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goals
                 WHERE user_id = ?1
                 ORDER BY created_at DESC"
            ))?;
            let mut rows = stmt.query(params![user_id])?;
            let mut goals = Vec::new();
            while let Some(row) = rows.next()? {
                goals.push(row_to_goal(row)?);
            }
            Ok(goals)
        })
        .await
    }

    /// Check-then-set completion. Returns true if this call performed the
    /// transition; an already-completed goal is left untouched so its
    /// `completed_at` never changes.
    pub async fn mark_goal_completed(
        &self,
        goal_id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let goal_id = goal_id.to_string();
        self.execute(move |conn| {
            let changed = conn.execute(
                "UPDATE goals
                 SET is_completed = 1, completed_at = ?1
                 WHERE id = ?2 AND is_completed = 0",
                params![completed_at.to_rfc3339(), goal_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    /// Completed goals are retained permanently; only active goals may be
    /// deleted.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<()> {
        let goal_id = goal_id.to_string();
        self.execute(move |conn| {
            let is_completed: i64 = conn
                .query_row(
                    "SELECT is_completed FROM goals WHERE id = ?1",
                    params![goal_id],
                    |row| row.get(0),
                )
                .map_err(|_| anyhow!("goal {goal_id} not found"))?;

            if is_completed != 0 {
                bail!("goal {goal_id} is completed and cannot be deleted");
            }

            conn.execute("DELETE FROM goals WHERE id = ?1", params![goal_id])?;
            Ok(())
        })
        .await
    }
}
