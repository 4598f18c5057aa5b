use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::Profile};

fn row_to_profile(row: &Row) -> Result<Profile> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let is_admin: i64 = row.get("is_admin")?;

    Ok(Profile {
        id: row.get("id")?,
        display_name: row.get("display_name")?,
        is_admin: is_admin != 0,
        total_xp: row.get("total_xp")?,
        level: row.get("level")?,
        streak: row.get("streak")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let record = profile.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO profiles (id, display_name, is_admin, total_xp, level, streak, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.display_name,
                    record.is_admin as i64,
                    record.total_xp,
                    record.level,
                    record.streak,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, is_admin, total_xp, level, streak, created_at, updated_at
                 FROM profiles
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![user_id])?;
            match rows.next()? {
                Some(row) => row_to_profile(row),
                None => Err(anyhow!("profile {user_id} not found")),
            }
        })
        .await
    }

    /// Reconciliation: recompute the materialized totals from the approved
    /// ledger. The incremental updates and this recompute are never mixed
    /// implicitly; callers invoke this explicitly.
    pub async fn recompute_profile_totals(
        &self,
        user_id: &str,
        xp_per_level: i64,
    ) -> Result<Profile> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let total_xp: i64 = tx.query_row(
                "SELECT COALESCE(SUM(xp_earned), 0) FROM activities
                 WHERE user_id = ?1 AND status = 'approved'",
                params![user_id],
                |row| row.get(0),
            )?;
            let level = total_xp.max(0) / xp_per_level + 1;
            let now = Utc::now();

            let changed = tx.execute(
                "UPDATE profiles
                 SET total_xp = ?1, level = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![total_xp, level, now.to_rfc3339(), user_id],
            )?;
            if changed == 0 {
                return Err(anyhow!("profile {user_id} not found"));
            }

            let profile = {
                let mut stmt = tx.prepare(
                    "SELECT id, display_name, is_admin, total_xp, level, streak, created_at, updated_at
                     FROM profiles
                     WHERE id = ?1",
                )?;
                let mut rows = stmt.query(params![user_id])?;
                match rows.next()? {
                    Some(row) => row_to_profile(row)?,
                    None => return Err(anyhow!("profile {user_id} not found")),
                }
            };

            tx.commit()?;
            Ok(profile)
        })
        .await
    }
}
