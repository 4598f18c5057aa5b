//! Activity ledger: inserts, the verification transition, and the read paths
//! used by aggregation. Writes that change approved XP also update the
//! owner's profile totals inside the same transaction, so the materialized
//! counter cannot drift from the ledger mid-write.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Row, Transaction};

use crate::db::{
    connection::Database,
    helpers::{parse_activity_status, parse_date, parse_datetime, parse_optional_datetime},
    models::{Activity, ActivityStatus},
};

const ACTIVITY_COLUMNS: &str = "id, user_id, category_id, title, description, date, \
     duration_hours, xp_earned, status, verified_by, verified_at, created_at, updated_at";

fn row_to_activity(row: &Row) -> Result<Activity> {
    let date: String = row.get("date")?;
    let status: String = row.get("status")?;
    let verified_at: Option<String> = row.get("verified_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Activity {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        category_id: row.get("category_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date: parse_date(&date, "date")?,
        duration_hours: row.get("duration_hours")?,
        xp_earned: row.get("xp_earned")?,
        status: parse_activity_status(&status)?,
        verified_by: row.get("verified_by")?,
        verified_at: parse_optional_datetime(verified_at, "verified_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn insert_activity_row(tx: &Transaction<'_>, record: &Activity) -> Result<()> {
    tx.execute(
        "INSERT INTO activities (id, user_id, category_id, title, description, date,
             duration_hours, xp_earned, status, verified_by, verified_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            record.id,
            record.user_id,
            record.category_id,
            record.title,
            record.description,
            record.date.to_string(),
            record.duration_hours,
            record.xp_earned,
            record.status.as_str(),
            record.verified_by,
            record.verified_at.as_ref().map(|dt| dt.to_rfc3339()),
            record.created_at.to_rfc3339(),
            record.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Apply an approved activity's XP to the owner's materialized totals.
fn credit_profile(tx: &Transaction<'_>, user_id: &str, xp: i64, xp_per_level: i64) -> Result<()> {
    let total_xp: i64 = tx
        .query_row(
            "SELECT total_xp FROM profiles WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .map_err(|_| anyhow!("profile {user_id} not found"))?;

    let new_total = total_xp + xp;
    let new_level = new_total.max(0) / xp_per_level + 1;

    tx.execute(
        "UPDATE profiles
         SET total_xp = ?1, level = ?2, updated_at = ?3
         WHERE id = ?4",
        params![new_total, new_level, Utc::now().to_rfc3339(), user_id],
    )?;
    Ok(())
}

impl Database {
    /// Insert a submission that still needs verification. No profile update;
    /// the XP snapshot only counts once the activity is approved.
    pub async fn insert_pending_activity(&self, activity: &Activity) -> Result<()> {
        let record = activity.clone();
        self.execute(move |conn| {
            if record.status != ActivityStatus::Pending {
                bail!("expected a pending activity, got {}", record.status.as_str());
            }
            let tx = conn.transaction()?;
            insert_activity_row(&tx, &record)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Insert a directly-approved activity and credit the owner's totals in
    /// one transaction.
    pub async fn record_approved_activity(
        &self,
        activity: &Activity,
        xp_per_level: i64,
    ) -> Result<()> {
        let record = activity.clone();
        self.execute(move |conn| {
            if record.status != ActivityStatus::Approved {
                bail!(
                    "expected an approved activity, got {}",
                    record.status.as_str()
                );
            }
            let tx = conn.transaction()?;
            insert_activity_row(&tx, &record)?;
            credit_profile(&tx, &record.user_id, record.xp_earned, xp_per_level)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Verification transition: pending -> approved | denied, stamping the
    /// verifier. Approval credits the owner's totals in the same transaction.
    pub async fn set_activity_status(
        &self,
        activity_id: &str,
        status: ActivityStatus,
        verifier_id: &str,
        verified_at: DateTime<Utc>,
        xp_per_level: i64,
    ) -> Result<Activity> {
        let activity_id = activity_id.to_string();
        let verifier_id = verifier_id.to_string();
        self.execute(move |conn| {
            if status == ActivityStatus::Pending {
                bail!("cannot transition an activity back to pending");
            }

            let tx = conn.transaction()?;

            let activity = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?1"
                ))?;
                let mut rows = stmt.query(params![activity_id])?;
                match rows.next()? {
                    Some(row) => row_to_activity(row)?,
                    None => return Err(anyhow!("activity {activity_id} not found")),
                }
            };

            if activity.status != ActivityStatus::Pending {
                bail!(
                    "activity {} has already been verified ({})",
                    activity.id,
                    activity.status.as_str()
                );
            }

            tx.execute(
                "UPDATE activities
                 SET status = ?1, verified_by = ?2, verified_at = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    status.as_str(),
                    verifier_id,
                    verified_at.to_rfc3339(),
                    verified_at.to_rfc3339(),
                    activity_id,
                ],
            )?;

            if status == ActivityStatus::Approved {
                credit_profile(&tx, &activity.user_id, activity.xp_earned, xp_per_level)?;
            }

            tx.commit()?;

            Ok(Activity {
                status,
                verified_by: Some(verifier_id),
                verified_at: Some(verified_at),
                updated_at: verified_at,
                ..activity
            })
        })
        .await
    }

    pub async fn list_approved_for_user(&self, user_id: &str) -> Result<Vec<Activity>> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities
                 WHERE user_id = ?1 AND status = 'approved'
                 ORDER BY date DESC"
            ))?;
            let mut rows = stmt.query(params![user_id])?;
            let mut activities = Vec::new();
            while let Some(row) = rows.next()? {
                activities.push(row_to_activity(row)?);
            }
            Ok(activities)
        })
        .await
    }

    pub async fn list_approved_in_category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> Result<Vec<Activity>> {
        let user_id = user_id.to_string();
        let category_id = category_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities
                 WHERE user_id = ?1 AND category_id = ?2 AND status = 'approved'
                 ORDER BY date DESC"
            ))?;
            let mut rows = stmt.query(params![user_id, category_id])?;
            let mut activities = Vec::new();
            while let Some(row) = rows.next()? {
                activities.push(row_to_activity(row)?);
            }
            Ok(activities)
        })
        .await
    }

    /// Goal window read: both bounds inclusive.
    pub async fn list_approved_in_window(
        &self,
        user_id: &str,
        category_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Activity>> {
        let user_id = user_id.to_string();
        let category_id = category_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities
                 WHERE user_id = ?1 AND category_id = ?2 AND status = 'approved'
                   AND date >= ?3 AND date <= ?4
                 ORDER BY date ASC"
            ))?;
            let mut rows = stmt.query(params![
                user_id,
                category_id,
                from.to_string(),
                to.to_string()
            ])?;
            let mut activities = Vec::new();
            while let Some(row) = rows.next()? {
                activities.push(row_to_activity(row)?);
            }
            Ok(activities)
        })
        .await
    }

    /// Leaderboard feed: approved activities for one category across all
    /// users, in insertion order.
    pub async fn list_category_activity(&self, category_id: &str) -> Result<Vec<Activity>> {
        let category_id = category_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities
                 WHERE category_id = ?1 AND status = 'approved'
                 ORDER BY created_at ASC"
            ))?;
            let mut rows = stmt.query(params![category_id])?;
            let mut activities = Vec::new();
            while let Some(row) = rows.next()? {
                activities.push(row_to_activity(row)?);
            }
            Ok(activities)
        })
        .await
    }

    /// Verification queue, newest submissions first.
    pub async fn list_pending_activities(&self) -> Result<Vec<Activity>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activities
                 WHERE status = 'pending'
                 ORDER BY created_at DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut activities = Vec::new();
            while let Some(row) = rows.next()? {
                activities.push(row_to_activity(row)?);
            }
            Ok(activities)
        })
        .await
    }
}
