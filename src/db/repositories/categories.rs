use anyhow::{anyhow, Result};
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::Category};

fn row_to_category(row: &Row) -> Result<Category> {
    let created_at: String = row.get("created_at")?;

    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        xp_multiplier: row.get("xp_multiplier")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_category(&self, category: &Category) -> Result<()> {
        let record = category.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO categories (id, name, slug, description, icon, color, xp_multiplier, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.name,
                    record.slug,
                    record.description,
                    record.icon,
                    record.color,
                    record.xp_multiplier,
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// A missing category is a data-integrity error, not a silent default.
    pub async fn get_category(&self, category_id: &str) -> Result<Category> {
        let category_id = category_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, slug, description, icon, color, xp_multiplier, created_at
                 FROM categories
                 WHERE id = ?1",
            )?;
            let mut rows = stmt.query(params![category_id])?;
            match rows.next()? {
                Some(row) => row_to_category(row),
                None => Err(anyhow!("category {category_id} not found")),
            }
        })
        .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, slug, description, icon, color, xp_multiplier, created_at
                 FROM categories
                 ORDER BY name ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut categories = Vec::new();
            while let Some(row) = rows.next()? {
                categories.push(row_to_category(row)?);
            }
            Ok(categories)
        })
        .await
    }
}
