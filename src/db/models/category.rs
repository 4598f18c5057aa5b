use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Skill domain with its own XP multiplier. Created by an administrator,
/// immutable afterwards; `icon` and `color` are opaque to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
    pub xp_multiplier: f64,
    pub created_at: DateTime<Utc>,
}
