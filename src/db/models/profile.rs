use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user running totals. `total_xp` and `level` are a materialized
/// aggregate over the approved ledger, updated in the same transaction as
/// the activity write. `streak` is maintained by a collaborator; the core
/// only stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub is_admin: bool,
    pub total_xp: i64,
    pub level: i64,
    pub streak: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
