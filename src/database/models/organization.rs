use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single organization of this instance. Its presence marks the
/// instance as initialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
