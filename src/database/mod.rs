pub mod manager;
pub mod models;

pub use manager::{Database, DatabaseError};

/// Current time as epoch milliseconds, the unit of every stored timestamp.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh opaque identifier with a readable type prefix, e.g. `usr_3f2a...`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
