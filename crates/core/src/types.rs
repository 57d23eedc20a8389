//! Shared type aliases used across the workspace.

/// Internal database row identifier.
pub type DbId = i64;

/// UTC timestamp as stored in `created_at` / `updated_at` columns.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
