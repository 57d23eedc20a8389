//! Media entity model and DTOs.
//!
//! Media is the minimal title/description/owner record every trailer
//! is attached to one-to-one. Deleting a media row cascades to its
//! trailer; this is the only path that removes a trailer.

use reelmeta_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A media row from the `media` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Media {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a media row.
#[derive(Debug, Clone)]
pub struct CreateMedia {
    pub title: String,
    pub description: String,
    pub user_id: DbId,
}

/// Title plus link state, used by the CSV link pipeline to scan for
/// fuzzy title matches among media that have no trailer yet.
#[derive(Debug, Clone, FromRow)]
pub struct MediaTitle {
    pub id: DbId,
    pub title: String,
    pub has_trailer: bool,
}
