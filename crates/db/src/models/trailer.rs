//! Trailer entity model, DTOs, and list-filter types.

use chrono::NaiveDate;
use reelmeta_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A trailer row joined with its owning media's title and description.
///
/// All reads go through this shape; the API serializer derives the
/// numeric price/duration and provider URLs from it at response time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrailerRecord {
    pub id: DbId,
    pub media_id: DbId,
    pub sequence_number: i32,
    pub external_id: String,
    pub thumbnail_id: Option<String>,
    pub price: String,
    pub duration: String,
    pub creators: String,
    pub detailed_description: Option<String>,
    pub upload_status: String,
    pub tags: serde_json::Value,
    pub is_featured: bool,
    pub is_premium: bool,
    pub release_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    // Joined from the owning media row.
    pub title: String,
    pub description: String,
}

/// DTO for creating a trailer. The owning media id is passed
/// separately so callers that create the media row in the same
/// transaction don't need a placeholder here.
#[derive(Debug, Clone)]
pub struct CreateTrailer {
    pub sequence_number: i32,
    pub external_id: String,
    pub thumbnail_id: Option<String>,
    pub price: String,
    pub duration: String,
    pub creators: String,
    pub detailed_description: Option<String>,
    pub upload_status: String,
    pub tags: serde_json::Value,
    pub is_featured: bool,
    pub is_premium: bool,
}

/// DTO for updating a trailer. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTrailer {
    pub sequence_number: Option<i32>,
    pub thumbnail_id: Option<String>,
    pub price: Option<String>,
    pub duration: Option<String>,
    pub creators: Option<String>,
    pub detailed_description: Option<String>,
    pub upload_status: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub is_featured: Option<bool>,
    pub is_premium: Option<bool>,
    pub release_date: Option<NaiveDate>,
}

/// Catalog-sourced field overwrite, applied by the import pipeline
/// when `--update` is set. The owning media's title and description
/// are rewritten in the same transaction.
#[derive(Debug, Clone)]
pub struct CatalogUpdate {
    pub title: String,
    pub sequence_number: i32,
    pub thumbnail_id: Option<String>,
    pub price: String,
    pub duration: String,
    pub creators: String,
    pub detailed_description: Option<String>,
    pub upload_status: String,
}

/// SQL-level list predicates. Price and duration range filters are not
/// here: those are evaluated in memory by the caller because the
/// numeric values only exist after parsing the free-form labels.
#[derive(Debug, Clone, Default)]
pub struct TrailerFilter {
    pub status: Option<String>,
    pub creator: Option<String>,
    pub is_featured: Option<bool>,
    pub is_premium: Option<bool>,
    /// Restrict to free rows (`price` is `FREE` or `$0`).
    pub free_only: bool,
    /// Restrict to paid premium rows (premium and not free-priced).
    pub paid_premium_only: bool,
    pub created_after: Option<Timestamp>,
    pub created_before: Option<Timestamp>,
    /// Case-insensitive substring OR across title, description,
    /// detailed description, creators, and tags.
    pub search: Option<String>,
}

/// Whitelisted list orderings. Parsed from the API `ordering` query
/// parameter (`-` prefix for descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerOrdering {
    CreatedAt { desc: bool },
    UpdatedAt { desc: bool },
    SequenceNumber { desc: bool },
    Title { desc: bool },
}

impl Default for TrailerOrdering {
    fn default() -> Self {
        Self::CreatedAt { desc: true }
    }
}

impl TrailerOrdering {
    /// Parse an ordering parameter. Returns `None` for fields outside
    /// the whitelist.
    pub fn parse(s: &str) -> Option<Self> {
        let (field, desc) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        match field {
            "created_at" => Some(Self::CreatedAt { desc }),
            "updated_at" => Some(Self::UpdatedAt { desc }),
            "sequence_number" => Some(Self::SequenceNumber { desc }),
            "title" => Some(Self::Title { desc }),
            _ => None,
        }
    }

    /// ORDER BY clause body. The default ordering tie-breaks equal
    /// timestamps with the operator-assigned sequence number.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::CreatedAt { desc: true } => "t.created_at DESC, t.sequence_number ASC",
            Self::CreatedAt { desc: false } => "t.created_at ASC, t.sequence_number ASC",
            Self::UpdatedAt { desc: true } => "t.updated_at DESC",
            Self::UpdatedAt { desc: false } => "t.updated_at ASC",
            Self::SequenceNumber { desc: true } => "t.sequence_number DESC",
            Self::SequenceNumber { desc: false } => "t.sequence_number ASC",
            Self::Title { desc: true } => "m.title DESC",
            Self::Title { desc: false } => "m.title ASC",
        }
    }
}

/// Aggregate counts for the stats endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrailerStats {
    pub total_trailers: i64,
    pub featured_trailers: i64,
    pub premium_trailers: i64,
    pub free_trailers: i64,
    pub completed_uploads: i64,
    pub pending_uploads: i64,
    pub processing_uploads: i64,
    pub error_uploads: i64,
    pub unique_creators: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_parse_whitelist() {
        assert_eq!(
            TrailerOrdering::parse("-created_at"),
            Some(TrailerOrdering::CreatedAt { desc: true })
        );
        assert_eq!(
            TrailerOrdering::parse("title"),
            Some(TrailerOrdering::Title { desc: false })
        );
        assert_eq!(
            TrailerOrdering::parse("sequence_number"),
            Some(TrailerOrdering::SequenceNumber { desc: false })
        );
        assert!(TrailerOrdering::parse("price").is_none());
        assert!(TrailerOrdering::parse("-id").is_none());
    }

    #[test]
    fn default_ordering_is_newest_first() {
        assert_eq!(
            TrailerOrdering::default(),
            TrailerOrdering::CreatedAt { desc: true }
        );
        assert!(TrailerOrdering::default().sql().contains("created_at DESC"));
    }
}
