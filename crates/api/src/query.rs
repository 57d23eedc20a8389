//! Shared query parameter types for API handlers.

use reelmeta_core::pricing::{parse_duration_minutes, parse_price};
use reelmeta_core::status::UploadStatus;
use reelmeta_core::types::Timestamp;
use reelmeta_db::models::trailer::{TrailerFilter, TrailerOrdering, TrailerRecord};
use serde::Deserialize;

use crate::error::AppError;

/// Default page size for list endpoints.
const DEFAULT_LIMIT: i64 = 50;
/// Upper bound on client-requested page size.
const MAX_LIMIT: i64 = 200;

/// Query parameters accepted by the trailer list endpoints.
///
/// SQL-backed predicates are translated into a [`TrailerFilter`]. The
/// price and length bounds operate on values derived from the free-form
/// labels, so they are evaluated in memory over the candidate rows.
#[derive(Debug, Default, Deserialize)]
pub struct TrailerListParams {
    pub status: Option<String>,
    pub creator: Option<String>,
    pub is_featured: Option<bool>,
    pub is_premium: Option<bool>,
    /// Minimum parsed price in currency units.
    pub price_min: Option<f64>,
    /// Maximum parsed price in currency units.
    pub price_max: Option<f64>,
    /// Minimum parsed duration in minutes.
    pub length_min: Option<i64>,
    /// Maximum parsed duration in minutes.
    pub length_max: Option<i64>,
    /// Inclusive lower bound on creation time (RFC 3339).
    pub created_after: Option<Timestamp>,
    /// Inclusive upper bound on creation time (RFC 3339).
    pub created_before: Option<Timestamp>,
    pub search: Option<String>,
    /// Ordering field, `-` prefix for descending.
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TrailerListParams {
    /// Build the SQL-level filter. Rejects a status value outside the
    /// upload-status enum.
    pub fn filter(&self) -> Result<TrailerFilter, AppError> {
        if let Some(status) = &self.status {
            if UploadStatus::from_str(status).is_none() {
                return Err(AppError::BadRequest(format!(
                    "Invalid upload status: {status}"
                )));
            }
        }
        Ok(TrailerFilter {
            status: self.status.clone(),
            creator: self.creator.clone(),
            is_featured: self.is_featured,
            is_premium: self.is_premium,
            free_only: false,
            paid_premium_only: false,
            created_after: self.created_after,
            created_before: self.created_before,
            search: self.search.clone(),
        })
    }

    /// Parse the requested ordering, defaulting to newest-first.
    pub fn ordering(&self) -> Result<TrailerOrdering, AppError> {
        match &self.ordering {
            None => Ok(TrailerOrdering::default()),
            Some(raw) => TrailerOrdering::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid ordering field: {raw}"))),
        }
    }

    /// Whether any derived-value filter is present. When true the
    /// handler must fetch all SQL-matching rows and page in memory,
    /// because the derived values only exist after parsing.
    pub fn has_derived_filters(&self) -> bool {
        self.price_min.is_some()
            || self.price_max.is_some()
            || self.length_min.is_some()
            || self.length_max.is_some()
    }

    /// Evaluate the derived-value bounds against one row.
    pub fn matches_derived(&self, record: &TrailerRecord) -> bool {
        if self.price_min.is_some() || self.price_max.is_some() {
            let price = parse_price(&record.price);
            if self.price_min.is_some_and(|min| price < min) {
                return false;
            }
            if self.price_max.is_some_and(|max| price > max) {
                return false;
            }
        }
        if self.length_min.is_some() || self.length_max.is_some() {
            let minutes = parse_duration_minutes(&record.duration);
            if self.length_min.is_some_and(|min| minutes < min) {
                return false;
            }
            if self.length_max.is_some_and(|max| minutes > max) {
                return false;
            }
        }
        true
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(price: &str, duration: &str) -> TrailerRecord {
        TrailerRecord {
            id: 1,
            media_id: 1,
            sequence_number: 1,
            external_id: "cf-test".to_string(),
            thumbnail_id: None,
            price: price.to_string(),
            duration: duration.to_string(),
            creators: "Studio".to_string(),
            detailed_description: None,
            upload_status: "Complete".to_string(),
            tags: serde_json::json!([]),
            is_featured: false,
            is_premium: true,
            release_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: "T".to_string(),
            description: "T".to_string(),
        }
    }

    #[test]
    fn derived_price_bounds() {
        let params = TrailerListParams {
            price_min: Some(10.0),
            price_max: Some(30.0),
            ..Default::default()
        };
        assert!(params.matches_derived(&record("$20", "25 Minutes")));
        assert!(!params.matches_derived(&record("$5", "25 Minutes")));
        assert!(!params.matches_derived(&record("$35.00", "25 Minutes")));
        // FREE parses to 0.0 and falls below the minimum.
        assert!(!params.matches_derived(&record("FREE", "25 Minutes")));
    }

    #[test]
    fn derived_length_bounds() {
        let params = TrailerListParams {
            length_min: Some(30),
            ..Default::default()
        };
        assert!(params.matches_derived(&record("$5", "1 Hour 15 Minutes")));
        assert!(!params.matches_derived(&record("$5", "25 Minutes")));
    }

    #[test]
    fn no_derived_filters_matches_everything() {
        let params = TrailerListParams::default();
        assert!(!params.has_derived_filters());
        assert!(params.matches_derived(&record("garbage", "garbage")));
    }

    #[test]
    fn invalid_status_rejected() {
        let params = TrailerListParams {
            status: Some("Uploaded".to_string()),
            ..Default::default()
        };
        assert!(params.filter().is_err());

        let params = TrailerListParams {
            status: Some("Processing".to_string()),
            ..Default::default()
        };
        assert!(params.filter().is_ok());
    }

    #[test]
    fn limit_is_clamped() {
        let params = TrailerListParams {
            limit: Some(10_000),
            offset: Some(-3),
            ..Default::default()
        };
        assert_eq!(params.limit(), 200);
        assert_eq!(params.offset(), 0);
    }
}
