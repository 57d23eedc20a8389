//! Response shapes for trailer records.
//!
//! The stored rows keep price and duration as the free-form labels they
//! were imported with. The API view enriches each row with the parsed
//! numeric values and the delivery URLs derived from the external video
//! id, so clients never have to re-implement the label parsing.

use reelmeta_core::pricing::{is_free_price, parse_duration_minutes, parse_price};
use reelmeta_core::types::{DbId, Timestamp};
use reelmeta_db::models::trailer::TrailerRecord;
use reelmeta_stream::{stream_url, thumbnail_url};
use serde::Serialize;
use serde_json::Value;

/// Public representation of a trailer.
///
/// `id` is the external video id, which is what clients use to address
/// a trailer; the internal row ids stay internal.
#[derive(Debug, Serialize)]
pub struct TrailerView {
    pub id: String,
    pub media_id: DbId,
    pub sequence_number: i32,
    pub title: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub price: String,
    pub price_numeric: f64,
    pub duration: String,
    pub duration_minutes: i64,
    pub creators: String,
    pub upload_status: String,
    pub tags: Value,
    pub is_featured: bool,
    pub is_premium: bool,
    pub is_free: bool,
    pub release_date: Option<chrono::NaiveDate>,
    pub thumbnail_url: String,
    pub stream_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TrailerRecord> for TrailerView {
    fn from(record: TrailerRecord) -> Self {
        let price_numeric = parse_price(&record.price);
        let duration_minutes = parse_duration_minutes(&record.duration);
        let is_free = is_free_price(&record.price);
        Self {
            id: record.external_id.clone(),
            media_id: record.media_id,
            sequence_number: record.sequence_number,
            title: record.title,
            description: record.description,
            detailed_description: record.detailed_description,
            price: record.price,
            price_numeric,
            duration: record.duration,
            duration_minutes,
            creators: record.creators,
            upload_status: record.upload_status,
            tags: record.tags,
            is_featured: record.is_featured,
            is_premium: record.is_premium,
            is_free,
            release_date: record.release_date,
            thumbnail_url: thumbnail_url(&record.external_id, None),
            stream_url: stream_url(&record.external_id),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
