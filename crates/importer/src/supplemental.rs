//! Pipeline B: supplemental updates keyed by sequence number, plus
//! export of the merged table back to the VideoDB CSV schema.

use std::path::Path;

use anyhow::{bail, Context};
use reelmeta_core::dates::{format_release_date, parse_release_date};
use reelmeta_db::repositories::TrailerRepo;
use reelmeta_db::DbPool;
use serde::Deserialize;

use crate::report::{RowOutcome, RunReport};

/// Header columns the supplemental CSV must carry.
const REQUIRED_COLUMNS: &[&str] = &["video_number", "date", "extracted_text", "creators"];

/// One row of the supplemental CSV schema.
#[derive(Debug, Deserialize)]
pub struct SupplementalRow {
    #[serde(default)]
    pub video_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub creators: String,
}

fn validate_headers(headers: &csv::StringRecord) -> anyhow::Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("Missing required columns: {}", missing.join(", "));
    }
    Ok(())
}

/// Apply a supplemental CSV: set release dates and conditionally
/// overwrite long descriptions and creator credits. Rows whose
/// sequence number has no record are skipped, not failed.
pub async fn run_update(
    pool: &DbPool,
    csv_path: &Path,
    dry_run: bool,
) -> anyhow::Result<RunReport> {
    // Short rows are padded with empty fields, not rejected.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("cannot open CSV file {}", csv_path.display()))?;
    validate_headers(reader.headers()?)?;

    let mut report = RunReport::new(dry_run);
    for (line, row) in reader.deserialize::<SupplementalRow>().enumerate() {
        let line = line + 2; // line 1 is the header
        let outcome = match row {
            Ok(row) => update_row(pool, &row, dry_run).await,
            Err(err) => Err(err.into()),
        };
        match outcome {
            Ok(outcome) => report.record(outcome),
            Err(err) => {
                tracing::error!(row = line, error = %err, "row failed");
                report.record_error(line, err);
            }
        }
    }
    Ok(report)
}

async fn update_row(
    pool: &DbPool,
    row: &SupplementalRow,
    dry_run: bool,
) -> anyhow::Result<RowOutcome> {
    let video_number: i32 = row
        .video_number
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid or missing video_number"))?;

    let date_str = row.date.trim();
    if date_str.is_empty() {
        bail!("Missing date");
    }
    let release_date =
        parse_release_date(date_str).with_context(|| format!("Could not parse date: {date_str}"))?;

    let Some(trailer) = TrailerRepo::find_by_sequence_number(pool, video_number).await? else {
        tracing::info!(video_number, "skipping, not found in database");
        return Ok(RowOutcome::Skipped);
    };

    let extracted = row.extracted_text.trim();
    let creators = row.creators.trim();

    if dry_run {
        tracing::info!(
            video_number,
            date = %release_date,
            description_len = extracted.len(),
            creators,
            "would update"
        );
        return Ok(RowOutcome::Updated);
    }

    // Empty supplemental values never erase existing data.
    TrailerRepo::apply_supplemental(
        pool,
        trailer.id,
        release_date,
        (!extracted.is_empty()).then_some(extracted),
        (!creators.is_empty()).then_some(creators),
    )
    .await?;

    tracing::info!(video_number, "updated");
    Ok(RowOutcome::Updated)
}

/// Export the full table in VideoDB CSV order (sequence number
/// ascending), formatting unset release dates as empty strings.
pub async fn export_videodb(pool: &DbPool, export_path: &Path) -> anyhow::Result<usize> {
    let trailers = TrailerRepo::list_for_export(pool).await?;

    let mut writer = csv::Writer::from_path(export_path)
        .with_context(|| format!("cannot create export file {}", export_path.display()))?;
    writer.write_record([
        "Video Number",
        "Description",
        "Price",
        "Length",
        "Creators",
        "Video ID",
        "Thumbnail ID",
        "Upload Status",
        "Detailed Description",
        "Release Date",
    ])?;

    for trailer in &trailers {
        let video_number = format!("Video {}", trailer.sequence_number);
        let release_date = format_release_date(trailer.release_date);
        writer.write_record([
            video_number.as_str(),
            trailer.title.as_str(),
            trailer.price.as_str(),
            trailer.duration.as_str(),
            trailer.creators.as_str(),
            trailer.external_id.as_str(),
            trailer.thumbnail_id.as_deref().unwrap_or(""),
            trailer.upload_status.as_str(),
            trailer.detailed_description.as_deref().unwrap_or(""),
            release_date.as_str(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(count = trailers.len(), path = %export_path.display(), "exported");
    Ok(trailers.len())
}
