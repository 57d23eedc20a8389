//! Pipeline A: catalog import and link from a VideoDB-format CSV.

use std::path::Path;

use anyhow::{bail, Context};
use reelmeta_core::matching::best_match;
use reelmeta_core::pricing::is_free_price;
use reelmeta_core::status::UploadStatus;
use reelmeta_core::types::DbId;
use reelmeta_db::models::media::CreateMedia;
use reelmeta_db::models::trailer::{CatalogUpdate, CreateTrailer};
use reelmeta_db::models::user::CreateUser;
use reelmeta_db::repositories::{MediaRepo, TrailerRepo, UserRepo};
use reelmeta_db::DbPool;
use serde::Deserialize;

use crate::report::{RowOutcome, RunReport};

/// Header columns every VideoDB export must carry.
/// `Detailed Description` and `Release Date` are optional extras.
const REQUIRED_COLUMNS: &[&str] = &[
    "Video Number",
    "Description",
    "Price",
    "Length",
    "Creators",
    "Video ID",
    "Thumbnail ID",
    "Upload Status",
];

/// One row of the VideoDB CSV schema.
#[derive(Debug, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "Video Number", default)]
    pub video_number: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Price", default)]
    pub price: String,
    #[serde(rename = "Length", default)]
    pub length: String,
    #[serde(rename = "Creators", default)]
    pub creators: String,
    #[serde(rename = "Detailed Description", default)]
    pub detailed_description: String,
    #[serde(rename = "Video ID", default)]
    pub video_id: String,
    #[serde(rename = "Thumbnail ID", default)]
    pub thumbnail_id: String,
    #[serde(rename = "Upload Status", default)]
    pub upload_status: String,
}

/// Options for the import variant.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Username that owns media rows created by this run.
    pub username: String,
    /// Overwrite catalog fields on rows whose video id already exists.
    pub update_existing: bool,
    /// Report intended actions without touching the store.
    pub dry_run: bool,
}

/// Parse the operator-assigned ordinal from a `"Video <n>"` cell.
/// A bare integer is accepted too.
fn parse_video_number(raw: &str) -> anyhow::Result<i32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("Video ").unwrap_or(trimmed).trim();
    digits
        .parse::<i32>()
        .map_err(|_| anyhow::anyhow!("Invalid or missing Video Number"))
}

fn opt_nonempty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reject the file up front when required header columns are missing.
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

/// Resolve the owning user for created media rows. In dry-run mode a
/// missing user is reported, not created.
async fn resolve_user(
    pool: &DbPool,
    username: &str,
    dry_run: bool,
) -> anyhow::Result<Option<DbId>> {
    if let Some(user) = UserRepo::find_by_username(pool, username).await? {
        tracing::info!(username = %user.username, "using existing user");
        return Ok(Some(user.id));
    }
    if dry_run {
        tracing::info!(%username, "would create user");
        return Ok(None);
    }
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            // Placeholder that no password can ever verify against.
            password_hash: "!".to_string(),
            role: "admin".to_string(),
        },
    )
    .await?;
    tracing::info!(username = %user.username, "created user");
    Ok(Some(user.id))
}

/// Import a VideoDB CSV: create rows for new video ids, and when
/// `update_existing` is set overwrite catalog fields on known ones.
pub async fn run_import(
    pool: &DbPool,
    csv_path: &Path,
    options: &ImportOptions,
) -> anyhow::Result<RunReport> {
    // Short rows are padded with empty fields, not rejected.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("cannot open CSV file {}", csv_path.display()))?;
    validate_headers(reader.headers()?)?;

    let user_id = resolve_user(pool, &options.username, options.dry_run).await?;

    let mut report = RunReport::new(options.dry_run);
    for (line, row) in reader.deserialize::<CatalogRow>().enumerate() {
        let line = line + 2; // line 1 is the header
        let outcome = match row {
            Ok(row) => import_row(pool, &row, user_id, options).await,
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

async fn import_row(
    pool: &DbPool,
    row: &CatalogRow,
    user_id: Option<DbId>,
    options: &ImportOptions,
) -> anyhow::Result<RowOutcome> {
    let video_number = parse_video_number(&row.video_number)?;
    let title = row.description.trim();
    if title.is_empty() {
        bail!("Missing Description (title)");
    }
    let external_id = row.video_id.trim();
    if external_id.is_empty() {
        bail!("Missing Video ID (external id)");
    }

    let price = row.price.trim().to_string();
    let length = row.length.trim().to_string();
    let creators = row.creators.trim().to_string();
    // The long description falls back to the title rather than staying
    // empty.
    let detailed = opt_nonempty(&row.detailed_description).unwrap_or_else(|| title.to_string());
    let status = UploadStatus::normalize(row.upload_status.trim());

    let existing = TrailerRepo::find_by_external_id(pool, external_id).await?;

    if existing.is_some() && !options.update_existing {
        tracing::info!(video_number, external_id, "skipping existing trailer");
        return Ok(RowOutcome::Skipped);
    }

    if options.dry_run {
        tracing::info!(
            video_number,
            title,
            action = if existing.is_some() { "UPDATE" } else { "CREATE" },
            "dry run"
        );
        return Ok(if existing.is_some() {
            RowOutcome::Updated
        } else {
            RowOutcome::Created
        });
    }

    if existing.is_some() {
        TrailerRepo::update_catalog(
            pool,
            external_id,
            &CatalogUpdate {
                title: title.to_string(),
                sequence_number: video_number,
                thumbnail_id: opt_nonempty(&row.thumbnail_id),
                price,
                duration: length,
                creators,
                detailed_description: Some(detailed),
                upload_status: status.as_str().to_string(),
            },
        )
        .await?;
        tracing::info!(video_number, title, "updated");
        return Ok(RowOutcome::Updated);
    }

    let user_id = user_id.context("no importing user available")?;
    // Premium is decided at creation from the price label and never
    // revisited afterwards.
    let is_premium = !is_free_price(&price);
    TrailerRepo::create_with_media(
        pool,
        &CreateMedia {
            title: title.to_string(),
            description: title.to_string(),
            user_id,
        },
        &CreateTrailer {
            sequence_number: video_number,
            external_id: external_id.to_string(),
            thumbnail_id: opt_nonempty(&row.thumbnail_id),
            price,
            duration: length,
            creators,
            detailed_description: Some(detailed),
            upload_status: status.as_str().to_string(),
            tags: serde_json::json!([]),
            is_featured: false,
            is_premium,
        },
    )
    .await?;
    tracing::info!(video_number, title, "created");
    Ok(RowOutcome::Created)
}

/// Link a VideoDB CSV against pre-existing media rows: exact
/// case-insensitive title match first, then fuzzy matching above the
/// similarity threshold. Rows without a usable match are skipped.
pub async fn run_link(pool: &DbPool, csv_path: &Path, dry_run: bool) -> anyhow::Result<RunReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("cannot open CSV file {}", csv_path.display()))?;
    validate_headers(reader.headers()?)?;

    let mut media = MediaRepo::titles(pool).await?;
    tracing::info!(count = media.len(), "loaded existing media titles");

    let mut report = RunReport::new(dry_run);
    for (line, row) in reader.deserialize::<CatalogRow>().enumerate() {
        let line = line + 2;
        let outcome = match row {
            Ok(row) => link_row(pool, &row, &mut media, dry_run).await,
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

async fn link_row(
    pool: &DbPool,
    row: &CatalogRow,
    media: &mut [reelmeta_db::models::media::MediaTitle],
    dry_run: bool,
) -> anyhow::Result<RowOutcome> {
    let video_number = parse_video_number(&row.video_number)?;
    let title = row.description.trim();
    if title.is_empty() {
        bail!("Missing Description (title)");
    }
    let external_id = row.video_id.trim();
    if external_id.is_empty() {
        tracing::info!(video_number, "skipping, missing Video ID");
        return Ok(RowOutcome::Skipped);
    }

    // Exact case-insensitive title match wins outright.
    let matched = match media.iter().position(|m| m.title.eq_ignore_ascii_case(title)) {
        Some(idx) => Some(idx),
        None => {
            let found = best_match(title, media.iter().map(|m| m.title.as_str()));
            if let Some((idx, score)) = found {
                tracing::info!(video_number, score, matched = %media[idx].title, "fuzzy match");
            }
            found.map(|(idx, _)| idx)
        }
    };

    let Some(idx) = matched else {
        tracing::info!(video_number, title, "skipping, no matching media");
        return Ok(RowOutcome::Skipped);
    };
    if media[idx].has_trailer {
        tracing::info!(video_number, "skipping, trailer already exists");
        return Ok(RowOutcome::Skipped);
    }

    let status = UploadStatus::normalize(row.upload_status.trim());
    if dry_run {
        tracing::info!(video_number, media_id = media[idx].id, title, "would link");
        return Ok(RowOutcome::Linked);
    }

    let price = row.price.trim().to_string();
    let is_premium = !is_free_price(&price);
    TrailerRepo::create(
        pool,
        media[idx].id,
        &CreateTrailer {
            sequence_number: video_number,
            external_id: external_id.to_string(),
            thumbnail_id: opt_nonempty(&row.thumbnail_id),
            price,
            duration: row.length.trim().to_string(),
            creators: row.creators.trim().to_string(),
            detailed_description: Some(
                opt_nonempty(&row.detailed_description).unwrap_or_else(|| title.to_string()),
            ),
            upload_status: status.as_str().to_string(),
            tags: serde_json::json!([]),
            is_featured: false,
            is_premium,
        },
    )
    .await?;
    media[idx].has_trailer = true;
    tracing::info!(video_number, media_id = media[idx].id, title, "linked");
    Ok(RowOutcome::Linked)
}
