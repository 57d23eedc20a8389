//! Integration tests for the CSV reconciliation pipelines.
//!
//! Each test writes a small CSV to the system temp directory and runs
//! a pipeline against a fresh database.

use std::path::PathBuf;

use reelmeta_db::models::media::CreateMedia;
use reelmeta_db::models::trailer::CreateTrailer;
use reelmeta_db::models::user::CreateUser;
use reelmeta_db::repositories::{MediaRepo, TrailerRepo, UserRepo};
use reelmeta_importer::catalog::{self, ImportOptions};
use reelmeta_importer::supplemental;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CATALOG_HEADER: &str = "Video Number,Description,Price,Length,Creators,Video ID,Thumbnail ID,Upload Status,Detailed Description";

fn write_csv(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("reelmeta-{}-{}.csv", name, std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

fn import_options(update: bool, dry_run: bool) -> ImportOptions {
    ImportOptions {
        username: "admin".to_string(),
        update_existing: update,
        dry_run,
    }
}

async fn seed_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: "admin".to_string(),
            password_hash: "!".to_string(),
            role: "admin".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn base_trailer(seq: i32, external_id: &str) -> CreateTrailer {
    CreateTrailer {
        sequence_number: seq,
        external_id: external_id.to_string(),
        thumbnail_id: None,
        price: "$20".to_string(),
        duration: "25 Minutes".to_string(),
        creators: "Studio A".to_string(),
        detailed_description: None,
        upload_status: "Complete".to_string(),
        tags: serde_json::json!([]),
        is_featured: false,
        is_premium: true,
    }
}

// ---------------------------------------------------------------------------
// Pipeline A: import
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_twice_is_idempotent(pool: PgPool) {
    let csv = format!(
        "{CATALOG_HEADER}\n\
         Video 1,Midnight Run,$25.00,25 Minutes,Studio A,cf-aaa,thumb-a,Complete,\n"
    );
    let path = write_csv("import-twice", &csv);

    let first = catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap();
    assert_eq!(first.created, 1);
    assert_eq!(first.skipped, 0);
    assert!(first.errors.is_empty());

    let second = catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 1);

    assert_eq!(TrailerRepo::count(&pool).await.unwrap(), 1);

    let record = TrailerRepo::find_by_external_id(&pool, "cf-aaa")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.title, "Midnight Run");
    assert_eq!(record.sequence_number, 1);
    assert!(record.is_premium);
    // Detailed description falls back to the title when the column is
    // empty.
    assert_eq!(record.detailed_description.as_deref(), Some("Midnight Run"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_update_mode_overwrites(pool: PgPool) {
    let path = write_csv(
        "import-orig",
        &format!("{CATALOG_HEADER}\nVideo 1,Old Name,$25.00,25 Minutes,Studio A,cf-up,,Complete,\n"),
    );
    catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap();

    let path = write_csv(
        "import-update",
        &format!("{CATALOG_HEADER}\nVideo 9,New Name,FREE,1 Hour,Studio B,cf-up,thumb-9,Pending,Blurb\n"),
    );
    let report = catalog::run_import(&pool, &path, &import_options(true, false))
        .await
        .unwrap();
    assert_eq!(report.updated, 1);

    let record = TrailerRepo::find_by_external_id(&pool, "cf-up")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.title, "New Name");
    assert_eq!(record.description, "New Name");
    assert_eq!(record.sequence_number, 9);
    assert_eq!(record.price, "FREE");
    assert_eq!(record.creators, "Studio B");
    assert_eq!(record.detailed_description.as_deref(), Some("Blurb"));
    // Premium was decided at creation; updating the price to FREE does
    // not flip it.
    assert!(record.is_premium);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_dry_run_makes_no_changes(pool: PgPool) {
    let csv = format!(
        "{CATALOG_HEADER}\n\
         Video 1,One,$5,10 Minutes,A,cf-1,,Complete,\n\
         Video 2,Two,FREE,15 Minutes,B,cf-2,,Complete,\n"
    );
    let path = write_csv("dry-run", &csv);

    let report = catalog::run_import(&pool, &path, &import_options(false, true))
        .await
        .unwrap();
    assert!(report.dry_run);
    assert_eq!(report.created, 2);

    assert_eq!(TrailerRepo::count(&pool).await.unwrap(), 0);
    // The importing user is not created in dry-run mode either.
    assert!(UserRepo::find_by_username(&pool, "admin")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_collects_row_errors_and_continues(pool: PgPool) {
    let csv = format!(
        "{CATALOG_HEADER}\n\
         Video one,Bad Number,$5,10 Minutes,A,cf-x,,Complete,\n\
         Video 2,,$5,10 Minutes,A,cf-y,,Complete,\n\
         Video 3,Good Row,$5,10 Minutes,A,cf-z,,Complete,\n"
    );
    let path = write_csv("row-errors", &csv);

    let report = catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("Row 2:"));
    assert!(report.errors[0].contains("Video Number"));
    assert!(report.errors[1].starts_with("Row 3:"));
    assert!(report.errors[1].contains("Description"));

    assert_eq!(TrailerRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_pads_short_rows(pool: PgPool) {
    // Row ends after Video ID; the trailing columns are treated as
    // empty, not as a malformed record.
    let csv = format!("{CATALOG_HEADER}\nVideo 4,Short Row,$5,10 Minutes,A,cf-short\n");
    let path = write_csv("short-row", &csv);

    let report = catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap();
    assert_eq!(report.created, 1);
    assert!(report.errors.is_empty());

    let record = TrailerRepo::find_by_external_id(&pool, "cf-short")
        .await
        .unwrap()
        .unwrap();
    assert!(record.thumbnail_id.is_none());
    assert_eq!(record.upload_status, "Complete");
    assert_eq!(record.detailed_description.as_deref(), Some("Short Row"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_rejects_missing_header_columns(pool: PgPool) {
    let path = write_csv(
        "bad-header",
        "Video Number,Description,Price\nVideo 1,X,$5\n",
    );
    let err = catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Missing required columns"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_normalizes_unknown_status(pool: PgPool) {
    let path = write_csv(
        "status-norm",
        &format!("{CATALOG_HEADER}\nVideo 1,Show,$5,10 Minutes,A,cf-st,,Uploaded!!,\n"),
    );
    catalog::run_import(&pool, &path, &import_options(false, false))
        .await
        .unwrap();

    let record = TrailerRepo::find_by_external_id(&pool, "cf-st")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.upload_status, "Complete");
}

// ---------------------------------------------------------------------------
// Pipeline A: link variant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_link_exact_and_fuzzy_matching(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    MediaRepo::create(
        &pool,
        &CreateMedia {
            title: "Summer Night".to_string(),
            description: "Summer Night".to_string(),
            user_id,
        },
    )
    .await
    .unwrap();
    MediaRepo::create(
        &pool,
        &CreateMedia {
            title: "Winter Day".to_string(),
            description: "Winter Day".to_string(),
            user_id,
        },
    )
    .await
    .unwrap();

    let csv = format!(
        "{CATALOG_HEADER}\n\
         Video 1,WINTER DAY,$5,10 Minutes,A,cf-exact,,Complete,\n\
         Video 2,Summer Nite,$5,10 Minutes,A,cf-fuzzy,,Complete,\n\
         Video 3,Totally Different,$5,10 Minutes,A,cf-none,,Complete,\n"
    );
    let path = write_csv("link-matching", &csv);

    let report = catalog::run_link(&pool, &path, false).await.unwrap();
    assert_eq!(report.linked, 2);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());

    let exact = TrailerRepo::find_by_external_id(&pool, "cf-exact")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exact.title, "Winter Day");

    let fuzzy = TrailerRepo::find_by_external_id(&pool, "cf-fuzzy")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fuzzy.title, "Summer Night");

    assert!(TrailerRepo::find_by_external_id(&pool, "cf-none")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_link_skips_media_with_existing_trailer(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let media = MediaRepo::create(
        &pool,
        &CreateMedia {
            title: "Taken".to_string(),
            description: "Taken".to_string(),
            user_id,
        },
    )
    .await
    .unwrap();
    TrailerRepo::create(&pool, media.id, &base_trailer(1, "cf-old"))
        .await
        .unwrap();

    let path = write_csv(
        "link-taken",
        &format!("{CATALOG_HEADER}\nVideo 2,Taken,$5,10 Minutes,A,cf-new,,Complete,\n"),
    );
    let report = catalog::run_link(&pool, &path, false).await.unwrap();
    assert_eq!(report.linked, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(TrailerRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_link_dry_run_makes_no_changes(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    MediaRepo::create(
        &pool,
        &CreateMedia {
            title: "Preview".to_string(),
            description: "Preview".to_string(),
            user_id,
        },
    )
    .await
    .unwrap();

    let path = write_csv(
        "link-dry",
        &format!("{CATALOG_HEADER}\nVideo 1,Preview,$5,10 Minutes,A,cf-p,,Complete,\n"),
    );
    let report = catalog::run_link(&pool, &path, true).await.unwrap();
    assert_eq!(report.linked, 1);
    assert_eq!(TrailerRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Pipeline B: supplemental update + export
// ---------------------------------------------------------------------------

async fn seed_trailer(pool: &PgPool, seq: i32, external_id: &str, title: &str) {
    let user_id = match UserRepo::find_by_username(pool, "admin").await.unwrap() {
        Some(user) => user.id,
        None => seed_user(pool).await,
    };
    TrailerRepo::create_with_media(
        pool,
        &CreateMedia {
            title: title.to_string(),
            description: title.to_string(),
            user_id,
        },
        &base_trailer(seq, external_id),
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supplemental_applies_date_and_text(pool: PgPool) {
    seed_trailer(&pool, 7, "cf-7", "Seven").await;

    let path = write_csv(
        "sup-apply",
        "video_number,date,extracted_text,creators\n7,\"Nov 7, 2020\",Long blurb,Studio Z\n",
    );
    let report = supplemental::run_update(&pool, &path, false).await.unwrap();
    assert_eq!(report.updated, 1);
    assert!(report.errors.is_empty());

    let record = TrailerRepo::find_by_external_id(&pool, "cf-7")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        record.release_date,
        chrono::NaiveDate::from_ymd_opt(2020, 11, 7)
    );
    assert_eq!(record.detailed_description.as_deref(), Some("Long blurb"));
    assert_eq!(record.creators, "Studio Z");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supplemental_empty_values_do_not_erase(pool: PgPool) {
    seed_trailer(&pool, 3, "cf-3", "Three").await;

    let path = write_csv(
        "sup-empty",
        "video_number,date,extracted_text,creators\n3,2020-11-07,,\n",
    );
    supplemental::run_update(&pool, &path, false).await.unwrap();

    let record = TrailerRepo::find_by_external_id(&pool, "cf-3")
        .await
        .unwrap()
        .unwrap();
    assert!(record.release_date.is_some());
    assert_eq!(record.creators, "Studio A");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supplemental_bad_date_fails_row(pool: PgPool) {
    seed_trailer(&pool, 5, "cf-5", "Five").await;

    let path = write_csv(
        "sup-bad-date",
        "video_number,date,extracted_text,creators\n5,not a date,Blurb,\n",
    );
    let report = supplemental::run_update(&pool, &path, false).await.unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Could not parse date"));

    let record = TrailerRepo::find_by_external_id(&pool, "cf-5")
        .await
        .unwrap()
        .unwrap();
    assert!(record.release_date.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supplemental_pads_short_rows(pool: PgPool) {
    seed_trailer(&pool, 9, "cf-9", "Nine").await;

    // Row carries only the sequence number and the date.
    let path = write_csv(
        "sup-short",
        "video_number,date,extracted_text,creators\n9,\"Nov 7, 2020\"\n",
    );
    let report = supplemental::run_update(&pool, &path, false).await.unwrap();
    assert_eq!(report.updated, 1);
    assert!(report.errors.is_empty());

    let record = TrailerRepo::find_by_external_id(&pool, "cf-9")
        .await
        .unwrap()
        .unwrap();
    assert!(record.release_date.is_some());
    assert_eq!(record.creators, "Studio A");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supplemental_missing_record_is_skipped(pool: PgPool) {
    let path = write_csv(
        "sup-missing",
        "video_number,date,extracted_text,creators\n42,\"Nov 7, 2020\",,\n",
    );
    let report = supplemental::run_update(&pool, &path, false).await.unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_videodb_roundtrips_schema(pool: PgPool) {
    seed_trailer(&pool, 2, "cf-b", "Second").await;
    seed_trailer(&pool, 1, "cf-a", "First").await;

    // Give one row a release date to exercise the formatting.
    let sup = write_csv(
        "export-sup",
        "video_number,date,extracted_text,creators\n1,\"Nov 7, 2020\",,\n",
    );
    supplemental::run_update(&pool, &sup, false).await.unwrap();

    let export = std::env::temp_dir().join(format!("reelmeta-export-{}.csv", std::process::id()));
    let count = supplemental::export_videodb(&pool, &export).await.unwrap();
    assert_eq!(count, 2);

    let mut reader = csv::Reader::from_path(&export).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "Video Number");
    assert_eq!(&headers[9], "Release Date");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    // Ordered by sequence number.
    assert_eq!(&rows[0][0], "Video 1");
    assert_eq!(&rows[0][1], "First");
    assert_eq!(&rows[0][9], "Nov 07, 2020");
    assert_eq!(&rows[1][0], "Video 2");
    assert_eq!(&rows[1][9], "");
}
