//! Repository for trailer records.
//!
//! All reads return [`TrailerRecord`], the trailer row joined with its
//! owning media's title and description. Every mutation refreshes
//! `updated_at`; `created_at` is never touched after insert.

use chrono::NaiveDate;
use reelmeta_core::types::DbId;
use sqlx::PgPool;

use crate::models::media::CreateMedia;
use crate::models::trailer::{
    CatalogUpdate, CreateTrailer, TrailerFilter, TrailerOrdering, TrailerRecord, TrailerStats,
    UpdateTrailer,
};

/// Column list for joined trailer queries. Expects the trailer row
/// aliased `t` and its media row aliased `m`.
const TRAILER_COLUMNS: &str =
    "t.id, t.media_id, t.sequence_number, t.external_id, t.thumbnail_id, t.price, \
     t.duration, t.creators, t.detailed_description, t.upload_status, t.tags, \
     t.is_featured, t.is_premium, t.release_date, t.created_at, t.updated_at, \
     m.title, m.description";

/// Insert column list shared by the two create paths.
const INSERT_COLUMNS: &str =
    "media_id, sequence_number, external_id, thumbnail_id, price, duration, creators, \
     detailed_description, upload_status, tags, is_featured, is_premium";

/// CRUD and query operations for the `trailers` table.
pub struct TrailerRepo;

impl TrailerRepo {
    /// Create a trailer attached to an existing media row.
    ///
    /// A duplicate `external_id` surfaces as a 23505 database error on
    /// the `uq_trailers_external_id` constraint.
    pub async fn create(
        pool: &PgPool,
        media_id: DbId,
        input: &CreateTrailer,
    ) -> Result<TrailerRecord, sqlx::Error> {
        let sql = format!(
            "WITH t AS ( \
                INSERT INTO trailers ({INSERT_COLUMNS}) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
                RETURNING * \
             ) \
             SELECT {TRAILER_COLUMNS} FROM t JOIN media m ON m.id = t.media_id"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(media_id)
            .bind(input.sequence_number)
            .bind(&input.external_id)
            .bind(&input.thumbnail_id)
            .bind(&input.price)
            .bind(&input.duration)
            .bind(&input.creators)
            .bind(&input.detailed_description)
            .bind(&input.upload_status)
            .bind(&input.tags)
            .bind(input.is_featured)
            .bind(input.is_premium)
            .fetch_one(pool)
            .await
    }

    /// Create a media row and its trailer atomically. Either both rows
    /// exist afterwards or neither does.
    pub async fn create_with_media(
        pool: &PgPool,
        media: &CreateMedia,
        input: &CreateTrailer,
    ) -> Result<TrailerRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let media_id: DbId = sqlx::query_scalar(
            "INSERT INTO media (title, description, user_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&media.title)
        .bind(&media.description)
        .bind(media.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let sql = format!(
            "WITH t AS ( \
                INSERT INTO trailers ({INSERT_COLUMNS}) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
                RETURNING * \
             ) \
             SELECT {TRAILER_COLUMNS} FROM t JOIN media m ON m.id = t.media_id"
        );
        let record = sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(media_id)
            .bind(input.sequence_number)
            .bind(&input.external_id)
            .bind(&input.thumbnail_id)
            .bind(&input.price)
            .bind(&input.duration)
            .bind(&input.creators)
            .bind(&input.detailed_description)
            .bind(&input.upload_status)
            .bind(&input.tags)
            .bind(input.is_featured)
            .bind(input.is_premium)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Find a trailer by its provider-assigned external id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {TRAILER_COLUMNS} FROM trailers t \
             JOIN media m ON m.id = t.media_id \
             WHERE t.external_id = $1"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a trailer by its operator-assigned sequence number.
    ///
    /// Sequence numbers are not unique; when duplicates exist the most
    /// recently created row wins.
    pub async fn find_by_sequence_number(
        pool: &PgPool,
        sequence_number: i32,
    ) -> Result<Option<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {TRAILER_COLUMNS} FROM trailers t \
             JOIN media m ON m.id = t.media_id \
             WHERE t.sequence_number = $1 \
             ORDER BY t.created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(sequence_number)
            .fetch_optional(pool)
            .await
    }

    /// List trailers matching the SQL-level filter, ordered and paged.
    ///
    /// Price and duration range predicates are NOT applied here; the
    /// caller evaluates them over the returned rows with the label
    /// parsers (the numeric values are derived, not stored).
    ///
    /// `None` for limit or offset means unbounded (Postgres treats a
    /// NULL LIMIT/OFFSET as absent).
    pub async fn list(
        pool: &PgPool,
        filter: &TrailerFilter,
        ordering: TrailerOrdering,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {TRAILER_COLUMNS} FROM trailers t \
             JOIN media m ON m.id = t.media_id \
             WHERE ($1::TEXT IS NULL OR t.upload_status = $1) \
               AND ($2::TEXT IS NULL OR t.creators ILIKE '%' || $2 || '%') \
               AND ($3::BOOLEAN IS NULL OR t.is_featured = $3) \
               AND ($4::BOOLEAN IS NULL OR t.is_premium = $4) \
               AND (NOT $5 OR t.price ILIKE 'FREE' OR t.price = '$0') \
               AND (NOT $6 OR (t.is_premium AND NOT (t.price ILIKE 'FREE' OR t.price = '$0'))) \
               AND ($7::TIMESTAMPTZ IS NULL OR t.created_at >= $7) \
               AND ($8::TIMESTAMPTZ IS NULL OR t.created_at <= $8) \
               AND ($9::TEXT IS NULL \
                    OR m.title ILIKE '%' || $9 || '%' \
                    OR m.description ILIKE '%' || $9 || '%' \
                    OR COALESCE(t.detailed_description, '') ILIKE '%' || $9 || '%' \
                    OR t.creators ILIKE '%' || $9 || '%' \
                    OR t.tags::TEXT ILIKE '%' || $9 || '%') \
             ORDER BY {} \
             LIMIT $10 OFFSET $11",
            ordering.sql()
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(&filter.status)
            .bind(&filter.creator)
            .bind(filter.is_featured)
            .bind(filter.is_premium)
            .bind(filter.free_only)
            .bind(filter.paid_premium_only)
            .bind(filter.created_after)
            .bind(filter.created_before)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every trailer ordered by sequence number, for the VideoDB
    /// export.
    pub async fn list_for_export(pool: &PgPool) -> Result<Vec<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {TRAILER_COLUMNS} FROM trailers t \
             JOIN media m ON m.id = t.media_id \
             ORDER BY t.sequence_number ASC"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql).fetch_all(pool).await
    }

    /// Partial update by external id. `None` fields are left as-is.
    /// Returns `None` when no row matched.
    pub async fn update(
        pool: &PgPool,
        external_id: &str,
        input: &UpdateTrailer,
    ) -> Result<Option<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "WITH t AS ( \
                UPDATE trailers SET \
                    sequence_number = COALESCE($2, sequence_number), \
                    thumbnail_id = COALESCE($3, thumbnail_id), \
                    price = COALESCE($4, price), \
                    duration = COALESCE($5, duration), \
                    creators = COALESCE($6, creators), \
                    detailed_description = COALESCE($7, detailed_description), \
                    upload_status = COALESCE($8, upload_status), \
                    tags = COALESCE($9, tags), \
                    is_featured = COALESCE($10, is_featured), \
                    is_premium = COALESCE($11, is_premium), \
                    release_date = COALESCE($12, release_date), \
                    updated_at = NOW() \
                WHERE external_id = $1 \
                RETURNING * \
             ) \
             SELECT {TRAILER_COLUMNS} FROM t JOIN media m ON m.id = t.media_id"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(external_id)
            .bind(input.sequence_number)
            .bind(&input.thumbnail_id)
            .bind(&input.price)
            .bind(&input.duration)
            .bind(&input.creators)
            .bind(&input.detailed_description)
            .bind(&input.upload_status)
            .bind(&input.tags)
            .bind(input.is_featured)
            .bind(input.is_premium)
            .bind(input.release_date)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite catalog-sourced fields (import `--update` path). The
    /// owning media's title and description are rewritten to the CSV
    /// description in the same transaction, matching the import
    /// source's title-as-description convention.
    pub async fn update_catalog(
        pool: &PgPool,
        external_id: &str,
        input: &CatalogUpdate,
    ) -> Result<Option<TrailerRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE media m SET title = $2, description = $2, updated_at = NOW() \
             FROM trailers t \
             WHERE t.media_id = m.id AND t.external_id = $1",
        )
        .bind(external_id)
        .bind(&input.title)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            "WITH t AS ( \
                UPDATE trailers SET \
                    sequence_number = $2, \
                    thumbnail_id = $3, \
                    price = $4, \
                    duration = $5, \
                    creators = $6, \
                    detailed_description = $7, \
                    upload_status = $8, \
                    updated_at = NOW() \
                WHERE external_id = $1 \
                RETURNING * \
             ) \
             SELECT {TRAILER_COLUMNS} FROM t JOIN media m ON m.id = t.media_id"
        );
        let record = sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(external_id)
            .bind(input.sequence_number)
            .bind(&input.thumbnail_id)
            .bind(&input.price)
            .bind(&input.duration)
            .bind(&input.creators)
            .bind(&input.detailed_description)
            .bind(&input.upload_status)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Flip the featured flag. Returns `None` when no row matched.
    pub async fn toggle_featured(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "WITH t AS ( \
                UPDATE trailers SET is_featured = NOT is_featured, updated_at = NOW() \
                WHERE external_id = $1 \
                RETURNING * \
             ) \
             SELECT {TRAILER_COLUMNS} FROM t JOIN media m ON m.id = t.media_id"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Set the upload status (used by status-refresh operations).
    pub async fn update_status(
        pool: &PgPool,
        external_id: &str,
        status: &str,
    ) -> Result<Option<TrailerRecord>, sqlx::Error> {
        let sql = format!(
            "WITH t AS ( \
                UPDATE trailers SET upload_status = $2, updated_at = NOW() \
                WHERE external_id = $1 \
                RETURNING * \
             ) \
             SELECT {TRAILER_COLUMNS} FROM t JOIN media m ON m.id = t.media_id"
        );
        sqlx::query_as::<_, TrailerRecord>(&sql)
            .bind(external_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Apply a supplemental-pipeline row: always sets the release
    /// date; description and creators only when the source provided a
    /// non-empty value (empty supplements never erase existing data).
    pub async fn apply_supplemental(
        pool: &PgPool,
        id: DbId,
        release_date: NaiveDate,
        detailed_description: Option<&str>,
        creators: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE trailers SET \
                release_date = $2, \
                detailed_description = COALESCE($3, detailed_description), \
                creators = COALESCE($4, creators), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(release_date)
        .bind(detailed_description)
        .bind(creators)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Aggregate counts for the stats endpoint.
    pub async fn stats(pool: &PgPool) -> Result<TrailerStats, sqlx::Error> {
        sqlx::query_as::<_, TrailerStats>(
            "SELECT \
                COUNT(*) AS total_trailers, \
                COUNT(*) FILTER (WHERE is_featured) AS featured_trailers, \
                COUNT(*) FILTER (WHERE is_premium) AS premium_trailers, \
                COUNT(*) FILTER (WHERE price ILIKE 'FREE' OR price = '$0') AS free_trailers, \
                COUNT(*) FILTER (WHERE upload_status = 'Complete') AS completed_uploads, \
                COUNT(*) FILTER (WHERE upload_status = 'Pending') AS pending_uploads, \
                COUNT(*) FILTER (WHERE upload_status = 'Processing') AS processing_uploads, \
                COUNT(*) FILTER (WHERE upload_status = 'Error') AS error_uploads, \
                COUNT(DISTINCT creators) AS unique_creators \
             FROM trailers",
        )
        .fetch_one(pool)
        .await
    }

    /// Total row count. Used by dry-run verification and tests.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM trailers")
            .fetch_one(pool)
            .await
    }
}
