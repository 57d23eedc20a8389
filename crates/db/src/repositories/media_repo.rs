//! Repository for media entities.

use reelmeta_core::types::DbId;
use sqlx::PgPool;

use crate::models::media::{CreateMedia, Media, MediaTitle};

/// Column list for `media` queries.
const MEDIA_COLUMNS: &str = "id, title, description, user_id, created_at, updated_at";

/// CRUD operations for the `media` table.
pub struct MediaRepo;

impl MediaRepo {
    /// Create a new media row.
    pub async fn create(pool: &PgPool, input: &CreateMedia) -> Result<Media, sqlx::Error> {
        let sql = format!(
            "INSERT INTO media (title, description, user_id) \
             VALUES ($1, $2, $3) \
             RETURNING {MEDIA_COLUMNS}"
        );
        sqlx::query_as::<_, Media>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Find a media row by internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Media>, sqlx::Error> {
        let sql = format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = $1");
        sqlx::query_as::<_, Media>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every media title together with whether a trailer is
    /// already linked to it. Drives the link pipeline's match scan.
    pub async fn titles(pool: &PgPool) -> Result<Vec<MediaTitle>, sqlx::Error> {
        sqlx::query_as::<_, MediaTitle>(
            "SELECT m.id, m.title, (t.id IS NOT NULL) AS has_trailer \
             FROM media m \
             LEFT JOIN trailers t ON t.media_id = m.id \
             ORDER BY m.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a media row. Returns `false` when no row matched. The
    /// linked trailer row, if any, goes with it via cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
