//! Trailer catalog handlers.
//!
//! Trailers are addressed by their provider-assigned external id. Read
//! endpoints are public; every mutation requires authentication.

use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use reelmeta_core::error::CoreError;
use reelmeta_core::pricing::is_free_price;
use reelmeta_core::status::UploadStatus;
use reelmeta_db::models::media::CreateMedia;
use reelmeta_db::models::trailer::{
    CreateTrailer, TrailerFilter, TrailerRecord, TrailerStats, UpdateTrailer,
};
use reelmeta_db::repositories::media_repo::MediaRepo;
use reelmeta_db::repositories::trailer_repo::TrailerRepo;
use reelmeta_db::DbPool;
use reelmeta_stream::{StreamClient, VideoDetails};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::TrailerListParams;
use crate::response::DataResponse;
use crate::serializer::TrailerView;
use crate::state::AppState;

/// Content types accepted by the upload endpoint.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/mov",
    "video/avi",
    "video/webm",
    "video/quicktime",
];

/// Upload size cap, 2 GiB.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Interval between provider status polls during an upload.
const UPLOAD_POLL_INTERVAL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateTrailerRequest {
    pub title: String,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub sequence_number: i32,
    pub external_id: String,
    pub thumbnail_id: Option<String>,
    pub price: Option<String>,
    pub duration: Option<String>,
    pub creators: Option<String>,
    pub upload_status: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreatorParams {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for the status-refresh endpoint: the updated record plus
/// the raw provider observation it was folded from.
#[derive(Debug, Serialize)]
pub struct RefreshStatusResponse {
    pub data: TrailerView,
    pub provider_state: String,
    pub ready_to_stream: bool,
    pub duration_seconds: Option<f64>,
}

/// Response for the upload endpoint. `ready` is false when the
/// provider was still processing at the end of the wait window.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub data: TrailerView,
    pub ready: bool,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

async fn fetch_by_external_id(pool: &DbPool, external_id: &str) -> AppResult<TrailerRecord> {
    TrailerRepo::find_by_external_id(pool, external_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Trailer",
                key: external_id.to_string(),
            })
        })
}

fn require_stream(state: &AppState) -> AppResult<&StreamClient> {
    state
        .stream
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("Streaming provider is not configured".into()))
}

/// Run a list query. When a derived-value filter (price or duration
/// range) is present, every SQL-matching row is fetched and the range
/// check and paging happen in memory, because the numeric values only
/// exist after parsing the stored labels.
async fn list_with(
    pool: &DbPool,
    params: &TrailerListParams,
    filter: TrailerFilter,
) -> AppResult<Vec<TrailerView>> {
    let ordering = params.ordering()?;
    let records = if params.has_derived_filters() {
        TrailerRepo::list(pool, &filter, ordering, None, None)
            .await?
            .into_iter()
            .filter(|r| params.matches_derived(r))
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect()
    } else {
        TrailerRepo::list(
            pool,
            &filter,
            ordering,
            Some(params.limit()),
            Some(params.offset()),
        )
        .await?
    };
    Ok(records.into_iter().map(TrailerView::from).collect())
}

fn validated_status(raw: Option<&str>) -> AppResult<Option<&str>> {
    match raw {
        None => Ok(None),
        Some(s) => match UploadStatus::from_str(s) {
            Some(_) => Ok(Some(s)),
            None => Err(AppError::BadRequest(format!("Invalid upload status: {s}"))),
        },
    }
}

// ---------------------------------------------------------------------------
// Public reads
// ---------------------------------------------------------------------------

/// `GET /trailers`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TrailerListParams>,
) -> AppResult<Json<DataResponse<Vec<TrailerView>>>> {
    let filter = params.filter()?;
    let data = list_with(&state.pool, &params, filter).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /trailers/featured`
pub async fn featured(
    State(state): State<AppState>,
    Query(params): Query<TrailerListParams>,
) -> AppResult<Json<DataResponse<Vec<TrailerView>>>> {
    let mut filter = params.filter()?;
    filter.is_featured = Some(true);
    let data = list_with(&state.pool, &params, filter).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /trailers/free`
pub async fn free(
    State(state): State<AppState>,
    Query(params): Query<TrailerListParams>,
) -> AppResult<Json<DataResponse<Vec<TrailerView>>>> {
    let mut filter = params.filter()?;
    filter.free_only = true;
    let data = list_with(&state.pool, &params, filter).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /trailers/premium`
///
/// Premium here means paid premium: the premium flag set and a price
/// that is not a free label.
pub async fn premium(
    State(state): State<AppState>,
    Query(params): Query<TrailerListParams>,
) -> AppResult<Json<DataResponse<Vec<TrailerView>>>> {
    let mut filter = params.filter()?;
    filter.paid_premium_only = true;
    let data = list_with(&state.pool, &params, filter).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /trailers/by-creator?name=`
pub async fn by_creator(
    State(state): State<AppState>,
    Query(params): Query<CreatorParams>,
) -> AppResult<Json<DataResponse<Vec<TrailerView>>>> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Missing required query parameter: name".to_string())
        })?;

    let list_params = TrailerListParams {
        limit: params.limit,
        offset: params.offset,
        ..Default::default()
    };
    let filter = TrailerFilter {
        creator: Some(name.to_string()),
        ..Default::default()
    };
    let data = list_with(&state.pool, &list_params, filter).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /trailers/stats`
pub async fn stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<TrailerStats>>> {
    let data = TrailerRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// `GET /trailers/{external_id}`
pub async fn retrieve(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> AppResult<Json<TrailerView>> {
    let record = fetch_by_external_id(&state.pool, &external_id).await?;
    Ok(Json(TrailerView::from(record)))
}

// ---------------------------------------------------------------------------
// Authenticated mutations
// ---------------------------------------------------------------------------

/// `POST /trailers`
///
/// Creates the owning media row and the trailer atomically. The
/// premium flag is derived from the price at creation time and is not
/// recomputed by later price updates.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateTrailerRequest>,
) -> AppResult<(StatusCode, Json<TrailerView>)> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Missing title".to_string()));
    }
    if body.external_id.trim().is_empty() {
        return Err(AppError::BadRequest("Missing external_id".to_string()));
    }

    let price = body.price.unwrap_or_else(|| "FREE".to_string());
    let upload_status = match validated_status(body.upload_status.as_deref())? {
        Some(s) => s.to_string(),
        None => UploadStatus::Pending.as_str().to_string(),
    };

    let media = CreateMedia {
        title: title.to_string(),
        description: body.description.unwrap_or_else(|| title.to_string()),
        user_id: user.user_id,
    };
    let trailer = CreateTrailer {
        sequence_number: body.sequence_number,
        external_id: body.external_id.trim().to_string(),
        thumbnail_id: body.thumbnail_id,
        is_premium: !is_free_price(&price),
        price,
        duration: body.duration.unwrap_or_default(),
        creators: body.creators.unwrap_or_default(),
        detailed_description: body.detailed_description,
        upload_status,
        tags: body.tags.unwrap_or_else(|| serde_json::json!([])),
        is_featured: body.is_featured.unwrap_or(false),
    };

    let record = TrailerRepo::create_with_media(&state.pool, &media, &trailer).await?;
    tracing::info!(external_id = %record.external_id, user_id = user.user_id, "trailer created");
    Ok((StatusCode::CREATED, Json(TrailerView::from(record))))
}

/// `PUT /trailers/{external_id}`
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(external_id): Path<String>,
    Json(body): Json<UpdateTrailer>,
) -> AppResult<Json<TrailerView>> {
    validated_status(body.upload_status.as_deref())?;

    let record = TrailerRepo::update(&state.pool, &external_id, &body)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Trailer",
                key: external_id.clone(),
            })
        })?;
    tracing::info!(external_id = %external_id, user_id = user.user_id, "trailer updated");
    Ok(Json(TrailerView::from(record)))
}

/// `DELETE /trailers/{external_id}`
///
/// Deletes the owning media row; the trailer goes with it via the
/// foreign-key cascade, which is the only deletion path for trailers.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(external_id): Path<String>,
) -> AppResult<StatusCode> {
    let record = fetch_by_external_id(&state.pool, &external_id).await?;
    MediaRepo::delete(&state.pool, record.media_id).await?;
    tracing::info!(external_id = %external_id, user_id = user.user_id, "trailer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /trailers/{external_id}/toggle-featured`
pub async fn toggle_featured(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(external_id): Path<String>,
) -> AppResult<Json<TrailerView>> {
    let record = TrailerRepo::toggle_featured(&state.pool, &external_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Trailer",
                key: external_id.clone(),
            })
        })?;
    Ok(Json(TrailerView::from(record)))
}

/// `POST /trailers/{external_id}/refresh-status`
///
/// Polls the provider once and folds the observed state into the
/// stored upload status. Answers 503 when no provider is configured.
pub async fn refresh_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(external_id): Path<String>,
) -> AppResult<Json<RefreshStatusResponse>> {
    let stream = require_stream(&state)?;
    fetch_by_external_id(&state.pool, &external_id).await?;

    let details = stream.video_details(&external_id).await?;
    let status = details.upload_status();

    let record = TrailerRepo::update_status(&state.pool, &external_id, status.as_str())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Trailer",
                key: external_id.clone(),
            })
        })?;

    tracing::info!(external_id = %external_id, status = %status, "upload status refreshed");
    Ok(Json(RefreshStatusResponse {
        data: TrailerView::from(record),
        provider_state: details.status.state,
        ready_to_stream: details.ready_to_stream,
        duration_seconds: details.duration,
    }))
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    title: Option<String>,
    sequence_number: Option<i32>,
    price: Option<String>,
    duration: Option<String>,
    creators: Option<String>,
    detailed_description: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
                    return Err(AppError::BadRequest(format!(
                        "Unsupported content type: {content_type}. Allowed: {}",
                        ALLOWED_CONTENT_TYPES.join(", ")
                    )));
                }
                let file_name = field.file_name().unwrap_or("upload.mp4").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::BadRequest(
                        "File exceeds the 2 GiB upload limit".to_string(),
                    ));
                }
                form.file = Some((file_name, bytes.to_vec()));
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid field {other}: {e}")))?;
                match other {
                    "title" => form.title = Some(value),
                    "sequence_number" => {
                        let parsed = value.trim().parse::<i32>().map_err(|_| {
                            AppError::BadRequest(format!("Invalid sequence_number: {value}"))
                        })?;
                        form.sequence_number = Some(parsed);
                    }
                    "price" => form.price = Some(value),
                    "duration" => form.duration = Some(value),
                    "creators" => form.creators = Some(value),
                    "detailed_description" => form.detailed_description = Some(value),
                    _ => {} // unknown fields are ignored
                }
            }
        }
    }

    Ok(form)
}

/// `POST /trailers/upload`
///
/// Multipart upload: sends the file to the streaming provider, waits
/// up to the configured window for processing, then creates the media
/// and trailer rows. A wait timeout is inconclusive; the rows are
/// still created with a `Processing` status for a later refresh. If
/// row creation fails the uploaded video is deleted from the provider.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let stream = require_stream(&state)?;
    let form = read_upload_form(multipart).await?;

    let (file_name, bytes) = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing required file field: video".to_string()))?;
    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing title".to_string()))?
        .to_string();
    let sequence_number = form
        .sequence_number
        .ok_or_else(|| AppError::BadRequest("Missing sequence_number".to_string()))?;

    let max_wait = Duration::from_secs(state.config.upload_wait_secs);
    let (uid, details) = stream
        .upload_and_wait(&title, &file_name, bytes, max_wait, UPLOAD_POLL_INTERVAL)
        .await?;

    let status = details
        .as_ref()
        .map(VideoDetails::upload_status)
        .unwrap_or(UploadStatus::Processing);
    let price = form.price.unwrap_or_else(|| "FREE".to_string());

    let media = CreateMedia {
        title: title.clone(),
        description: title.clone(),
        user_id: user.user_id,
    };
    let trailer = CreateTrailer {
        sequence_number,
        external_id: uid.clone(),
        thumbnail_id: None,
        is_premium: !is_free_price(&price),
        price,
        duration: form.duration.unwrap_or_default(),
        creators: form.creators.unwrap_or_default(),
        detailed_description: form.detailed_description,
        upload_status: status.as_str().to_string(),
        tags: serde_json::json!([]),
        is_featured: false,
    };

    let record = match TrailerRepo::create_with_media(&state.pool, &media, &trailer).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(uid = %uid, error = %err, "record creation failed, deleting upload");
            if let Err(cleanup) = stream.delete_video(&uid).await {
                tracing::warn!(uid = %uid, error = %cleanup, "cleanup delete failed");
            }
            return Err(err.into());
        }
    };

    tracing::info!(uid = %uid, status = %status, user_id = user.user_id, "video uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            ready: status == UploadStatus::Complete,
            data: TrailerView::from(record),
        }),
    ))
}
