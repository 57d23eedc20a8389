//! Route definitions for the `/trailers` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::trailer;
use crate::state::AppState;

/// Routes mounted at `/trailers`. Static segments are registered before
/// the `{external_id}` capture so `stats`, `featured` etc. are never
/// swallowed by the detail route.
///
/// ```text
/// GET    /                                 -> list (public)
/// POST   /                                 -> create (auth)
/// GET    /stats                            -> stats (public)
/// GET    /featured                         -> featured sub-list (public)
/// GET    /free                             -> free sub-list (public)
/// GET    /premium                          -> paid premium sub-list (public)
/// GET    /by-creator?name=                 -> creator sub-list (public)
/// POST   /upload                           -> multipart upload (auth)
/// GET    /{external_id}                    -> retrieve (public)
/// PUT    /{external_id}                    -> update (auth)
/// DELETE /{external_id}                    -> delete owning media (auth)
/// POST   /{external_id}/toggle-featured    -> toggle featured (auth)
/// POST   /{external_id}/refresh-status     -> poll provider once (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trailer::list).post(trailer::create))
        .route("/stats", get(trailer::stats))
        .route("/featured", get(trailer::featured))
        .route("/free", get(trailer::free))
        .route("/premium", get(trailer::premium))
        .route("/by-creator", get(trailer::by_creator))
        .route(
            "/upload",
            post(trailer::upload).layer(DefaultBodyLimit::max(trailer::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/{external_id}",
            get(trailer::retrieve)
                .put(trailer::update)
                .delete(trailer::delete),
        )
        .route(
            "/{external_id}/toggle-featured",
            post(trailer::toggle_featured),
        )
        .route(
            "/{external_id}/refresh-status",
            post(trailer::refresh_status),
        )
}
