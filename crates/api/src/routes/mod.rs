pub mod auth;
pub mod health;
pub mod trailer;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                login (public)
///
/// /trailers                                  list (public), create (auth)
/// /trailers/stats                            aggregate counts (public)
/// /trailers/featured                         featured sub-list (public)
/// /trailers/free                             free sub-list (public)
/// /trailers/premium                          paid premium sub-list (public)
/// /trailers/by-creator                       creator sub-list (public, ?name=)
/// /trailers/upload                           multipart upload (auth)
/// /trailers/{external_id}                    get (public), update, delete (auth)
/// /trailers/{external_id}/toggle-featured    flip featured flag (auth, POST)
/// /trailers/{external_id}/refresh-status     poll provider once (auth, POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/trailers", trailer::router())
}
