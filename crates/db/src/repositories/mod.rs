//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-statement
//! operations open their own transaction and commit before returning,
//! so a single repository call is always atomic.

pub mod media_repo;
pub mod trailer_repo;
pub mod user_repo;

pub use media_repo::MediaRepo;
pub use trailer_repo::TrailerRepo;
pub use user_repo::UserRepo;
