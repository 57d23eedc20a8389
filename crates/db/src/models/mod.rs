//! Row models and DTOs.

pub mod media;
pub mod trailer;
pub mod user;
