//! Client for the Cloudflare Stream video hosting API.
//!
//! Handles direct-upload handshakes, status polling, metadata updates,
//! and deletion, plus pure helpers for building delivery URLs from a
//! video uid.

pub mod client;
pub mod config;
pub mod error;

pub use client::{stream_url, thumbnail_url, StreamClient, VideoDetails};
pub use config::StreamConfig;
pub use error::StreamError;
