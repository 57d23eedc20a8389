//! REST API for the trailer catalog.
//!
//! Read endpoints are public; every mutation requires a Bearer JWT.
//! Trailers are addressed by their provider-assigned external id, not
//! the internal numeric id, as the frontend contract requires.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod routes;
pub mod serializer;
pub mod state;
