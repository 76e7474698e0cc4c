//! # Staff Directory Backend
//!
//! Teacher records for a school staff directory, served as a JSON REST API.
//!
//! ## Architecture
//!
//! - [`models`]: The teacher record, create/update payload types, stats and
//!   search query
//! - [`services`]: Payload validation
//! - [`db`]: Repository traits, in-memory and Postgres backends, service layer
//! - [`http`]: Axum router and handlers (feature `http-server`)

// Allow large error types - RepositoryError carries structured context
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
