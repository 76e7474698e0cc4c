//! Data Transfer Objects for the HTTP API.
//!
//! Teacher records, stats and search parameters are serialized straight from
//! [`crate::models`]; only the envelope types live here.

use serde::{Deserialize, Serialize};

pub use crate::models::{Teacher, TeacherQuery, TeacherStats};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Storage backend status
    pub database: String,
}

/// Plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
