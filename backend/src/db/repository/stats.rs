//! Aggregate queries over the teacher table.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::TeacherStats;

/// Repository trait for directory-wide statistics.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Compute the dashboard counters.
    ///
    /// `departments` counts distinct department values across all records.
    async fn stats(&self) -> RepositoryResult<TeacherStats>;

    /// Distinct department names, sorted ascending.
    async fn departments(&self) -> RepositoryResult<Vec<String>>;
}
