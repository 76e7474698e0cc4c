//! Repository traits for teacher storage.
//!
//! The storage surface is split by concern:
//! - [`TeacherRepository`]: record CRUD and search
//! - [`StatsRepository`]: aggregate queries
//!
//! [`FullRepository`] combines both and is what the service layer and the
//! HTTP state hold behind an `Arc<dyn FullRepository>`.

pub mod error;
pub mod stats;
pub mod teacher;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use stats::StatsRepository;
pub use teacher::TeacherRepository;

/// Every storage concern the application needs.
pub trait FullRepository: TeacherRepository + StatsRepository {}

impl<T> FullRepository for T where T: TeacherRepository + StatsRepository {}
