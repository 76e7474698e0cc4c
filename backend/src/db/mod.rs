//! Database module for teacher record storage.
//!
//! This module provides abstractions for storage via the Repository pattern,
//! allowing the in-memory and Postgres backends to be swapped at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer (http::handlers)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Employee ID pre-check on create                      │
//! │  - Sample data seeding                                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! └───────────┬─────────────────────────────┬───────────────┘
//!             │                             │
//!     ┌───────▼────────┐           ┌────────▼────────┐
//!     │ LocalRepository│           │PostgresRepository│
//!     │  (in-memory)   │           │ (postgres-repo)  │
//!     └────────────────┘           └─────────────────┘
//! ```
//!
//! # Usage
//! ```ignore
//! use staff_directory::db::{services, RepositoryBuilder};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryBuilder::new().from_env()?.build().await?;
//!     let teachers = services::list_teachers(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use services::{
    create_teacher, delete_teacher, get_stats, get_teacher, health_check, list_departments,
    list_teachers, sample_teachers, search_teachers, seed_sample_data, update_teacher,
};

pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, RepositoryError, RepositoryResult, StatsRepository,
    TeacherRepository,
};
