//! Teacher repository trait for record storage operations.
//!
//! This trait defines the CRUD and search operations over teacher records.
//! Absence is reported through `Option`/`bool` rather than errors so the
//! HTTP layer can decide how to surface it.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{NewTeacher, Teacher, TeacherId, TeacherPatch, TeacherQuery};

/// Repository trait for teacher records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TeacherRepository: Send + Sync {
    /// Check if the storage backend is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a new teacher and return the stored record.
    ///
    /// The repository assigns the id. Ids increase monotonically and are
    /// never reused, even after a delete.
    ///
    /// # Returns
    /// * `Ok(Teacher)` - The stored record, with `status` defaulted to active
    /// * `Err(RepositoryError::Conflict)` - If the employee ID or email is taken
    async fn create(&self, teacher: NewTeacher) -> RepositoryResult<Teacher>;

    /// Fetch a teacher by id.
    async fn get(&self, id: TeacherId) -> RepositoryResult<Option<Teacher>>;

    /// Fetch a teacher by employee ID (exact, case-sensitive match).
    async fn get_by_employee_id(&self, employee_id: &str) -> RepositoryResult<Option<Teacher>>;

    /// List every teacher in ascending id order.
    async fn list(&self) -> RepositoryResult<Vec<Teacher>>;

    /// Merge the fields present in `patch` over the stored record.
    ///
    /// # Returns
    /// * `Ok(Some(Teacher))` - The merged record
    /// * `Ok(None)` - If no record has this id
    /// * `Err(RepositoryError::Conflict)` - If the new employee ID or email
    ///   belongs to a different record
    async fn update(&self, id: TeacherId, patch: TeacherPatch)
        -> RepositoryResult<Option<Teacher>>;

    /// Remove a teacher. Returns `false` if no record had this id.
    async fn delete(&self, id: TeacherId) -> RepositoryResult<bool>;

    /// Filter teachers by free text, department and status.
    ///
    /// See [`TeacherQuery::matches`] for the exact predicate.
    async fn search(&self, query: &TeacherQuery) -> RepositoryResult<Vec<Teacher>>;
}
