//! In-memory repository implementation.
//!
//! Backs the development server and the test suite. Every operation takes the
//! lock exactly once, so uniqueness checks and the write that follows are
//! atomic with respect to other requests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, StatsRepository, TeacherRepository,
};
use crate::models::{NewTeacher, Teacher, TeacherId, TeacherPatch, TeacherQuery, TeacherStats};

#[derive(Debug)]
struct LocalData {
    teachers: BTreeMap<TeacherId, Teacher>,
    /// Last id handed out. Never decremented, so deleted ids are not reused.
    last_id: i64,
}

impl LocalData {
    fn new() -> Self {
        Self {
            teachers: BTreeMap::new(),
            last_id: 0,
        }
    }

    /// Uniqueness check for a write. `exclude` skips the record being updated.
    fn check_unique(
        &self,
        employee_id: Option<&str>,
        email: Option<&str>,
        exclude: Option<TeacherId>,
    ) -> RepositoryResult<()> {
        let others = self
            .teachers
            .values()
            .filter(|t| Some(t.id) != exclude);

        for other in others {
            if employee_id == Some(other.employee_id.as_str()) {
                return Err(RepositoryError::conflict_with_context(
                    "Employee ID already exists",
                    ErrorContext::default()
                        .with_entity("teacher")
                        .with_entity_id(other.id),
                ));
            }
            if email == Some(other.email.as_str()) {
                return Err(RepositoryError::conflict_with_context(
                    "Email already exists",
                    ErrorContext::default()
                        .with_entity("teacher")
                        .with_entity_id(other.id),
                ));
            }
        }
        Ok(())
    }
}

/// In-memory repository keyed by teacher id.
#[derive(Debug)]
pub struct LocalRepository {
    data: RwLock<LocalData>,
    healthy: AtomicBool,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(LocalData::new()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Simulate an unavailable backend. While unhealthy every operation fails
    /// with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Drop every record. The id counter keeps its value.
    pub fn clear(&self) {
        self.data.write().teachers.clear();
    }

    pub fn teacher_count(&self) -> usize {
        self.data.read().teachers.len()
    }

    fn ensure_available(&self, operation: &str) -> RepositoryResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is marked unhealthy",
                ErrorContext::new(operation).with_entity("teacher"),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TeacherRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn create(&self, teacher: NewTeacher) -> RepositoryResult<Teacher> {
        self.ensure_available("create")?;

        let mut data = self.data.write();
        data.check_unique(Some(&teacher.employee_id), Some(&teacher.email), None)
            .map_err(|e| e.with_operation("create"))?;

        data.last_id += 1;
        let id = TeacherId::new(data.last_id);
        let stored = Teacher::from_new(id, teacher);
        data.teachers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: TeacherId) -> RepositoryResult<Option<Teacher>> {
        self.ensure_available("get")?;
        Ok(self.data.read().teachers.get(&id).cloned())
    }

    async fn get_by_employee_id(&self, employee_id: &str) -> RepositoryResult<Option<Teacher>> {
        self.ensure_available("get_by_employee_id")?;
        Ok(self
            .data
            .read()
            .teachers
            .values()
            .find(|t| t.employee_id == employee_id)
            .cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<Teacher>> {
        self.ensure_available("list")?;
        Ok(self.data.read().teachers.values().cloned().collect())
    }

    async fn update(
        &self,
        id: TeacherId,
        patch: TeacherPatch,
    ) -> RepositoryResult<Option<Teacher>> {
        self.ensure_available("update")?;

        let mut data = self.data.write();
        if !data.teachers.contains_key(&id) {
            return Ok(None);
        }

        data.check_unique(patch.employee_id.as_deref(), patch.email.as_deref(), Some(id))
            .map_err(|e| e.with_operation("update"))?;

        let Some(existing) = data.teachers.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(existing);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: TeacherId) -> RepositoryResult<bool> {
        self.ensure_available("delete")?;
        Ok(self.data.write().teachers.remove(&id).is_some())
    }

    async fn search(&self, query: &TeacherQuery) -> RepositoryResult<Vec<Teacher>> {
        self.ensure_available("search")?;
        Ok(self
            .data
            .read()
            .teachers
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatsRepository for LocalRepository {
    async fn stats(&self) -> RepositoryResult<TeacherStats> {
        self.ensure_available("stats")?;
        Ok(TeacherStats::from_teachers(self.data.read().teachers.values()))
    }

    async fn departments(&self) -> RepositoryResult<Vec<String>> {
        self.ensure_available("departments")?;
        let departments: BTreeSet<String> = self
            .data
            .read()
            .teachers
            .values()
            .map(|t| t.department.clone())
            .collect();
        Ok(departments.into_iter().collect())
    }
}
