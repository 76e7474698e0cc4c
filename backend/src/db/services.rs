//! Repository-agnostic service functions.
//!
//! These are what the HTTP handlers call. They accept any
//! [`FullRepository`], including `dyn FullRepository` behind an `Arc`.

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    NewTeacher, Teacher, TeacherId, TeacherPatch, TeacherQuery, TeacherStats, TeacherStatus,
};

/// Check if the storage backend is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// All teachers, ascending id order.
pub async fn list_teachers<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Teacher>> {
    repo.list().await
}

pub async fn search_teachers<R: FullRepository + ?Sized>(
    repo: &R,
    query: &TeacherQuery,
) -> RepositoryResult<Vec<Teacher>> {
    repo.search(query).await
}

pub async fn get_teacher<R: FullRepository + ?Sized>(
    repo: &R,
    id: TeacherId,
) -> RepositoryResult<Option<Teacher>> {
    repo.get(id).await
}

/// Create a teacher after checking that the employee ID is free.
///
/// The repository enforces uniqueness again at write time, so two racing
/// creates still cannot both succeed.
pub async fn create_teacher<R: FullRepository + ?Sized>(
    repo: &R,
    teacher: NewTeacher,
) -> RepositoryResult<Teacher> {
    if let Some(existing) = repo.get_by_employee_id(&teacher.employee_id).await? {
        log::debug!(
            "Rejecting create: employee ID {} belongs to teacher {}",
            teacher.employee_id,
            existing.id
        );
        return Err(RepositoryError::conflict_with_context(
            "Employee ID already exists",
            ErrorContext::new("create_teacher")
                .with_entity("teacher")
                .with_entity_id(existing.id),
        ));
    }

    let created = repo.create(teacher).await?;
    log::info!(
        "Created teacher {} ({}, {})",
        created.id,
        created.employee_id,
        created.full_name()
    );
    Ok(created)
}

/// Apply a patch to the record named by `patch.id`.
///
/// Returns `Ok(None)` when no such record exists.
pub async fn update_teacher<R: FullRepository + ?Sized>(
    repo: &R,
    patch: TeacherPatch,
) -> RepositoryResult<Option<Teacher>> {
    let id = patch.id;
    let updated = repo.update(id, patch).await?;
    if updated.is_some() {
        log::info!("Updated teacher {}", id);
    }
    Ok(updated)
}

pub async fn delete_teacher<R: FullRepository + ?Sized>(
    repo: &R,
    id: TeacherId,
) -> RepositoryResult<bool> {
    let deleted = repo.delete(id).await?;
    if deleted {
        log::info!("Deleted teacher {}", id);
    }
    Ok(deleted)
}

pub async fn get_stats<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<TeacherStats> {
    repo.stats().await
}

pub async fn list_departments<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<String>> {
    repo.departments().await
}

/// The three demo records the directory ships with.
pub fn sample_teachers() -> Vec<NewTeacher> {
    #[allow(clippy::too_many_arguments)]
    fn sample(
        employee_id: &str,
        (first_name, last_name): (&str, &str),
        email: &str,
        phone: &str,
        department: &str,
        subjects: [&str; 2],
        experience: i32,
        hire_date: &str,
        status: TeacherStatus,
    ) -> NewTeacher {
        NewTeacher {
            employee_id: employee_id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            department: department.to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            experience,
            hire_date: hire_date.to_string(),
            status: Some(status),
            avatar: None,
        }
    }

    vec![
        sample(
            "TCH001",
            ("Sarah", "Johnson"),
            "sarah.j@school.edu",
            "+1 (555) 123-4567",
            "Mathematics",
            ["Algebra", "Calculus"],
            8,
            "2016-08-15",
            TeacherStatus::Active,
        ),
        sample(
            "TCH002",
            ("Michael", "Chen"),
            "m.chen@school.edu",
            "+1 (555) 234-5678",
            "Science",
            ["Physics", "Chemistry"],
            5,
            "2019-01-10",
            TeacherStatus::OnLeave,
        ),
        sample(
            "TCH003",
            ("David", "Wilson"),
            "d.wilson@school.edu",
            "+1 (555) 345-6789",
            "English",
            ["Literature", "Writing"],
            15,
            "2009-09-01",
            TeacherStatus::Active,
        ),
    ]
}

/// Insert [`sample_teachers`] if the repository is empty.
///
/// Returns the number of records inserted (0 when data already exists).
pub async fn seed_sample_data<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<usize> {
    let existing = repo.stats().await?.total_teachers;
    if existing > 0 {
        log::info!(
            "Skipping sample data: repository already holds {} teacher(s)",
            existing
        );
        return Ok(0);
    }

    let mut inserted = 0;
    for teacher in sample_teachers() {
        repo.create(teacher).await?;
        inserted += 1;
    }
    log::info!("Seeded {} sample teacher(s)", inserted);
    Ok(inserted)
}
