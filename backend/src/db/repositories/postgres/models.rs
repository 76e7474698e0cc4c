use diesel::prelude::*;

use super::schema::teachers;
use crate::db::repository::{ErrorContext, RepositoryError};
use crate::models::{NewTeacher, Teacher, TeacherId, TeacherPatch, TeacherStatus};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teachers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeacherRow {
    pub id: i64,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub subjects: Vec<String>,
    pub experience: i32,
    pub hire_date: String,
    pub status: String,
    pub avatar: Option<String>,
}

impl TryFrom<TeacherRow> for Teacher {
    type Error = RepositoryError;

    fn try_from(row: TeacherRow) -> Result<Self, Self::Error> {
        let status: TeacherStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::internal_with_context(
                e,
                ErrorContext::new("decode_row")
                    .with_entity("teacher")
                    .with_entity_id(row.id),
            )
        })?;

        Ok(Teacher {
            id: TeacherId(row.id),
            employee_id: row.employee_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            department: row.department,
            subjects: row.subjects,
            experience: row.experience,
            hire_date: row.hire_date,
            status,
            avatar: row.avatar,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teachers)]
pub struct NewTeacherRow {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub subjects: Vec<String>,
    pub experience: i32,
    pub hire_date: String,
    pub status: String,
    pub avatar: Option<String>,
}

impl From<NewTeacher> for NewTeacherRow {
    fn from(new: NewTeacher) -> Self {
        Self {
            employee_id: new.employee_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            department: new.department,
            subjects: new.subjects,
            experience: new.experience,
            hire_date: new.hire_date,
            status: new.status.unwrap_or_default().as_str().to_string(),
            avatar: new.avatar,
        }
    }
}

/// Partial update. `None` fields are left out of the `SET` clause; for
/// `avatar`, `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = teachers)]
pub struct TeacherChangeset {
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub experience: Option<i32>,
    pub hire_date: Option<String>,
    pub status: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl From<TeacherPatch> for TeacherChangeset {
    fn from(patch: TeacherPatch) -> Self {
        Self {
            employee_id: patch.employee_id,
            first_name: patch.first_name,
            last_name: patch.last_name,
            email: patch.email,
            phone: patch.phone,
            department: patch.department,
            subjects: patch.subjects,
            experience: patch.experience,
            hire_date: patch.hire_date,
            status: patch.status.map(|s| s.as_str().to_string()),
            avatar: patch.avatar,
        }
    }
}
