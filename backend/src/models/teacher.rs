//! Teacher record types.
//!
//! [`Teacher`] is the stored entity. [`NewTeacher`] and [`TeacherPatch`] are
//! the typed outputs of the validator for create and update requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Teacher identifier (database primary key).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TeacherId(pub i64);

impl TeacherId {
    pub fn new(value: i64) -> Self {
        TeacherId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employment status of a teacher.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherStatus {
    #[default]
    Active,
    OnLeave,
    Inactive,
}

impl TeacherStatus {
    pub const ALL: [TeacherStatus; 3] = [Self::Active, Self::OnLeave, Self::Inactive];

    /// Wire and column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnLeave => "on_leave",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeacherStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "on_leave" => Ok(Self::OnLeave),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("Unknown teacher status: {}", other)),
        }
    }
}

/// A stored teacher record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub subjects: Vec<String>,
    pub experience: i32,
    pub hire_date: String,
    pub status: TeacherStatus,
    pub avatar: Option<String>,
}

impl Teacher {
    /// Build a stored record from a validated create payload.
    ///
    /// The status defaults to [`TeacherStatus::Active`] when the payload
    /// omitted it.
    pub fn from_new(id: TeacherId, new: NewTeacher) -> Self {
        Self {
            id,
            employee_id: new.employee_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            department: new.department,
            subjects: new.subjects,
            experience: new.experience,
            hire_date: new.hire_date,
            status: new.status.unwrap_or_default(),
            avatar: new.avatar,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated create payload.
///
/// `status` stays `None` when the client omitted it; the repository applies
/// the default at insertion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeacher {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub subjects: Vec<String>,
    pub experience: i32,
    pub hire_date: String,
    #[serde(default)]
    pub status: Option<TeacherStatus>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Validated partial update.
///
/// Every `Some` field overwrites the stored value; `None` leaves it alone.
/// `avatar` has three states: `None` (untouched), `Some(None)` (cleared) and
/// `Some(Some(_))` (replaced).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeacherPatch {
    pub id: TeacherId,
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub experience: Option<i32>,
    pub hire_date: Option<String>,
    pub status: Option<TeacherStatus>,
    pub avatar: Option<Option<String>>,
}

impl TeacherPatch {
    /// An update carrying no field changes.
    pub fn empty(id: TeacherId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// True when applying this patch would not change any field.
    pub fn is_empty(&self) -> bool {
        self.employee_id.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.subjects.is_none()
            && self.experience.is_none()
            && self.hire_date.is_none()
            && self.status.is_none()
            && self.avatar.is_none()
    }

    /// Merge the present fields over `teacher`. The record id is never touched.
    pub fn apply_to(&self, teacher: &mut Teacher) {
        if let Some(ref v) = self.employee_id {
            teacher.employee_id = v.clone();
        }
        if let Some(ref v) = self.first_name {
            teacher.first_name = v.clone();
        }
        if let Some(ref v) = self.last_name {
            teacher.last_name = v.clone();
        }
        if let Some(ref v) = self.email {
            teacher.email = v.clone();
        }
        if let Some(ref v) = self.phone {
            teacher.phone = v.clone();
        }
        if let Some(ref v) = self.department {
            teacher.department = v.clone();
        }
        if let Some(ref v) = self.subjects {
            teacher.subjects = v.clone();
        }
        if let Some(v) = self.experience {
            teacher.experience = v;
        }
        if let Some(ref v) = self.hire_date {
            teacher.hire_date = v.clone();
        }
        if let Some(v) = self.status {
            teacher.status = v;
        }
        if let Some(ref v) = self.avatar {
            teacher.avatar = v.clone();
        }
    }
}

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStats {
    pub total_teachers: usize,
    pub active_teachers: usize,
    pub on_leave: usize,
    /// Distinct department values across all records.
    pub departments: usize,
}

impl TeacherStats {
    /// Compute stats over an in-memory slice of records.
    pub fn from_teachers<'a, I>(teachers: I) -> Self
    where
        I: IntoIterator<Item = &'a Teacher>,
    {
        let mut stats = TeacherStats::default();
        let mut departments = std::collections::HashSet::new();
        for teacher in teachers {
            stats.total_teachers += 1;
            match teacher.status {
                TeacherStatus::Active => stats.active_teachers += 1,
                TeacherStatus::OnLeave => stats.on_leave += 1,
                TeacherStatus::Inactive => {}
            }
            departments.insert(teacher.department.as_str());
        }
        stats.departments = departments.len();
        stats
    }
}

/// Search text plus optional exact-match filters.
///
/// `department` and `status` accept the sentinel `"all"`, which disables the
/// filter just like leaving it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

const ALL_SENTINEL: &str = "all";

fn active_filter(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != ALL_SENTINEL)
}

impl TeacherQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Lowercased search text, or `None` when the text match is skipped.
    pub fn search_text(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Department filter value, if one is active. Empty and `"all"` mean
    /// no filter.
    pub fn department_filter(&self) -> Option<&str> {
        active_filter(self.department.as_deref())
    }

    /// Status filter value, if one is active.
    pub fn status_filter(&self) -> Option<&str> {
        active_filter(self.status.as_deref())
    }

    /// Case-insensitive substring match over names, email, employee ID and
    /// subjects. Always true when no search text is set.
    pub fn matches_text(&self, teacher: &Teacher) -> bool {
        let Some(needle) = self.search_text() else {
            return true;
        };
        let contains = |field: &str| field.to_lowercase().contains(&needle);

        contains(&teacher.first_name)
            || contains(&teacher.last_name)
            || contains(&teacher.email)
            || contains(&teacher.employee_id)
            || teacher.subjects.iter().any(|s| contains(s))
    }

    /// Full predicate: text match AND department filter AND status filter.
    pub fn matches(&self, teacher: &Teacher) -> bool {
        if !self.matches_text(teacher) {
            return false;
        }
        if let Some(department) = self.department_filter() {
            if teacher.department != department {
                return false;
            }
        }
        if let Some(status) = self.status_filter() {
            if teacher.status.as_str() != status {
                return false;
            }
        }
        true
    }
}
