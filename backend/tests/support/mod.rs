//! Shared helpers for the integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use staff_directory::db::repository::FullRepository;
use staff_directory::db::LocalRepository;
use staff_directory::models::{NewTeacher, TeacherStatus};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Access is serialized because the process environment is global and the
/// test harness runs tests in parallel. Previous values are restored on drop,
/// including during unwinding.
///
/// `Some(v)` sets a variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = EnvRestore::apply(changes);
    f()
}

struct EnvRestore {
    previous: Vec<(String, Option<String>)>,
}

impl EnvRestore {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut previous = Vec::with_capacity(changes.len());
        for (key, value) in changes {
            if !previous.iter().any(|(k, _): &(String, Option<String>)| k == key) {
                previous.push((key.to_string(), std::env::var(key).ok()));
            }
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        Self { previous }
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// A valid create payload as the dashboard would send it.
pub fn teacher_json(employee_id: &str, email: &str) -> Value {
    json!({
        "employeeId": employee_id,
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": email,
        "phone": "+1 (555) 987-6543",
        "department": "Computing",
        "subjects": ["Programming", "Compilers"],
        "experience": 12,
        "hireDate": "2012-09-01"
    })
}

/// A typed create payload.
pub fn new_teacher(
    employee_id: &str,
    email: &str,
    department: &str,
    status: TeacherStatus,
) -> NewTeacher {
    NewTeacher {
        employee_id: employee_id.to_string(),
        first_name: "Alan".to_string(),
        last_name: "Turing".to_string(),
        email: email.to_string(),
        phone: "+44 20 7946 0000".to_string(),
        department: department.to_string(),
        subjects: vec!["Logic".to_string(), "Cryptography".to_string()],
        experience: 4,
        hire_date: "2021-01-04".to_string(),
        status: Some(status),
        avatar: None,
    }
}

/// An empty in-memory repository.
pub fn local_repo() -> Arc<LocalRepository> {
    Arc::new(LocalRepository::new())
}

/// An in-memory repository holding the three sample teachers.
pub async fn seeded_repo() -> Arc<dyn FullRepository> {
    let repo = local_repo();
    staff_directory::db::seed_sample_data(repo.as_ref())
        .await
        .expect("seeding the local repository succeeds");
    repo
}
