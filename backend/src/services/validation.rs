//! Teacher payload validation.
//!
//! Turns an untyped JSON payload into a typed [`NewTeacher`] or
//! [`TeacherPatch`] in two steps. A shape check reports missing keys and
//! wrong JSON types, then the well-typed fields are deserialized into
//! [`TeacherInput`] and checked against its `#[validate]` rules. Every
//! offending field is reported in a single pass, one [`FieldError`] per
//! field, so clients can highlight all problems at once. Unknown keys are
//! ignored.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use staff_directory::services::validation::validate_new_teacher;
//!
//! let result = validate_new_teacher(&json!({ "email": "not-an-email" }));
//! let errors = result.unwrap_err();
//! assert!(errors.has_field("email"));
//! assert!(errors.has_field("firstName"));
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::{NewTeacher, TeacherId, TeacherPatch, TeacherStatus};

/// A single invalid field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if any error names `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Message recorded for `field`, if any.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Take the first failed rule of each field from a `validator` report.
    fn absorb(&mut self, report: &validator::ValidationErrors) {
        for (field, failures) in report.field_errors() {
            let field = camel_case(&field);
            if self.has_field(&field) {
                continue;
            }
            if let Some(failure) = failures.first() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                self.add(field, message);
            }
        }
    }

    /// Order errors the way the fields are declared.
    fn sorted(mut self) -> Self {
        self.errors.sort_by_key(|e| field_rank(&e.field));
        self
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "Validation failed [{}]", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Returns true for `local@domain` addresses whose domain contains a dot.
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email() && dotted_domain(email).is_ok()
}

/// Well-typed teacher fields, all optional so that create and update share
/// one rule set. Requiredness is enforced by the shape check.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct TeacherInput {
    id: Option<i64>,
    #[validate(length(min = 1, message = "Employee ID is required"))]
    employee_id: Option<String>,
    #[validate(length(min = 1, message = "First name is required"))]
    first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    last_name: Option<String>,
    #[validate(
        email(message = "Invalid email address"),
        custom(function = "dotted_domain")
    )]
    email: Option<String>,
    #[validate(length(min = 1, message = "Phone number is required"))]
    phone: Option<String>,
    #[validate(length(min = 1, message = "Department is required"))]
    department: Option<String>,
    #[validate(length(min = 1, message = "At least one subject is required"))]
    subjects: Option<Vec<String>>,
    #[validate(range(min = 0, message = "Experience must be 0 or greater"))]
    experience: Option<i64>,
    #[validate(length(min = 1, message = "Hire date is required"))]
    hire_date: Option<String>,
    #[validate(custom(function = "known_status"))]
    status: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    avatar: Option<Option<String>>,
}

fn dotted_domain(email: &str) -> Result<(), ValidationError> {
    match email.rsplit_once('@') {
        Some((_, domain)) if domain.contains('.') => Ok(()),
        _ => Err(ValidationError::new("email")
            .with_message(Cow::Borrowed("Invalid email address"))),
    }
}

fn known_status(status: &str) -> Result<(), ValidationError> {
    status.parse::<TeacherStatus>().map(|_| ()).map_err(|_| {
        ValidationError::new("enum").with_message(Cow::Owned(format!(
            "Invalid enum value. Expected 'active' | 'on_leave' | 'inactive', received '{}'",
            status
        )))
    })
}

/// Absent stays `None`; an explicit `null` becomes `Some(None)`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl TeacherInput {
    /// Shape check, deserialization and rule check in one pass.
    fn read(payload: &Value, mode: Mode) -> Result<(Self, ValidationErrors), ValidationErrors> {
        let map = as_object(payload)?;
        let mut errors = ValidationErrors::new();
        let typed = check_shape(map, mode, &mut errors);

        let input: TeacherInput = serde_json::from_value(Value::Object(typed)).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add("body", e.to_string());
            errors
        })?;
        if let Err(report) = input.validate() {
            errors.absorb(&report);
        }
        Ok((input, errors))
    }

    /// Narrow `experience` to the stored width, recording overflow.
    fn experience(&self, errors: &mut ValidationErrors) -> Option<i32> {
        let years = self.experience?;
        match i32::try_from(years) {
            Ok(years) => Some(years),
            Err(_) => {
                if !errors.has_field("experience") {
                    errors.add(
                        "experience",
                        format!("Number must be less than or equal to {}", i32::MAX),
                    );
                }
                None
            }
        }
    }

    fn status(&self) -> Option<TeacherStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Validate a create payload. `status` is left as `None` when omitted.
pub fn validate_new_teacher(payload: &Value) -> Result<NewTeacher, ValidationErrors> {
    let (input, mut errors) = TeacherInput::read(payload, Mode::Create)?;
    let experience = input.experience(&mut errors);
    if !errors.is_empty() {
        return Err(errors.sorted());
    }

    let status = input.status();
    match (
        input.employee_id,
        input.first_name,
        input.last_name,
        input.email,
        input.phone,
        input.department,
        input.subjects,
        experience,
        input.hire_date,
    ) {
        (
            Some(employee_id),
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(department),
            Some(subjects),
            Some(experience),
            Some(hire_date),
        ) => Ok(NewTeacher {
            employee_id,
            first_name,
            last_name,
            email,
            phone,
            department,
            subjects,
            experience,
            hire_date,
            status,
            avatar: input.avatar.flatten(),
        }),
        _ => Err(errors),
    }
}

/// Validate a partial update payload. Only `id` is required.
pub fn validate_teacher_patch(payload: &Value) -> Result<TeacherPatch, ValidationErrors> {
    let (input, mut errors) = TeacherInput::read(payload, Mode::Update)?;
    let experience = input.experience(&mut errors);
    let Some(id) = input.id.filter(|_| errors.is_empty()) else {
        return Err(errors.sorted());
    };

    let status = input.status();
    Ok(TeacherPatch {
        id: TeacherId(id),
        employee_id: input.employee_id,
        first_name: input.first_name,
        last_name: input.last_name,
        email: input.email,
        phone: input.phone,
        department: input.department,
        subjects: input.subjects,
        experience,
        hire_date: input.hire_date,
        status,
        avatar: input.avatar,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Missing required keys are errors.
    Create,
    /// Missing keys mean "leave unchanged".
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    TextList,
    Integer,
    NullableText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Required {
    OnCreate,
    OnUpdate,
    Never,
}

const FIELDS: &[(&str, Kind, Required)] = &[
    ("id", Kind::Integer, Required::OnUpdate),
    ("employeeId", Kind::Text, Required::OnCreate),
    ("firstName", Kind::Text, Required::OnCreate),
    ("lastName", Kind::Text, Required::OnCreate),
    ("email", Kind::Text, Required::OnCreate),
    ("phone", Kind::Text, Required::OnCreate),
    ("department", Kind::Text, Required::OnCreate),
    ("subjects", Kind::TextList, Required::OnCreate),
    ("experience", Kind::Integer, Required::OnCreate),
    ("hireDate", Kind::Text, Required::OnCreate),
    ("status", Kind::Text, Required::Never),
    ("avatar", Kind::NullableText, Required::Never),
];

impl Required {
    fn applies(self, mode: Mode) -> bool {
        matches!(
            (self, mode),
            (Required::OnCreate, Mode::Create) | (Required::OnUpdate, Mode::Update)
        )
    }
}

/// Copy the known, well-typed fields of `map`, recording every missing or
/// mistyped one. Integral floats are normalized to integers.
fn check_shape(
    map: &Map<String, Value>,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Map<String, Value> {
    let mut typed = Map::new();
    for &(key, kind, required) in FIELDS {
        // Create payloads never carry an id.
        if key == "id" && mode == Mode::Create {
            continue;
        }
        let Some(value) = map.get(key) else {
            if required.applies(mode) {
                errors.add(key, "Required");
            }
            continue;
        };

        let checked = match (kind, value) {
            (Kind::Text, Value::String(_)) => Ok(value.clone()),
            (Kind::Text, other) => Err(expected("string", other)),
            (Kind::NullableText, Value::String(_) | Value::Null) => Ok(value.clone()),
            (Kind::NullableText, other) => Err(expected("string", other)),
            (Kind::Integer, Value::Number(n)) => integral(n)
                .map(Value::from)
                .ok_or_else(|| "Expected integer, received float".to_string()),
            (Kind::Integer, other) => Err(expected("number", other)),
            (Kind::TextList, Value::Array(items)) => {
                let mut valid = true;
                for (index, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        valid = false;
                        errors.add(format!("{}[{}]", key, index), expected("string", item));
                    }
                }
                if !valid {
                    continue;
                }
                Ok(value.clone())
            }
            (Kind::TextList, other) => Err(expected("array", other)),
        };

        match checked {
            Ok(value) => {
                typed.insert(key.to_string(), value);
            }
            Err(message) => errors.add(key, message),
        }
    }
    typed
}

/// Whole-number value of `n`, accepting floats with no fractional part.
fn integral(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(
            "body",
            format!("Expected object, received {}", json_type_name(payload)),
        );
        errors
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(kind: &str, value: &Value) -> String {
    format!("Expected {}, received {}", kind, json_type_name(value))
}

/// `hire_date` → `hireDate`; names without underscores pass through.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn field_rank(field: &str) -> usize {
    let base = field.split('[').next().unwrap_or(field);
    FIELDS
        .iter()
        .position(|(key, _, _)| *key == base)
        .unwrap_or(FIELDS.len())
}
