//! Domain services that sit in front of the repository layer.
//!
//! Currently this is the payload validator used by the HTTP handlers before
//! any write reaches storage.

pub mod validation;

pub use validation::{
    is_valid_email, validate_new_teacher, validate_teacher_patch, FieldError, ValidationErrors,
};
