//! Domain services: orchestrate provider calls and map provider
//! representations onto this API's input and output shapes.

pub mod auth;
pub mod roles;
pub mod users;

use crate::error::FieldError;
use crate::{Error, Result};

pub use auth::{AuthService, LoginRequest, RefreshRequest, TokenInfo, TokenOut};
pub use roles::{RoleCreate, RoleOut, RolePatch, RoleService, RoleUpdate};
pub use users::{PasswordUpdate, UserCreate, UserOut, UserService, UserUpdate};

/// Schema validation for request bodies.
pub trait Validate {
    /// Every field error in the value; empty when valid.
    fn field_errors(&self) -> Vec<FieldError>;

    /// Fail with [`Error::Validation`] listing every field error.
    fn validate(&self) -> Result<()> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

pub(crate) fn min_length(field: &str, value: &str, min: usize, errors: &mut Vec<FieldError>) {
    if value.chars().count() < min {
        errors.push(FieldError::body(
            field,
            "string_too_short",
            format!("String should have at least {min} character{}", if min == 1 { "" } else { "s" }),
        ));
    }
}
