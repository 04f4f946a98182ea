//! Form state domain module.
//!
//! Field values, per-field validation errors and the pure validation rules
//! shared by the auth and marketplace flows.

mod errors;
mod field;
mod state;
mod validation;

pub use errors::{ErrorKey, ErrorState};
pub use field::{FieldName, FieldValue, FormError};
pub use state::FormState;
pub use validation::{validate, ValidationScope, MIN_PASSWORD_LEN};
