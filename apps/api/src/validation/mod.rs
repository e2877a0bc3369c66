// Validation Rules: pure predicates shared by registration, the profile wizard and the job board.
// Nothing in here performs I/O or mutates state.

pub mod error_map;
pub mod rules;

pub use error_map::{entry_key, ValidationErrorMap};
pub use rules::{
    is_valid_email, is_valid_password, is_valid_phone, password_strength, StrengthLabel,
};
