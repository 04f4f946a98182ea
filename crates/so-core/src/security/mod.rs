//! Sensitive value wrappers.

mod secret;

pub use secret::SecretString;
