//! Session domain module.
//!
//! Provider-owned user records, the 1:1 profile extension and the merged
//! [`SessionUser`] the flows render from.

mod profile;
mod user;

pub use profile::Profile;
pub use user::{AuthUser, Credentials, Session, SessionUser, SignUpRequest, UserMetadata};
