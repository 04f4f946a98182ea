//! Session bridge: reflects the provider's session into a [`SessionUser`].
//!
//! [`SessionUser`]: so_core::SessionUser

mod bridge;
mod subscription;

pub use bridge::SessionBridge;
pub use subscription::SessionSubscription;
