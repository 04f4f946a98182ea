//! Session change handler port
//!
//! The session bridge calls this whenever the provider reports an auth state
//! change, after merging the user with its profile row.

use crate::session::SessionUser;

#[async_trait::async_trait]
pub trait SessionChangeHandler: Send + Sync {
    /// `None` means the session ended.
    async fn on_session_changed(&self, user: Option<SessionUser>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_change_handler_is_object_safe() {
        fn assert_object_safe(_handler: &dyn SessionChangeHandler) {}
        let _ = assert_object_safe;
    }
}
