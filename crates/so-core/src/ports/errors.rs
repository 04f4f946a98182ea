use thiserror::Error;

/// Message shown when the cause of a failure must not reach the user.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Failures reported by the authentication + data-store provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider processed the call and refused it. The message is shown as-is.
    #[error("{message}")]
    Rejected { message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode provider response: {0}")]
    Decode(String),

    #[error("unexpected provider failure: {0}")]
    Unexpected(String),
}

impl ProviderError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            message: message.into(),
        }
    }

    /// Text for the `submit` error slot: provider refusals verbatim, anything
    /// else replaced by the generic message.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Rejected { message } => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected { .. })
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_surface_verbatim_and_others_are_generic() {
        assert_eq!(
            ProviderError::rejected("Invalid login credentials").user_message(),
            "Invalid login credentials"
        );
        assert_eq!(
            ProviderError::Transport("connection reset".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }
}
