//! Field-level validation rules.
//!
//! Pure functions: no network, no side effects. The same form and scope always
//! yield the same [`ErrorState`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ErrorState, FieldName, FormState};
use crate::marketplace::MarketView;
use crate::view::ViewState;

/// Minimum password length enforced on registration.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Which rule set applies to the active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationScope {
    /// Credentials only.
    SignIn,
    /// Credentials with the password length rule plus name fields.
    Registration,
    /// Name fields only; the profile editor carries no credentials.
    Profile,
    /// Marketplace video request form.
    VideoRequest,
    /// Screens without a submittable form.
    Unchecked,
}

impl ValidationScope {
    pub fn for_view(view: &ViewState) -> Self {
        match view {
            ViewState::Login => ValidationScope::SignIn,
            ViewState::Signup => ValidationScope::Registration,
            ViewState::CreateProfile | ViewState::UpdateProfile => ValidationScope::Profile,
            ViewState::Dashboard => ValidationScope::Unchecked,
        }
    }

    pub fn for_market_view(view: &MarketView) -> Self {
        match view {
            MarketView::Login { .. } => ValidationScope::SignIn,
            MarketView::Signup { .. } => ValidationScope::Registration,
            MarketView::RequestForm { .. } => ValidationScope::VideoRequest,
            _ => ValidationScope::Unchecked,
        }
    }

    fn checks_credentials(&self) -> bool {
        matches!(self, ValidationScope::SignIn | ValidationScope::Registration)
    }

    fn checks_names(&self) -> bool {
        matches!(self, ValidationScope::Registration | ValidationScope::Profile)
    }
}

/// Applies the scope's rules and returns every violation; empty when valid.
pub fn validate(form: &FormState, scope: ValidationScope) -> ErrorState {
    let mut errors = ErrorState::new();

    if scope.checks_credentials() {
        if form.email.is_empty() {
            errors.insert(FieldName::Email, "Email is required");
        } else if !EMAIL_SHAPE.is_match(&form.email) {
            errors.insert(FieldName::Email, "Invalid email format");
        }

        if form.password.is_empty() {
            errors.insert(FieldName::Password, "Password is required");
        } else if scope == ValidationScope::Registration
            && form.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.insert(
                FieldName::Password,
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
    }

    if scope.checks_names() {
        if form.first_name.is_empty() {
            errors.insert(FieldName::FirstName, "First name is required");
        }
        if form.last_name.is_empty() {
            errors.insert(FieldName::LastName, "Last name is required");
        }
    }

    if scope == ValidationScope::VideoRequest {
        if form.recipient_name.trim().is_empty() {
            errors.insert(FieldName::RecipientName, "Recipient name is required");
        }
        if form.occasion.trim().is_empty() {
            errors.insert(FieldName::Occasion, "Occasion is required");
        }
        if form.message_details.trim().is_empty() {
            errors.insert(FieldName::MessageDetails, "Message details are required");
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(email: &str, password: &str) -> FormState {
        FormState {
            email: email.to_string(),
            password: password.to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn missing_email_is_required_error() {
        let errors = validate(&form_with("", "password1"), ValidationScope::SignIn);
        assert_eq!(errors.field(FieldName::Email), Some("Email is required"));
    }

    #[test]
    fn email_without_tld_is_format_error() {
        let errors = validate(&form_with("a@b", "password1"), ValidationScope::SignIn);
        assert_eq!(errors.field(FieldName::Email), Some("Invalid email format"));
    }

    #[test]
    fn well_formed_email_passes() {
        let errors = validate(&form_with("a@b.com", "x"), ValidationScope::SignIn);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn email_with_whitespace_is_rejected() {
        let errors = validate(&form_with("a b@c.com", "x"), ValidationScope::SignIn);
        assert_eq!(errors.field(FieldName::Email), Some("Invalid email format"));
    }

    #[test]
    fn sign_in_does_not_apply_length_rule() {
        let errors = validate(&form_with("a@b.com", "short"), ValidationScope::SignIn);
        assert_eq!(errors.field(FieldName::Password), None);
    }

    #[test]
    fn registration_password_length_boundary() {
        let mut form = form_with("a@b.com", "1234567");
        form.first_name = "Ada".into();
        form.last_name = "Lovelace".into();

        let errors = validate(&form, ValidationScope::Registration);
        assert_eq!(
            errors.field(FieldName::Password),
            Some("Password must be at least 8 characters")
        );

        form.password = "12345678".into();
        assert!(validate(&form, ValidationScope::Registration).is_empty());
    }

    #[test]
    fn registration_requires_names() {
        let errors = validate(&form_with("a@b.com", "12345678"), ValidationScope::Registration);
        assert_eq!(errors.field(FieldName::FirstName), Some("First name is required"));
        assert_eq!(errors.field(FieldName::LastName), Some("Last name is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn profile_scope_checks_names_only() {
        let errors = validate(&FormState::default(), ValidationScope::Profile);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.field(FieldName::Email), None);
    }

    #[test]
    fn video_request_scope_requires_request_fields() {
        let errors = validate(&FormState::default(), ValidationScope::VideoRequest);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.field(FieldName::MessageDetails),
            Some("Message details are required")
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let form = form_with("nope", "");
        let first = validate(&form, ValidationScope::Registration);
        let second = validate(&form, ValidationScope::Registration);
        assert_eq!(first, second);
    }

    #[test]
    fn scope_follows_view() {
        assert_eq!(ValidationScope::for_view(&ViewState::Login), ValidationScope::SignIn);
        assert_eq!(
            ValidationScope::for_view(&ViewState::Signup),
            ValidationScope::Registration
        );
        assert_eq!(
            ValidationScope::for_view(&ViewState::UpdateProfile),
            ValidationScope::Profile
        );
        assert_eq!(
            ValidationScope::for_view(&ViewState::Dashboard),
            ValidationScope::Unchecked
        );
    }

    #[test]
    fn market_scope_follows_view() {
        use crate::ids::CelebrityId;
        use crate::marketplace::Role;

        assert_eq!(
            ValidationScope::for_market_view(&MarketView::Signup { role: Role::Celebrity }),
            ValidationScope::Registration
        );
        assert_eq!(
            ValidationScope::for_market_view(&MarketView::RequestForm {
                celebrity_id: CelebrityId::from("1"),
            }),
            ValidationScope::VideoRequest
        );
        assert_eq!(
            ValidationScope::for_market_view(&MarketView::FanDashboard),
            ValidationScope::Unchecked
        );
    }
}
