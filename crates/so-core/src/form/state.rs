use std::fmt;

use serde::{Serialize, Serializer};

use super::field::{FieldName, FieldValue, FormError};
use crate::session::Profile;

/// All inputs of the active screen.
///
/// Every field always holds a value; the defaults are the empty string and `false`.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    pub email: String,
    #[serde(serialize_with = "mask")]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub phone: String,
    pub date_of_birth: String,
    pub country: String,
    pub city: String,
    pub bio: String,
    pub is_celebrity: bool,
    pub recipient_name: String,
    pub occasion: String,
    pub message_details: String,
    pub personal_message: String,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts one field.
    pub fn set_field(&mut self, name: FieldName, value: FieldValue) -> Result<(), FormError> {
        match (name, value) {
            (FieldName::IsCelebrity, FieldValue::Flag(flag)) => {
                self.is_celebrity = flag;
                Ok(())
            }
            (_, FieldValue::Flag(_)) => Err(FormError::TypeMismatch { field: name }),
            (name, FieldValue::Text(text)) => match self.text_slot(name) {
                Some(slot) => {
                    *slot = text;
                    Ok(())
                }
                None => Err(FormError::TypeMismatch { field: name }),
            },
        }
    }

    pub fn get(&self, name: FieldName) -> FieldValue {
        match name {
            FieldName::IsCelebrity => FieldValue::Flag(self.is_celebrity),
            other => FieldValue::Text(self.text(other).to_string()),
        }
    }

    /// Text content of a field; flag fields read as an empty string.
    pub fn text(&self, name: FieldName) -> &str {
        match name {
            FieldName::Email => &self.email,
            FieldName::Password => &self.password,
            FieldName::FirstName => &self.first_name,
            FieldName::LastName => &self.last_name,
            FieldName::Username => &self.username,
            FieldName::Phone => &self.phone,
            FieldName::DateOfBirth => &self.date_of_birth,
            FieldName::Country => &self.country,
            FieldName::City => &self.city,
            FieldName::Bio => &self.bio,
            FieldName::IsCelebrity => "",
            FieldName::RecipientName => &self.recipient_name,
            FieldName::Occasion => &self.occasion,
            FieldName::MessageDetails => &self.message_details,
            FieldName::PersonalMessage => &self.personal_message,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Loads the editable profile attributes, leaving credentials untouched.
    pub fn prefill_from_profile(&mut self, profile: &Profile) {
        self.first_name = profile.first_name.clone();
        self.last_name = profile.last_name.clone();
        self.username = profile.username.clone();
        self.phone = profile.phone.clone();
        self.date_of_birth = profile.date_of_birth.clone();
        self.country = profile.country.clone();
        self.city = profile.city.clone();
        self.bio = profile.bio.clone();
    }

    fn text_slot(&mut self, name: FieldName) -> Option<&mut String> {
        let slot = match name {
            FieldName::Email => &mut self.email,
            FieldName::Password => &mut self.password,
            FieldName::FirstName => &mut self.first_name,
            FieldName::LastName => &mut self.last_name,
            FieldName::Username => &mut self.username,
            FieldName::Phone => &mut self.phone,
            FieldName::DateOfBirth => &mut self.date_of_birth,
            FieldName::Country => &mut self.country,
            FieldName::City => &mut self.city,
            FieldName::Bio => &mut self.bio,
            FieldName::RecipientName => &mut self.recipient_name,
            FieldName::Occasion => &mut self.occasion,
            FieldName::MessageDetails => &mut self.message_details,
            FieldName::PersonalMessage => &mut self.personal_message,
            FieldName::IsCelebrity => return None,
        };
        Some(slot)
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("is_celebrity", &self.is_celebrity)
            .finish_non_exhaustive()
    }
}

fn mask<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&"*".repeat(value.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_form_has_every_field_empty() {
        let form = FormState::new();
        for field in FieldName::ALL {
            match form.get(field) {
                FieldValue::Text(text) => assert!(text.is_empty(), "{field} not empty"),
                FieldValue::Flag(flag) => assert!(!flag, "{field} not false"),
            }
        }
    }

    #[test]
    fn set_field_rejects_mismatched_value_types() {
        let mut form = FormState::new();
        assert!(form.set_field(FieldName::Email, FieldValue::Flag(true)).is_err());
        assert!(form
            .set_field(FieldName::IsCelebrity, FieldValue::Text("yes".into()))
            .is_err());
        form.set_field(FieldName::IsCelebrity, true.into()).unwrap();
        assert!(form.is_celebrity);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut form = FormState::new();
        form.set_field(FieldName::City, "Lagos".into()).unwrap();
        form.set_field(FieldName::IsCelebrity, true.into()).unwrap();
        form.reset();
        assert_eq!(form, FormState::default());
    }

    #[test]
    fn serialized_form_masks_the_password() {
        let mut form = FormState::new();
        form.set_field(FieldName::Password, "secret12".into()).unwrap();
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["password"], "********");
        assert!(!format!("{form:?}").contains("secret12"));
    }
}
