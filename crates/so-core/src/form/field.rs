use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every input the flows collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Email,
    Password,
    FirstName,
    LastName,
    Username,
    Phone,
    DateOfBirth,
    Country,
    City,
    Bio,
    IsCelebrity,
    RecipientName,
    Occasion,
    MessageDetails,
    PersonalMessage,
}

impl FieldName {
    pub const ALL: [FieldName; 15] = [
        FieldName::Email,
        FieldName::Password,
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Username,
        FieldName::Phone,
        FieldName::DateOfBirth,
        FieldName::Country,
        FieldName::City,
        FieldName::Bio,
        FieldName::IsCelebrity,
        FieldName::RecipientName,
        FieldName::Occasion,
        FieldName::MessageDetails,
        FieldName::PersonalMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Email => "email",
            FieldName::Password => "password",
            FieldName::FirstName => "first_name",
            FieldName::LastName => "last_name",
            FieldName::Username => "username",
            FieldName::Phone => "phone",
            FieldName::DateOfBirth => "date_of_birth",
            FieldName::Country => "country",
            FieldName::City => "city",
            FieldName::Bio => "bio",
            FieldName::IsCelebrity => "is_celebrity",
            FieldName::RecipientName => "recipient_name",
            FieldName::Occasion => "occasion",
            FieldName::MessageDetails => "message_details",
            FieldName::PersonalMessage => "personal_message",
        }
    }

    /// Checkbox-style fields hold a boolean instead of text.
    pub fn is_flag(&self) -> bool {
        matches!(self, FieldName::IsCelebrity)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// A single input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Interprets raw user input for the given field.
    ///
    /// Flag fields accept `true/false`, `on/off`, `yes/no` and `1/0`.
    pub fn from_input(field: FieldName, raw: &str) -> Result<Self, FormError> {
        if !field.is_flag() {
            return Ok(FieldValue::Text(raw.to_string()));
        }
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(FieldValue::Flag(true)),
            "false" | "off" | "no" | "0" | "" => Ok(FieldValue::Flag(false)),
            _ => Err(FormError::TypeMismatch { field }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(String),
    #[error("value has the wrong type for field {field}")]
    TypeMismatch { field: FieldName },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip_through_wire_names() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_field_name_is_rejected() {
        assert_eq!(
            "nickname".parse::<FieldName>(),
            Err(FormError::UnknownField("nickname".to_string()))
        );
    }

    #[test]
    fn flag_input_parses_checkbox_values() {
        assert_eq!(
            FieldValue::from_input(FieldName::IsCelebrity, "on").unwrap(),
            FieldValue::Flag(true)
        );
        assert!(FieldValue::from_input(FieldName::IsCelebrity, "maybe").is_err());
        assert_eq!(
            FieldValue::from_input(FieldName::City, "Oslo").unwrap(),
            FieldValue::Text("Oslo".to_string())
        );
    }
}
