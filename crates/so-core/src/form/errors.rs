use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use super::field::FieldName;

/// Slot a message is attached to: one input, or the reserved `submit` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKey {
    Field(FieldName),
    Submit,
}

impl ErrorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKey::Field(field) => field.as_str(),
            ErrorKey::Submit => "submit",
        }
    }
}

impl From<FieldName> for ErrorKey {
    fn from(field: FieldName) -> Self {
        ErrorKey::Field(field)
    }
}

impl Serialize for ErrorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Human-readable messages keyed by field, plus `submit` for provider failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorState {
    entries: BTreeMap<ErrorKey, String>,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<ErrorKey>, message: impl Into<String>) {
        self.entries.insert(key.into(), message.into());
    }

    pub fn set_submit(&mut self, message: impl Into<String>) {
        self.entries.insert(ErrorKey::Submit, message.into());
    }

    /// Removes exactly the entry for `field`; returns whether one existed.
    pub fn clear_field(&mut self, field: FieldName) -> bool {
        self.entries.remove(&ErrorKey::Field(field)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: impl Into<ErrorKey>) -> Option<&str> {
        self.entries.get(&key.into()).map(String::as_str)
    }

    pub fn field(&self, field: FieldName) -> Option<&str> {
        self.get(field)
    }

    pub fn submit(&self) -> Option<&str> {
        self.get(ErrorKey::Submit)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ErrorKey, &String)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_field_leaves_other_entries_untouched() {
        let mut errors = ErrorState::new();
        errors.insert(FieldName::Email, "Email is required");
        errors.insert(FieldName::Password, "Password is required");
        errors.set_submit("Invalid login credentials");

        assert!(errors.clear_field(FieldName::Email));

        assert_eq!(errors.field(FieldName::Email), None);
        assert_eq!(errors.field(FieldName::Password), Some("Password is required"));
        assert_eq!(errors.submit(), Some("Invalid login credentials"));
        assert!(!errors.clear_field(FieldName::Email));
    }

    #[test]
    fn serializes_as_flat_string_map() {
        let mut errors = ErrorState::new();
        errors.insert(FieldName::FirstName, "First name is required");
        errors.set_submit("boom");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["first_name"], "First name is required");
        assert_eq!(json["submit"], "boom");
    }
}
