use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::form::FormState;
use crate::ids::UserId;

/// User-supplied attributes beyond credentials, keyed by the provider user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Stub row created when a session has no profile yet.
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            username: String::new(),
            phone: String::new(),
            date_of_birth: String::new(),
            country: String::new(),
            city: String::new(),
            bio: String::new(),
            updated_at: None,
        }
    }

    /// Profile row built from the submitted form fields.
    pub fn from_form(id: UserId, form: &FormState, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            username: form.username.clone(),
            phone: form.phone.clone(),
            date_of_birth: form.date_of_birth.clone(),
            country: form.country.clone(),
            city: form.city.clone(),
            bio: form.bio.clone(),
            updated_at: Some(updated_at),
        }
    }

    pub fn has_profile_data(&self) -> bool {
        !self.first_name.is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
