use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Profile;
use crate::ids::UserId;
use crate::marketplace::Role;
use crate::security::SecretString;

/// Free-form attributes the provider stores next to the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_celebrity: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Account record owned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, rename = "user_metadata")]
    pub metadata: UserMetadata,
}

/// An authenticated session as reported by the provider.
#[derive(Debug)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct SignUpRequest {
    pub credentials: Credentials,
    pub metadata: UserMetadata,
}

/// The provider user merged with its profile row and resolved role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub user: AuthUser,
    pub profile: Option<Profile>,
    pub role: Role,
}

impl SessionUser {
    /// Resolves the role once, from the account metadata.
    pub fn new(user: AuthUser, profile: Option<Profile>) -> Self {
        let role = Role::from_metadata(&user.metadata);
        Self {
            user,
            profile,
            role,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    /// Whether the profile row carries user-supplied data.
    pub fn has_profile_data(&self) -> bool {
        self.profile
            .as_ref()
            .map(Profile::has_profile_data)
            .unwrap_or(false)
    }

    pub fn merge_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(metadata: UserMetadata) -> AuthUser {
        AuthUser {
            id: UserId::from("user123"),
            email: "fan@test.com".to_string(),
            email_confirmed_at: None,
            created_at: Utc::now(),
            metadata,
        }
    }

    #[test]
    fn role_is_resolved_from_metadata() {
        let fan = SessionUser::new(auth_user(UserMetadata::default()), None);
        assert_eq!(fan.role, Role::Fan);

        let celebrity = SessionUser::new(
            auth_user(UserMetadata {
                is_celebrity: true,
                ..UserMetadata::default()
            }),
            None,
        );
        assert_eq!(celebrity.role, Role::Celebrity);
    }

    #[test]
    fn has_profile_data_requires_first_name() {
        let mut user = SessionUser::new(auth_user(UserMetadata::default()), None);
        assert!(!user.has_profile_data());

        user.merge_profile(Profile::empty(UserId::from("user123")));
        assert!(!user.has_profile_data());

        let mut profile = Profile::empty(UserId::from("user123"));
        profile.first_name = "Ada".into();
        user.merge_profile(profile);
        assert!(user.has_profile_data());
    }

    #[test]
    fn auth_user_decodes_provider_payload() {
        let json = serde_json::json!({
            "id": "b5f7",
            "email": "star@test.com",
            "email_confirmed_at": null,
            "created_at": "2024-01-15T10:00:00Z",
            "user_metadata": { "is_celebrity": true, "first_name": "Sam", "plan": "gold" }
        });
        let user: AuthUser = serde_json::from_value(json).unwrap();
        assert!(user.metadata.is_celebrity);
        assert_eq!(user.metadata.first_name.as_deref(), Some("Sam"));
        assert_eq!(user.metadata.extra["plan"], "gold");
    }
}
