//! In-process provider with the hosted service's observable behavior.
//!
//! Backs the shell's offline mode and the integration tests. Error messages
//! match the hosted service so flows surface the same text either way.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use so_core::ids::{SubscriptionId, UserId};
use so_core::ports::{
    AuthEvent, AuthProviderPort, AuthSubscription, Filter, ProviderError, RecordStorePort,
};
use so_core::security::SecretString;
use so_core::session::{AuthUser, Credentials, Session, SignUpRequest};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::auth_events::AuthEventHub;

const USER_ALREADY_REGISTERED: &str = "User already registered";
const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const EMAIL_NOT_CONFIRMED: &str = "Email not confirmed";
const WEAK_PASSWORD: &str = "Password should be at least 6 characters";
const NOT_SINGLE_ROW: &str = "JSON object requested, multiple (or no) rows returned";
const PROVIDER_MIN_PASSWORD_LEN: usize = 6;
const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct InMemoryOptions {
    /// Sign-in is refused until [`InMemoryProvider::confirm_email`] runs.
    pub require_email_confirmation: bool,
    /// Insert an empty profile row on sign-up, like a database trigger.
    pub profile_trigger: bool,
    /// Seed the celebrity catalog with three sample entries.
    pub seed_celebrities: bool,
    pub profiles_table: String,
    pub celebrities_table: String,
}

impl Default for InMemoryOptions {
    fn default() -> Self {
        Self {
            require_email_confirmation: false,
            profile_trigger: true,
            seed_celebrities: true,
            profiles_table: "profiles".to_string(),
            celebrities_table: "celebrities".to_string(),
        }
    }
}

struct Account {
    user: AuthUser,
    password: SecretString,
}

struct ActiveSession {
    user: AuthUser,
    access_token: SecretString,
    expires_at: chrono::DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    session: Option<ActiveSession>,
    tables: HashMap<String, Vec<Value>>,
}

pub struct InMemoryProvider {
    inner: Mutex<Inner>,
    hub: AuthEventHub,
    options: InMemoryOptions,
}

impl InMemoryProvider {
    pub fn new(options: InMemoryOptions) -> Self {
        let mut inner = Inner::default();
        if options.seed_celebrities {
            inner
                .tables
                .insert(options.celebrities_table.clone(), seed_celebrities());
        }
        Self {
            inner: Mutex::new(inner),
            hub: AuthEventHub::new(),
            options,
        }
    }

    /// Marks the account's email as confirmed. Returns whether it exists.
    pub async fn confirm_email(&self, email: &str) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.accounts.get_mut(&normalize_email(email)) {
            Some(account) => {
                account.user.email_confirmed_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// Copy of every row in `table`.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        let inner = self.inner.lock().await;
        inner.tables.get(table).cloned().unwrap_or_default()
    }

    pub async fn listener_count(&self) -> usize {
        self.hub.subscriber_count().await
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new(InMemoryOptions::default())
    }
}

#[async_trait]
impl AuthProviderPort for InMemoryProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser, ProviderError> {
        let email = normalize_email(&request.credentials.email);
        if request.credentials.password.char_len() < PROVIDER_MIN_PASSWORD_LEN {
            return Err(ProviderError::rejected(WEAK_PASSWORD));
        }

        let mut inner = self.inner.lock().await;
        if inner.accounts.contains_key(&email) {
            return Err(ProviderError::rejected(USER_ALREADY_REGISTERED));
        }

        let now = Utc::now();
        let user = AuthUser {
            id: UserId::generate(),
            email: email.clone(),
            email_confirmed_at: (!self.options.require_email_confirmation).then_some(now),
            created_at: now,
            metadata: request.metadata,
        };

        if self.options.profile_trigger {
            inner
                .tables
                .entry(self.options.profiles_table.clone())
                .or_default()
                .push(json!({ "id": user.id }));
        }

        inner.accounts.insert(
            email,
            Account {
                user: user.clone(),
                password: request.credentials.password,
            },
        );
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    async fn sign_in_with_password(
        &self,
        credentials: Credentials,
    ) -> Result<Session, ProviderError> {
        let user = {
            let mut inner = self.inner.lock().await;
            let account = inner
                .accounts
                .get(&normalize_email(&credentials.email))
                .filter(|account| account.password.expose() == credentials.password.expose())
                .ok_or_else(|| ProviderError::rejected(INVALID_CREDENTIALS))?;
            if account.user.email_confirmed_at.is_none() {
                return Err(ProviderError::rejected(EMAIL_NOT_CONFIRMED));
            }
            let user = account.user.clone();

            inner.session = Some(ActiveSession {
                user: user.clone(),
                access_token: SecretString::new(uuid::Uuid::new_v4().to_string()),
                expires_at: Utc::now() + Duration::seconds(SESSION_TTL_SECS),
            });
            user
        };

        self.hub.publish(AuthEvent::signed_in(user.clone())).await;
        debug!(user_id = %user.id, "session opened");
        self.get_session()
            .await?
            .ok_or_else(|| ProviderError::Unexpected("session vanished after sign-in".to_string()))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let had_session = self.inner.lock().await.session.take().is_some();
        if had_session {
            self.hub.publish(AuthEvent::signed_out()).await;
            debug!("session closed");
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        let inner = self.inner.lock().await;
        Ok(inner.session.as_ref().map(|session| Session {
            user: session.user.clone(),
            access_token: session.access_token.duplicate(),
            expires_at: Some(session.expires_at),
        }))
    }

    async fn subscribe_auth_events(&self) -> Result<AuthSubscription, ProviderError> {
        Ok(self.hub.subscribe().await)
    }

    async fn unsubscribe(&self, id: &SubscriptionId) {
        self.hub.unsubscribe(id).await;
    }
}

#[async_trait]
impl RecordStorePort for InMemoryProvider {
    async fn select_single(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<Value>, ProviderError> {
        let mut rows = self.select(table, filters).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(ProviderError::rejected(NOT_SINGLE_ROW)),
        }
    }

    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, ProviderError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| filter.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ProviderError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.tables.entry(table.to_string()).or_default();
        for row in &rows {
            ensure_object(row)?;
            if let Some(id) = row.get("id") {
                if stored.iter().any(|existing| existing.get("id") == Some(id)) {
                    return Err(ProviderError::rejected(format!(
                        "duplicate key value violates unique constraint \"{table}_pkey\""
                    )));
                }
            }
        }
        stored.extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update(
        &self,
        table: &str,
        fields: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, ProviderError> {
        let fields = ensure_object(&fields)?.clone();
        let mut inner = self.inner.lock().await;
        let Some(rows) = inner.tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows
            .iter_mut()
            .filter(|row| filters.iter().all(|filter| filter.matches(row)))
        {
            merge_into(row, &fields);
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<Value, ProviderError> {
        let fields = ensure_object(&row)?.clone();
        let id = fields
            .get("id")
            .cloned()
            .ok_or_else(|| ProviderError::rejected("upsert requires an id column"))?;

        let mut inner = self.inner.lock().await;
        let rows = inner.tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|existing| existing.get("id") == Some(&id)) {
            Some(existing) => {
                merge_into(existing, &fields);
                Ok(existing.clone())
            }
            None => {
                rows.push(row.clone());
                Ok(row)
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn ensure_object(row: &Value) -> Result<&Map<String, Value>, ProviderError> {
    row.as_object()
        .ok_or_else(|| ProviderError::rejected("row must be a JSON object"))
}

fn merge_into(row: &mut Value, fields: &Map<String, Value>) {
    if let Some(target) = row.as_object_mut() {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn seed_celebrities() -> Vec<Value> {
    vec![
        json!({
            "id": "1",
            "name": "John Smith",
            "category": "Actor",
            "price": 100,
            "description": "Hollywood actor with 20+ years experience"
        }),
        json!({
            "id": "2",
            "name": "Sarah Johnson",
            "category": "Singer",
            "price": 150,
            "description": "Grammy award winning artist"
        }),
        json!({
            "id": "3",
            "name": "Mike Chen",
            "category": "Comedian",
            "price": 80,
            "description": "Stand-up comedian and TV personality"
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use so_core::session::UserMetadata;

    fn sign_up_request(email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            credentials: credentials(email, password),
            metadata: UserMetadata::default(),
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: SecretString::new(password.to_string()),
        }
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let provider = InMemoryProvider::default();
        provider
            .sign_up(sign_up_request("fan@test.com", "password123"))
            .await
            .unwrap();

        let err = provider
            .sign_up(sign_up_request("FAN@test.com", "password123"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), USER_ALREADY_REGISTERED);
    }

    #[tokio::test]
    async fn profile_trigger_creates_stub_row() {
        let provider = InMemoryProvider::default();
        let user = provider
            .sign_up(sign_up_request("fan@test.com", "password123"))
            .await
            .unwrap();

        let row = provider
            .select_single("profiles", &[Filter::eq("id", user.id.as_str())])
            .await
            .unwrap();
        assert_eq!(row, Some(json!({ "id": user.id })));
    }

    #[tokio::test]
    async fn sign_in_requires_matching_password_and_confirmation() {
        let provider = InMemoryProvider::new(InMemoryOptions {
            require_email_confirmation: true,
            ..InMemoryOptions::default()
        });
        provider
            .sign_up(sign_up_request("fan@test.com", "password123"))
            .await
            .unwrap();

        let err = provider
            .sign_in_with_password(credentials("fan@test.com", "wrong-password"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), INVALID_CREDENTIALS);

        let err = provider
            .sign_in_with_password(credentials("fan@test.com", "password123"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), EMAIL_NOT_CONFIRMED);

        assert!(provider.confirm_email("fan@test.com").await);
        let session = provider
            .sign_in_with_password(credentials("fan@test.com", "password123"))
            .await
            .unwrap();
        assert_eq!(session.user.email, "fan@test.com");
    }

    #[tokio::test]
    async fn sign_in_and_out_publish_auth_events() {
        let provider = InMemoryProvider::default();
        provider
            .sign_up(sign_up_request("fan@test.com", "password123"))
            .await
            .unwrap();
        let mut subscription = provider.subscribe_auth_events().await.unwrap();

        provider
            .sign_in_with_password(credentials("fan@test.com", "password123"))
            .await
            .unwrap();
        provider.sign_out().await.unwrap();

        let signed_in = subscription.events.recv().await.unwrap();
        assert_eq!(signed_in.change, so_core::ports::AuthChange::SignedIn);
        let signed_out = subscription.events.recv().await.unwrap();
        assert_eq!(signed_out, AuthEvent::signed_out());
        assert!(provider.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_merges_existing_rows() {
        let provider = InMemoryProvider::default();
        provider
            .insert("profiles", vec![json!({ "id": "u1", "bio": "old" })])
            .await
            .unwrap();

        let stored = provider
            .upsert("profiles", json!({ "id": "u1", "first_name": "Ada" }))
            .await
            .unwrap();
        assert_eq!(stored, json!({ "id": "u1", "bio": "old", "first_name": "Ada" }));
        assert_eq!(provider.rows("profiles").await.len(), 1);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let provider = InMemoryProvider::default();
        provider
            .insert("profiles", vec![json!({ "id": "u1" })])
            .await
            .unwrap();
        let err = provider
            .insert("profiles", vec![json!({ "id": "u1" })])
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn update_touches_only_matching_rows() {
        let provider = InMemoryProvider::default();
        provider
            .insert(
                "video_requests",
                vec![
                    json!({ "id": "r1", "celebrity_id": "c1", "status": "pending" }),
                    json!({ "id": "r2", "celebrity_id": "c2", "status": "pending" }),
                ],
            )
            .await
            .unwrap();

        let updated = provider
            .update(
                "video_requests",
                json!({ "status": "accepted" }),
                &[Filter::eq("id", "r1"), Filter::eq("celebrity_id", "c2")],
            )
            .await
            .unwrap();
        assert!(updated.is_empty());

        let updated = provider
            .update(
                "video_requests",
                json!({ "status": "accepted" }),
                &[Filter::eq("id", "r1"), Filter::eq("celebrity_id", "c1")],
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["status"], "accepted");
    }

    #[tokio::test]
    async fn celebrities_are_seeded() {
        let provider = InMemoryProvider::default();
        let rows = provider.select("celebrities", &[]).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["name"], "Sarah Johnson");
    }
}
