//! REST adapter for the hosted authentication + row store service.
//!
//! Speaks the GoTrue-style auth endpoints under `/auth/v1` and the
//! PostgREST-style table endpoints under `/rest/v1`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use so_core::ids::SubscriptionId;
use so_core::ports::{
    AuthEvent, AuthProviderPort, AuthSubscription, Filter, ProviderError, RecordStorePort,
};
use so_core::security::SecretString;
use so_core::session::{AuthUser, Credentials, Session, SignUpRequest};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth_events::AuthEventHub;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct RestProviderConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    pub anon_key: SecretString,
    pub timeout: Duration,
}

impl RestProviderConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: SecretString::new(anon_key.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

struct StoredSession {
    user: AuthUser,
    access_token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

pub struct RestProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
    session: Mutex<Option<StoredSession>>,
    hub: AuthEventHub,
}

impl RestProvider {
    pub fn new(config: RestProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key,
            session: Mutex::new(None),
            hub: AuthEventHub::new(),
        })
    }

    /// Request with the `apikey` header and the session bearer (anon key when signed out).
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = {
            let session = self.session.lock().await;
            session
                .as_ref()
                .map(|s| s.access_token.expose().to_string())
                .unwrap_or_else(|| self.anon_key.expose().to_string())
        };
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", self.anon_key.expose())
            .bearer_auth(bearer)
    }

    async fn table_request(
        &self,
        method: Method,
        table: &str,
        filters: &[Filter],
    ) -> RequestBuilder {
        let query: Vec<(String, String)> = filters
            .iter()
            .map(|filter| (filter.column.clone(), format!("eq.{}", filter.value)))
            .collect();
        self.request(method, &format!("/rest/v1/{table}"))
            .await
            .query(&query)
    }

    async fn rows(&self, builder: RequestBuilder) -> Result<Vec<Value>, ProviderError> {
        let response = builder.send().await.map_err(transport)?;
        let response = check_status(response).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

#[async_trait]
impl AuthProviderPort for RestProvider {
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser, ProviderError> {
        let body = json!({
            "email": request.credentials.email,
            "password": request.credentials.password.expose(),
            "data": request.metadata,
        });
        let response = self
            .request(Method::POST, "/auth/v1/signup")
            .await
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let mut payload: Value = check_status(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        // With confirmation disabled the service answers with a session
        // wrapping the user; otherwise with the bare user.
        let user_value = if payload.get("user").is_some() {
            payload["user"].take()
        } else {
            payload
        };
        let user: AuthUser = serde_json::from_value(user_value)?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    async fn sign_in_with_password(
        &self,
        credentials: Credentials,
    ) -> Result<Session, ProviderError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose(),
        });
        let response = self
            .request(Method::POST, "/auth/v1/token")
            .await
            .query(&[("grant_type", "password")])
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        let token: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))?;

        let expires_at = match (token.expires_at, token.expires_in) {
            (Some(at), _) => Utc.timestamp_opt(at, 0).single(),
            (None, Some(secs)) => Some(Utc::now() + chrono::Duration::seconds(secs)),
            (None, None) => None,
        };
        let user = token.user;
        *self.session.lock().await = Some(StoredSession {
            user: user.clone(),
            access_token: SecretString::new(token.access_token.clone()),
            expires_at,
        });

        self.hub.publish(AuthEvent::signed_in(user.clone())).await;
        debug!(user_id = %user.id, "session opened");
        Ok(Session {
            user,
            access_token: SecretString::new(token.access_token),
            expires_at,
        })
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let had_session = self.session.lock().await.is_some();
        if !had_session {
            return Ok(());
        }

        let result = match self
            .request(Method::POST, "/auth/v1/logout")
            .await
            .send()
            .await
        {
            Ok(response) => check_status(response).await.map(|_| ()),
            Err(err) => Err(transport(err)),
        };

        *self.session.lock().await = None;
        self.hub.publish(AuthEvent::signed_out()).await;
        if let Err(err) = &result {
            warn!(error = %err, "remote logout failed; local session cleared");
        }
        result
    }

    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        let session = self.session.lock().await;
        Ok(session.as_ref().map(|s| Session {
            user: s.user.clone(),
            access_token: s.access_token.duplicate(),
            expires_at: s.expires_at,
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
impl RecordStorePort for RestProvider {
    async fn select_single(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<Value>, ProviderError> {
        let mut rows = self.select(table, filters).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(ProviderError::rejected(format!(
                "JSON object requested, multiple (or no) rows returned ({n} rows)"
            ))),
        }
    }

    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, ProviderError> {
        let builder = self
            .table_request(Method::GET, table, filters)
            .await
            .query(&[("select", "*")]);
        self.rows(builder).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ProviderError> {
        let builder = self
            .table_request(Method::POST, table, &[])
            .await
            .header("Prefer", "return=representation")
            .json(&rows);
        self.rows(builder).await
    }

    async fn update(
        &self,
        table: &str,
        fields: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, ProviderError> {
        let builder = self
            .table_request(Method::PATCH, table, filters)
            .await
            .header("Prefer", "return=representation")
            .json(&fields);
        self.rows(builder).await
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<Value, ProviderError> {
        let builder = self
            .table_request(Method::POST, table, &[])
            .await
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("upsert returned no rows".to_string()))
    }
}

fn transport(err: reqwest::Error) -> ProviderError {
    ProviderError::Transport(err.to_string())
}

/// Passes successful responses through; turns error bodies into provider errors.
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &body))
}

fn error_from_body(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["msg", "message", "error_description", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match message {
        Some(message) => ProviderError::Rejected { message },
        None if status.is_server_error() => {
            ProviderError::Transport(format!("server error: {status}"))
        }
        None => ProviderError::Unexpected(format!("unexpected status: {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_human_readable_fields() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err, ProviderError::rejected("Invalid login credentials"));

        let err = error_from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"msg":"User already registered"}"#,
        );
        assert_eq!(err, ProviderError::rejected("User already registered"));
    }

    #[test]
    fn opaque_error_bodies_are_not_user_facing() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ProviderError::Transport(_)));

        let err = error_from_body(StatusCode::IM_A_TEAPOT, "");
        assert!(matches!(err, ProviderError::Unexpected(_)));
    }
}
