//! CloudStoreClient - remote account and record service over Supabase REST.
//!
//! Auth goes through the GoTrue endpoints (`/auth/v1/...`); the entry
//! collection lives in one `user_data` row per account (`/rest/v1/user_data`),
//! its `data` column holding either the JSON entry array or a deactivation
//! tombstone. The access token from sign-in is held in-process and attached
//! to every data request.

use async_trait::async_trait;
use mindflow_core::{
    AuthFailure, CloudConfig, Entry, MindflowError, RegisterOutcome, RemoteStore, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote store client for a Supabase-style project.
pub struct CloudStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<CloudSession>>,
}

#[derive(Debug, Clone)]
struct CloudSession {
    access_token: String,
    user_id: String,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct UserDataRow {
    data: Option<Value>,
}

impl CloudStoreClient {
    /// Creates a client for the configured project.
    pub fn new(config: &CloudConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            session: RwLock::new(None),
        }
    }

    /// Attaches the project key and, when present, the session token.
    fn auth_request(
        &self,
        request: reqwest::RequestBuilder,
        session: Option<&CloudSession>,
    ) -> reqwest::RequestBuilder {
        let request = request
            .header("apikey", &self.api_key)
            .timeout(REQUEST_TIMEOUT);
        match session {
            Some(session) => request.header(
                "Authorization",
                format!("Bearer {}", session.access_token),
            ),
            None => request,
        }
    }

    async fn current_session(&self) -> Result<CloudSession> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| AuthFailure::NotSignedIn.into())
    }

    async fn auth_error(response: reqwest::Response) -> MindflowError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&body)
            .ok()
            .and_then(|e| e.error_description.or(e.msg).or(e.message))
            .unwrap_or(body);
        classify_auth_failure(message).into()
    }

    async fn store_error(context: &str, response: reqwest::Response) -> MindflowError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        MindflowError::persistence(format!("{}: {} {}", context, status, body))
    }

    async fn write_row(&self, data: Value) -> Result<()> {
        let session = self.current_session().await?;
        let url = format!(
            "{}/rest/v1/user_data?on_conflict=user_id",
            self.base_url
        );
        let row = serde_json::json!({
            "user_id": session.user_id,
            "data": data,
        });

        let response = self
            .auth_request(self.client.post(&url), Some(&session))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| MindflowError::persistence(format!("Cloud save failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::store_error("Cloud save failed", response).await);
        }
        Ok(())
    }
}

/// Maps an account service rejection message to an auth failure.
///
/// Signing in before completing the confirmation step comes back as
/// "Email not confirmed"; everything else passes through verbatim.
fn classify_auth_failure(message: String) -> AuthFailure {
    if message.to_ascii_lowercase().contains("not confirmed") {
        AuthFailure::ConfirmationRequired
    } else {
        AuthFailure::Rejected(message)
    }
}

/// Interprets a `data` column value as an entry collection.
///
/// A deactivation tombstone, a missing row, or anything that is not an entry
/// array reads as empty.
fn decode_record(data: Option<Value>) -> Vec<Entry> {
    match data {
        Some(Value::Array(items)) => {
            serde_json::from_value(Value::Array(items)).unwrap_or_else(|e| {
                tracing::warn!("Discarding malformed cloud record: {}", e);
                Vec::new()
            })
        }
        Some(Value::Object(map)) if map.get("deactivated") == Some(&Value::Bool(true)) => {
            Vec::new()
        }
        _ => Vec::new(),
    }
}

#[async_trait]
impl RemoteStore for CloudStoreClient {
    async fn sign_up(&self, identity: &str, password: &str) -> Result<RegisterOutcome> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let response = self
            .auth_request(self.client.post(&url), None)
            .json(&CredentialsBody {
                email: identity,
                password,
            })
            .send()
            .await
            .map_err(|e| MindflowError::persistence(format!("Cloud sign-up failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| MindflowError::persistence(format!("Malformed sign-up response: {}", e)))?;

        // A user without a session means the account exists but awaits
        // out-of-band confirmation.
        match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => {
                *self.session.write().await = Some(CloudSession {
                    access_token,
                    user_id: user.id,
                });
                Ok(RegisterOutcome::SignedIn)
            }
            (None, Some(_)) => Ok(RegisterOutcome::ConfirmationRequired),
            _ => Err(MindflowError::persistence(
                "Sign-up response carried neither session nor user",
            )),
        }
    }

    async fn sign_in(&self, identity: &str, password: &str) -> Result<()> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .auth_request(self.client.post(&url), None)
            .json(&CredentialsBody {
                email: identity,
                password,
            })
            .send()
            .await
            .map_err(|e| MindflowError::persistence(format!("Cloud sign-in failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| MindflowError::persistence(format!("Malformed sign-in response: {}", e)))?;

        let (Some(access_token), Some(user)) = (body.access_token, body.user) else {
            return Err(AuthFailure::InvalidCredentials.into());
        };

        *self.session.write().await = Some(CloudSession {
            access_token,
            user_id: user.id,
        });
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let session = self.session.write().await.take();
        if let Some(session) = session {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let result = self
                .auth_request(self.client.post(&url), Some(&session))
                .send()
                .await;
            // The local session is already gone; a failed remote revoke only
            // warrants a warning.
            if let Err(e) = result {
                tracing::warn!("Cloud sign-out failed: {}", e);
            }
        }
        Ok(())
    }

    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        let session = self.current_session().await?;
        let url = format!(
            "{}/rest/v1/user_data?select=data&user_id=eq.{}",
            self.base_url, session.user_id
        );

        let response = self
            .auth_request(self.client.get(&url), Some(&session))
            .send()
            .await
            .map_err(|e| MindflowError::persistence(format!("Cloud fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::store_error("Cloud fetch failed", response).await);
        }

        let rows: Vec<UserDataRow> = response
            .json()
            .await
            .map_err(|e| MindflowError::persistence(format!("Malformed cloud record: {}", e)))?;

        Ok(decode_record(rows.into_iter().next().and_then(|r| r.data)))
    }

    async fn upsert_entries(&self, entries: &[Entry]) -> Result<()> {
        let data = serde_json::to_value(entries)?;
        self.write_row(data).await
    }

    async fn write_tombstone(&self) -> Result<()> {
        let tombstone = serde_json::json!({
            "deactivated": true,
            "deactivatedAt": now_ms(),
        });
        self.write_row(tombstone).await
    }

    async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
