//! Supabase client
//!
//! Implements the remote store port on top of Supabase's REST surface:
//! GoTrue (`/auth/v1`) for sessions and PostgREST (`/rest/v1`) for tables.
//!
//! API Documentation: https://supabase.com/docs/guides/api

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{Identity, Session};
use crate::ports::{Filter, RemoteStore, Row};
use crate::session;

/// Environment variable for the project URL
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable for the public anon key
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Token grant response from `/auth/v1/token` and auto-confirmed sign-ups
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

/// User object from `/auth/v1/user`
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: uuid::Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        Identity {
            id: user.id,
            email: user.email,
        }
    }
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| {
                token
                    .expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user.map(Identity::from),
        }
    }
}

/// Supabase API client
#[derive(Debug)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    session_dir: Option<PathBuf>,
}

impl SupabaseClient {
    /// Create a client for a project URL and anon key
    pub fn new(project_url: &str, anon_key: &str) -> Result<Self> {
        if anon_key.trim().is_empty() {
            return Err(Error::config("Supabase anon key cannot be empty"));
        }

        let parsed = Url::parse(project_url)
            .map_err(|e| Error::config(format!("Invalid Supabase URL '{}': {}", project_url, e)))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(Error::config("Supabase URL must use http or https"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: project_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            session_dir: None,
        })
    }

    /// Start with a previously stored session
    pub fn with_session(self, session: Option<Session>) -> Self {
        self.set_session(session);
        self
    }

    /// Write refreshed sessions to `session.json` in `app_dir`
    pub fn persist_sessions_in(mut self, app_dir: &Path) -> Self {
        self.session_dir = Some(app_dir.to_path_buf());
        self
    }

    /// The session currently held, if any
    pub fn session(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn set_session(&self, session: Option<Session>) {
        if let Ok(mut slot) = self.session.write() {
            *slot = session;
        }
    }

    fn forget_session(&self) -> Result<()> {
        self.set_session(None);
        match &self.session_dir {
            Some(dir) => session::clear_session(dir),
            None => Ok(()),
        }
    }

    /// Trade the refresh token for a new session.
    ///
    /// `None` when the auth service no longer accepts the refresh token; the
    /// stored session is dropped in that case.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<Session>> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if matches!(response.status().as_u16(), 400 | 401 | 403) {
            self.forget_session()?;
            return Ok(None);
        }

        let response = self.check_response(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse refresh response: {}", e)))?;

        let mut session = Session::from(token);
        if session.refresh_token.is_none() {
            session.refresh_token = Some(refresh_token.to_string());
        }
        self.set_session(Some(session.clone()));
        if let Some(dir) = &self.session_dir {
            session::save_session(dir, &session)?;
        }
        Ok(Some(session))
    }

    /// Sign in with email + password and keep the resulting session
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = self.check_response(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse sign-in response: {}", e)))?;

        let session = Session::from(token);
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Register a new user.
    ///
    /// Returns `None` when the project requires email confirmation before a
    /// session is issued.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = self.check_response(response).await?;
        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse sign-up response: {}", e)))?;

        if body.get("access_token").is_none() {
            return Ok(None);
        }

        let token: TokenResponse = serde_json::from_value(body)?;
        let session = Session::from(token);
        self.set_session(Some(session.clone()));
        Ok(Some(session))
    }

    /// Attach the project key and the caller's bearer token
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn filter_query(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value_string())))
            .collect()
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::remote("Connection timed out after 30 seconds")
        } else if error.is_connect() {
            Error::remote("Unable to connect to Supabase")
        } else {
            Error::remote(format!("Supabase request failed: {}", error))
        }
    }

    /// Pass 2xx responses through, turn everything else into `RemoteFailure`
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_message(&body);
        Err(match status.as_u16() {
            401 | 403 => Error::remote(format!("Supabase rejected the credentials: {}", detail)),
            404 => Error::remote(format!("Supabase resource not found: {}", detail)),
            code => Error::remote(format!("Supabase API error: HTTP {}: {}", code, detail)),
        })
    }
}

/// Pull a readable message out of a GoTrue or PostgREST error body
fn error_message(body: &str) -> String {
    let parsed: Option<JsonValue> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl RemoteStore for SupabaseClient {
    async fn current_identity(&self) -> Result<Option<Identity>> {
        let Some(mut session) = self.session() else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            let Some(refresh_token) = session.refresh_token.clone() else {
                return Ok(None);
            };
            match self.refresh_session(&refresh_token).await? {
                Some(fresh) => session = fresh,
                None => return Ok(None),
            }
        }

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        // A revoked or stale token just means nobody is signed in
        if matches!(response.status().as_u16(), 401 | 403) {
            return Ok(None);
        }

        let response = self.check_response(response).await?;
        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse user response: {}", e)))?;
        Ok(Some(user.into()))
    }

    async fn select(&self, table: &str, columns: &[&str], filters: &[Filter]) -> Result<Vec<Row>> {
        let select = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(",")
        };
        let mut query = vec![("select".to_string(), select)];
        query.extend(Self::filter_query(filters));

        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = self.check_response(response).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| Error::remote(format!("Failed to parse rows from '{}': {}", table, e)))
    }

    async fn insert(&self, table: &str, rows: &[Row]) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_response(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
        let response = self
            .authorized(self.client.delete(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .query(&Self::filter_query(filters))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_response(response).await?;
        Ok(())
    }

    async fn upsert(&self, table: &str, row: &Row) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_response(response).await?;
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.session() {
            let url = format!("{}/auth/v1/logout", self.base_url);
            // The local session goes away whatever the server says
            let _ = self
                .client
                .post(&url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
        }
        self.set_session(None);
        Ok(())
    }
}
