//! Remote identity service boundary
//!
//! `AuthSession` talks to an `IdentityService`. Two backends ship: a REST
//! client for the email/password Identity Toolkit API, and an in-process
//! registry for offline use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{Backend, Config};
use crate::error::AuthError;

/// Minimum password length accepted by the in-memory backend
pub const MIN_PASSWORD_LEN: usize = 6;

/// A signed-in identity, held by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub signed_in_at: DateTime<Utc>,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Session currently held by the backend, if any
    fn current_session(&self) -> Option<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn create_user(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Drops the current session. Never fails.
    fn sign_out(&self);
}

/// Build the backend selected by the configuration
pub fn build_identity(config: &Config) -> Result<Arc<dyn IdentityService>, AuthError> {
    match config.backend {
        Backend::Rest => Ok(Arc::new(RestIdentity::from_config(config)?)),
        Backend::Memory => Ok(Arc::new(MemoryIdentity::new())),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Decode an `accounts:*` response body into a session or a failure
fn decode_account_response(status: u16, body: &str, email: &str) -> Result<Session, AuthError> {
    if !(200..300).contains(&status) {
        return match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Err(AuthError::rejected(envelope.error.message.unwrap_or_default())),
            Err(_) => Err(AuthError::Http {
                status,
                message: body.trim().to_string(),
            }),
        };
    }

    let account: AccountResponse =
        serde_json::from_str(body).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
    Ok(Session {
        user_id: account.local_id,
        email: account.email.unwrap_or_else(|| email.to_string()),
        id_token: account.id_token,
        signed_in_at: Utc::now(),
    })
}

/// Identity Toolkit REST client
pub struct RestIdentity {
    http: Client,
    base_url: String,
    api_key: String,
    session: Mutex<Option<Session>>,
}

impl RestIdentity {
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AuthError::Unavailable("no API key configured".to_string()))?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(AuthError::Network)?;

        Ok(Self {
            http,
            base_url: config.auth_url.trim_end_matches('/').to_string(),
            api_key,
            session: Mutex::new(None),
        })
    }

    async fn post_account(&self, endpoint: &str, email: &str, password: &str) -> Result<Session, AuthError> {
        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        debug!("post_account: {} for {}", endpoint, email);

        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let session = decode_account_response(status, &body, email)
            .inspect_err(|e| warn!("{} failed: {}", endpoint, e))?;

        *lock(&self.session) = Some(session.clone());
        Ok(session)
    }
}

#[async_trait]
impl IdentityService for RestIdentity {
    fn current_session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.post_account("signInWithPassword", email, password).await
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.post_account("signUp", email, password).await
    }

    fn sign_out(&self) {
        lock(&self.session).take();
    }
}

/// In-process account registry
#[derive(Default)]
pub struct MemoryIdentity {
    accounts: Mutex<HashMap<String, String>>,
    session: Mutex<Option<Session>>,
    remote_calls: AtomicUsize,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        lock(&self.accounts).insert(email.to_string(), password.to_string());
        self
    }

    /// Number of sign-in and account-creation calls received
    pub fn remote_calls(&self) -> usize {
        self.remote_calls.load(Ordering::SeqCst)
    }

    fn open_session(&self, email: &str) -> Session {
        let n = self.remote_calls();
        let session = Session {
            user_id: format!("local-{}", email),
            email: email.to_string(),
            id_token: format!("local-token-{}", n),
            signed_in_at: Utc::now(),
        };
        *lock(&self.session) = Some(session.clone());
        session
    }
}

#[async_trait]
impl IdentityService for MemoryIdentity {
    fn current_session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        let known = lock(&self.accounts).get(email).cloned();
        match known {
            None => Err(AuthError::rejected("EMAIL_NOT_FOUND")),
            Some(stored) if stored != password => Err(AuthError::rejected("INVALID_PASSWORD")),
            Some(_) => Ok(self.open_session(email)),
        }
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::rejected("WEAK_PASSWORD"));
        }
        {
            let mut accounts = lock(&self.accounts);
            if accounts.contains_key(email) {
                return Err(AuthError::rejected("EMAIL_EXISTS"));
            }
            accounts.insert(email.to_string(), password.to_string());
        }
        Ok(self.open_session(email))
    }

    fn sign_out(&self) {
        lock(&self.session).take();
    }
}
