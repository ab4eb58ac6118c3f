//! Authentication state machine
//!
//! `AuthSession` owns the single current `AuthStatus` and forwards sign-in,
//! sign-up and sign-out to an `IdentityService`. The status lives in a
//! `watch` channel: observers always see the latest value, and a new
//! subscriber sees the current one immediately.
//!
//! `login` and `signup` move to `Loading` before returning and resolve later
//! from a task spawned on the runtime. Overlapping calls are not
//! de-duplicated; whichever remote call finishes last sets the status.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::identity::{IdentityService, Session};
use crate::models::AuthStatus;

/// Shown when either credential field is empty
pub const FILL_ALL_FIELDS: &str = "fill all fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credentials {
    SignIn,
    CreateUser,
}

#[derive(Clone)]
pub struct AuthSession {
    identity: Arc<dyn IdentityService>,
    status: Arc<watch::Sender<AuthStatus>>,
    runtime: Handle,
}

impl AuthSession {
    /// Starts in `Idle`; call `check_status` to learn whether a session exists.
    pub fn new(identity: Arc<dyn IdentityService>, runtime: Handle) -> Self {
        let (status, _) = watch::channel(AuthStatus::Idle);
        Self {
            identity,
            status: Arc::new(status),
            runtime,
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    /// Session held by the backend, if any
    pub fn current_session(&self) -> Option<Session> {
        self.identity.current_session()
    }

    pub fn check_status(&self) {
        let next = if self.identity.current_session().is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        };
        publish(&self.status, next);
    }

    pub fn login(&self, email: &str, password: &str) {
        self.submit(Credentials::SignIn, email, password);
    }

    pub fn signup(&self, email: &str, password: &str) {
        self.submit(Credentials::CreateUser, email, password);
    }

    pub fn signout(&self) {
        self.identity.sign_out();
        publish(&self.status, AuthStatus::Unauthenticated);
    }

    fn submit(&self, kind: Credentials, email: &str, password: &str) {
        if email.is_empty() || password.is_empty() {
            publish(&self.status, AuthStatus::Error(FILL_ALL_FIELDS.to_string()));
            return;
        }

        publish(&self.status, AuthStatus::Loading);

        let identity = Arc::clone(&self.identity);
        let status = Arc::clone(&self.status);
        let email = email.to_string();
        let password = password.to_string();

        self.runtime.spawn(async move {
            let result = match kind {
                Credentials::SignIn => identity.sign_in(&email, &password).await,
                Credentials::CreateUser => identity.create_user(&email, &password).await,
            };
            let next = match result {
                Ok(session) => {
                    info!("{:?} succeeded for user {}", kind, session.user_id);
                    debug!("id token issued ({} bytes)", session.id_token.len());
                    AuthStatus::Authenticated
                }
                Err(e) => {
                    if e.is_rejection() {
                        info!("{:?} rejected: {}", kind, e);
                    } else {
                        warn!("{:?} failed: {}", kind, e);
                    }
                    AuthStatus::Error(e.user_message())
                }
            };
            publish(&status, next);
        });
    }
}

fn publish(status: &watch::Sender<AuthStatus>, next: AuthStatus) {
    debug!("auth status -> {}", next);
    status.send_replace(next);
}
