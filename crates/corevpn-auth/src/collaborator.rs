//! The authenticated-session collaborator trait and an in-memory reference implementation.
//!
//! This core depends only on the shape below; the interactive login/2FA
//! flow, the real transport, and token refresh live behind whatever
//! concrete session type a caller injects. A minimal in-memory
//! implementation is provided for tests and as a reference default,
//! simulating a single registered user/password and an optional 2FA code
//! without ever touching the network.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Capabilities an authenticated session must provide to the session core.
///
/// Every remote call routes through `async_request`; the fetcher never
/// constructs its own transport client.
#[async_trait]
pub trait AuthenticatedSession: Send + Sync {
    /// Attempt username/password authentication.
    ///
    /// Returns `true` if the credentials were accepted, regardless of
    /// whether a 2FA step now follows (check `needs_twofa` afterward).
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool>;

    /// Submit a 2FA code for a session that is pending one.
    async fn provide_2fa(&self, code: &str) -> Result<bool>;

    /// Clear all session state.
    async fn logout(&self) -> Result<bool>;

    /// Whether a 2FA code is currently required to complete authentication.
    fn needs_twofa(&self) -> bool;

    /// Whether the session is fully authenticated (no pending 2FA).
    fn authenticated(&self) -> bool;

    /// Issue a request against `route`, returning the parsed JSON body.
    ///
    /// `no_condition_check` mirrors the wire protocol's escape hatch for
    /// calls made while the caller already holds the request lock.
    async fn async_request(
        &self,
        route: &str,
        json_body: Option<Value>,
        no_condition_check: bool,
    ) -> Result<Value>;

    /// Acquire the session's internal request lock.
    async fn requests_lock(&self, no_condition_check: bool);

    /// Release the session's internal request lock.
    async fn requests_unlock(&self, no_condition_check: bool);

    /// Opaque serialization hook, read around keyring persistence.
    fn get_state(&self) -> Value;

    /// Opaque serialization hook, to restore previously persisted state.
    fn set_state(&self, state: Value);
}

#[derive(Debug, Clone)]
enum RouteOutcome {
    Success(Value),
    Error(AuthError),
}

struct SessionState {
    authenticated: bool,
    needs_twofa: bool,
    opaque_state: Value,
}

/// An in-memory `AuthenticatedSession` simulating a single registered
/// user/password pair and an optional 2FA code. Never touches the network;
/// intended for tests and as the reference default collaborator.
pub struct InMemoryAuthSession {
    username: String,
    password: String,
    twofa_code: Option<String>,
    state: parking_lot::Mutex<SessionState>,
    request_lock: Arc<tokio::sync::Mutex<()>>,
    held_guard: parking_lot::Mutex<Option<tokio::sync::OwnedMutexGuard<()>>>,
    routes: parking_lot::Mutex<HashMap<String, RouteOutcome>>,
}

impl InMemoryAuthSession {
    /// Register the one valid username/password pair this session will accept.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            twofa_code: None,
            state: parking_lot::Mutex::new(SessionState {
                authenticated: false,
                needs_twofa: false,
                opaque_state: Value::Null,
            }),
            request_lock: Arc::new(tokio::sync::Mutex::new(())),
            held_guard: parking_lot::Mutex::new(None),
            routes: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// Require `code` as a second factor after a successful password check.
    pub fn with_twofa(mut self, code: impl Into<String>) -> Self {
        self.twofa_code = Some(code.into());
        self
    }

    /// Register the canned JSON body `async_request` should return for `route`.
    pub fn set_response(&self, route: impl Into<String>, body: Value) {
        self.routes.lock().insert(route.into(), RouteOutcome::Success(body));
    }

    /// Register the error `async_request` should return for `route`.
    pub fn set_error(&self, route: impl Into<String>, error: AuthError) {
        self.routes.lock().insert(route.into(), RouteOutcome::Error(error));
    }
}

#[async_trait]
impl AuthenticatedSession for InMemoryAuthSession {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let mut state = self.state.lock();
        if username != self.username || password != self.password {
            state.authenticated = false;
            state.needs_twofa = false;
            tracing::warn!(username, "authentication rejected");
            return Ok(false);
        }
        if self.twofa_code.is_some() {
            state.authenticated = false;
            state.needs_twofa = true;
            tracing::info!(username, "password accepted, awaiting 2FA");
        } else {
            state.authenticated = true;
            state.needs_twofa = false;
            tracing::info!(username, "authenticated");
        }
        Ok(true)
    }

    async fn provide_2fa(&self, code: &str) -> Result<bool> {
        let mut state = self.state.lock();
        if !state.needs_twofa {
            return Ok(false);
        }
        if self.twofa_code.as_deref() == Some(code) {
            state.authenticated = true;
            state.needs_twofa = false;
            Ok(true)
        } else {
            Err(AuthError::InvalidTwoFactorCode)
        }
    }

    async fn logout(&self) -> Result<bool> {
        let mut state = self.state.lock();
        state.authenticated = false;
        state.needs_twofa = false;
        tracing::info!("logged out");
        Ok(true)
    }

    fn needs_twofa(&self) -> bool {
        self.state.lock().needs_twofa
    }

    fn authenticated(&self) -> bool {
        self.state.lock().authenticated
    }

    async fn async_request(
        &self,
        route: &str,
        _json_body: Option<Value>,
        _no_condition_check: bool,
    ) -> Result<Value> {
        if !self.authenticated() {
            return Err(AuthError::AuthenticationNeeded);
        }
        match self.routes.lock().get(route) {
            Some(RouteOutcome::Success(body)) => Ok(body.clone()),
            Some(RouteOutcome::Error(err)) => Err(err.clone()),
            None => Err(AuthError::ApiError {
                status: 404,
                message: format!("no canned response registered for route {route}"),
            }),
        }
    }

    async fn requests_lock(&self, _no_condition_check: bool) {
        let guard = self.request_lock.clone().lock_owned().await;
        *self.held_guard.lock() = Some(guard);
    }

    async fn requests_unlock(&self, _no_condition_check: bool) {
        self.held_guard.lock().take();
    }

    fn get_state(&self) -> Value {
        self.state.lock().opaque_state.clone()
    }

    fn set_state(&self, state: Value) {
        self.state.lock().opaque_state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn authenticates_without_twofa() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2");
        assert!(session.authenticate("jdoe", "hunter2").await.unwrap());
        assert!(!session.needs_twofa());
        assert!(session.authenticated());
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2");
        assert!(!session.authenticate("jdoe", "wrong").await.unwrap());
        assert!(!session.authenticated());
    }

    #[tokio::test]
    async fn requires_twofa_before_authenticated() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2").with_twofa("123456");
        assert!(session.authenticate("jdoe", "hunter2").await.unwrap());
        assert!(session.needs_twofa());
        assert!(!session.authenticated());

        assert!(session.provide_2fa("123456").await.unwrap());
        assert!(!session.needs_twofa());
        assert!(session.authenticated());
    }

    #[tokio::test]
    async fn wrong_twofa_code_is_rejected() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2").with_twofa("123456");
        session.authenticate("jdoe", "hunter2").await.unwrap();
        assert!(session.provide_2fa("000000").await.is_err());
        assert!(!session.authenticated());
    }

    #[tokio::test]
    async fn logout_clears_state() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2");
        session.authenticate("jdoe", "hunter2").await.unwrap();
        session.logout().await.unwrap();
        assert!(!session.authenticated());
    }

    #[tokio::test]
    async fn async_request_requires_authentication() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2");
        session.set_response("/vpn", json!({"ok": true}));
        let err = session.async_request("/vpn", None, false).await.unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationNeeded));
    }

    #[tokio::test]
    async fn async_request_returns_canned_body() {
        let session = InMemoryAuthSession::new("jdoe", "hunter2");
        session.authenticate("jdoe", "hunter2").await.unwrap();
        session.set_response("/vpn", json!({"ok": true}));
        let body = session.async_request("/vpn", None, false).await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn request_lock_serializes_access() {
        let session = Arc::new(InMemoryAuthSession::new("jdoe", "hunter2"));
        session.requests_lock(false).await;
        session.requests_unlock(false).await;
        // Re-acquiring after release must not deadlock.
        session.requests_lock(false).await;
        session.requests_unlock(false).await;
    }
}
