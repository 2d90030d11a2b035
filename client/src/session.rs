//! The session store: who is logged in, restored from storage at startup.

use std::sync::Arc;

use ams_shared::account::{
    handle::{AuthResult, LoginDescriptor},
    Role, User,
};
use tokio::sync::{watch, OnceCell};
use tracing::{info, warn};

use crate::{form::RegistrationForm, raw, Context, Error, View};

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The persisted session is being verified.
    Loading,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    #[inline]
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[inline]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Outcome of a login or registration that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(User),
    /// Rejected, with a reason to show the user.
    Failure(String),
}

/// The single source of truth for the current session.
///
/// Clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    cx: Context,
    init: Arc<OnceCell<()>>,
}

impl SessionStore {
    pub fn new(cx: Context) -> Self {
        Self {
            cx,
            init: Arc::new(OnceCell::new()),
        }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.cx
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.cx.session_state()
    }

    /// Watches session state changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.cx.subscribe()
    }

    /// Restores the persisted session, verifying its token with the backend.
    ///
    /// Only the first call does any work; later calls wait for it and return.
    pub async fn initialize(&self) {
        self.init.get_or_init(|| self.restore()).await;
    }

    async fn restore(&self) {
        let persisted = match self.cx.stored_session() {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!("discarding unreadable session: {err}");
                let _ = self.cx.end_session();
                return;
            }
        };

        let Some(persisted) = persisted else {
            self.cx.set_state(SessionState::Unauthenticated);
            return;
        };

        match raw::call(raw::auth::Verify, &self.cx).await {
            Ok(AuthResult {
                success: true,
                user: Some(user),
                ..
            }) => {
                info!("restored session of {}", user.email);
                if let Err(err) = self.cx.establish(persisted.token, user) {
                    warn!("failed to persist verified session: {err}");
                    let _ = self.cx.end_session();
                }
            }
            Ok(_) => {
                warn!("persisted token rejected");
                let _ = self.cx.end_session();
            }
            Err(err) => {
                warn!("token verification failed: {err}");
                let _ = self.cx.end_session();
            }
        }
    }

    /// Logs in with email and password.
    ///
    /// Rejections by the backend come back as [`AuthOutcome::Failure`]
    /// without touching the session; transport faults are returned as errors.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, Error> {
        let descriptor = LoginDescriptor {
            email: email.trim().to_lowercase().parse()?,
            password: password.to_owned(),
        };

        let result = raw::call(raw::auth::Login { descriptor }, &self.cx).await;
        self.settle(result, "Login failed")
    }

    /// Registers a new account after validating the form locally.
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthOutcome, Error> {
        let descriptor = form.validate()?;
        let result = raw::call(raw::auth::Register { descriptor }, &self.cx).await;
        self.settle(result, "Registration failed")
    }

    fn settle(
        &self,
        result: Result<AuthResult, Error>,
        fallback: &str,
    ) -> Result<AuthOutcome, Error> {
        match result {
            Ok(AuthResult {
                success: true,
                user: Some(user),
                token: Some(token),
                ..
            }) => {
                self.cx.establish(token, user.clone())?;
                info!("logged in as {} ({})", user.email, user.role);
                Ok(AuthOutcome::Success(user))
            }
            Ok(res) => Ok(AuthOutcome::Failure(
                res.message.unwrap_or_else(|| fallback.to_owned()),
            )),
            Err(Error::Transport(err)) => Err(Error::Transport(err)),
            Err(err) => Ok(AuthOutcome::Failure(
                err.server_message().unwrap_or(fallback).to_owned(),
            )),
        }
    }

    /// Ends the session and returns to the entry view.
    ///
    /// The session is ended even when the persisted record cannot be
    /// removed; that failure is returned so it can be shown.
    pub fn logout(&self) -> Result<(), Error> {
        let cleared = self.cx.end_session();
        self.cx.navigator().navigate(View::ENTRY);
        info!("logged out");
        cleared
    }

    /// Applies a local profile edit and persists it with the current token.
    pub fn update_user<F>(&self, edit: F) -> Result<User, Error>
    where
        F: FnOnce(&mut User),
    {
        let SessionState::Authenticated(mut user) = self.state() else {
            return Err(Error::NotLoggedIn);
        };
        let token = self
            .cx
            .stored_session()?
            .map(|s| s.token)
            .ok_or(Error::NotLoggedIn)?;

        edit(&mut user);
        self.cx.establish(token, user.clone())?;
        Ok(user)
    }
}
