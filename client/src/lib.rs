//! Client side of the academic management system: talks to the REST
//! backend and keeps the session, navigation and notification state a
//! frontend renders from.

pub mod announcement;
pub mod apply;
pub mod config;
pub mod exam;
pub mod form;
pub mod guard;
pub mod navigation;
pub mod notify;
pub mod raw;
pub mod session;
pub mod storage;

use std::{fmt::Write, sync::Arc};

use ams_shared::account::User;
use reqwest::StatusCode;
use tokio::sync::watch;
use tracing::{error, warn};

pub use ams_shared::{account::Role, announcement::Announcement};
pub use config::ClientConfig;
pub use navigation::{Navigator, View};
pub use notify::Notifier;
pub use session::{SessionState, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Response(ResponseError),
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(reqwest::Error),

    #[error("invalid email address: {0}")]
    EmailAddress(ams_shared::account::AddressError),
    #[error("registration form invalid: {0}")]
    Registration(form::FieldErrors),
    #[error("test invalid: {0}")]
    TestValidation(ams_shared::exam::TestValidationErrors),
    #[error("{0}")]
    MarksValidation(ams_shared::exam::MarksValidationError),
    #[error("unsupported file type {0}")]
    UnsupportedFile(String),
    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("not logged in")]
    NotLoggedIn,
    #[error("permission denied")]
    PermissionDenied,
    #[error("announcement does not accept applications")]
    NotEligible,
    #[error("application flow: {0}")]
    FlowState(&'static str),

    #[error("session storage: {0}")]
    Storage(storage::Error),
    #[error("io error: {0}")]
    Io(std::io::Error),
    #[error("config error: {0}")]
    Config(toml::de::Error),
    #[error("invalid api url: {0}")]
    ApiUrl(url::ParseError),
}

impl Error {
    /// The HTTP status of a rejected request, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Response(err) => Some(err.status),
            _ => None,
        }
    }

    /// The message the server sent along with a rejection.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Response(err) => err.message.as_deref(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether the action was refused for the current role, locally or
    /// by the backend.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::PermissionDenied) || self.status() == Some(StatusCode::FORBIDDEN)
    }

    /// Whether this error was raised locally without reaching the network.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmailAddress(_)
                | Error::Registration(_)
                | Error::TestValidation(_)
                | Error::MarksValidation(_)
                | Error::UnsupportedFile(_)
                | Error::FileTooLarge(_)
        )
    }
}

/// A non-success response from the backend.
#[derive(Debug)]
pub struct ResponseError {
    pub status: StatusCode,
    pub message: Option<String>,
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status.as_str())?;

        if let Some(msg) = self.status.canonical_reason() {
            f.write_char(' ')?;
            f.write_str(msg)?;
        }

        if let Some(ref msg) = self.message {
            f.write_str(": ")?;
            f.write_str(msg)?;
        }

        Ok(())
    }
}

/// Implements `From<T>` for [`Error`].
macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for $crate::Error {
                #[inline]
                fn from(err: $t) -> Self {
                    Self::$v(err)
                }
            }
        )*
    };
}

impl_from! {
    ResponseError => Response,
    reqwest::Error => Transport,
    ams_shared::account::AddressError => EmailAddress,
    form::FieldErrors => Registration,
    ams_shared::exam::TestValidationErrors => TestValidation,
    ams_shared::exam::MarksValidationError => MarksValidation,
    storage::Error => Storage,
    std::io::Error => Io,
    toml::de::Error => Config,
    url::ParseError => ApiUrl,
}

/// The connection to the backend, shared by every component.
///
/// Owns the persisted session and the observable session state so the
/// request layer can tear the session down on any `401`.
#[derive(Clone)]
pub struct Context {
    req_client: reqwest::Client,
    base_url: url::Url,
    storage: Arc<dyn storage::SessionStorage>,
    state: Arc<watch::Sender<SessionState>>,
    navigator: Navigator,
}

impl Context {
    /// Creates a context in the loading state.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn storage::SessionStorage>,
        navigator: Navigator,
    ) -> Result<Self, Error> {
        let base_url = url::Url::parse(&config.api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        Ok(Self {
            req_client: reqwest::Client::builder()
                .timeout(config.timeout())
                .build()?,
            base_url,
            storage,
            state: Arc::new(watch::channel(SessionState::Loading).0),
            navigator,
        })
    }

    #[inline]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[inline]
    pub fn session_state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The persisted bearer token, read from storage on every call.
    ///
    /// Never returned once the session has ended, even if the persisted
    /// record could not be removed.
    pub fn token(&self) -> Option<String> {
        if *self.state.borrow() == SessionState::Unauthenticated {
            return None;
        }

        match self.storage.get() {
            Ok(session) => session.map(|s| s.token),
            Err(err) => {
                warn!("unable to read persisted session: {err}");
                None
            }
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub(crate) fn stored_session(&self) -> Result<Option<storage::StoredSession>, Error> {
        Ok(self.storage.get()?)
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Persists the token together with the user, then marks the
    /// session authenticated.
    pub(crate) fn establish(&self, token: String, user: User) -> Result<(), Error> {
        self.storage.set(&storage::StoredSession {
            token,
            user: user.clone(),
        })?;
        self.set_state(SessionState::Authenticated(user));
        Ok(())
    }

    /// Clears the in-memory session and the persisted pair.
    ///
    /// The session ends even if the record cannot be removed; the error is
    /// returned so the caller can surface it.
    pub(crate) fn end_session(&self) -> Result<(), Error> {
        self.set_state(SessionState::Unauthenticated);
        self.storage.clear().map_err(|err| {
            error!("failed to clear persisted session: {err}");
            err.into()
        })
    }

    /// Tears the session down after the backend rejected our credentials.
    pub(crate) fn expire_session(&self) {
        warn!("session rejected by backend, logging out");
        let _ = self.end_session();
        self.navigator.navigate(View::ENTRY);
    }
}
