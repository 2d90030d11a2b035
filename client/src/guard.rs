//! Decides whether the current session may render a view.
//!
//! The guard is a pure function of the session state, the requested view
//! and its role requirement. Nothing is cached between calls.

use ams_shared::account::Role;

use crate::{navigation::Access, SessionState, View};

/// Outcome of guarding a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The session is still being restored, render a blocking wait state.
    Loading,
    Authorized(View),
    Redirect(View),
}

/// Guards a view according to its [`Access`].
pub fn decide(state: &SessionState, view: View) -> Decision {
    match view.access() {
        Access::PublicOnly => public_only(state, view),
        Access::Protected(roles) => protected(state, roles, view),
    }
}

/// Guard for views requiring a session, optionally restricted to `roles`.
pub fn protected(state: &SessionState, roles: &[Role], view: View) -> Decision {
    match state {
        SessionState::Loading => Decision::Loading,
        SessionState::Unauthenticated => Decision::Redirect(View::ENTRY),
        SessionState::Authenticated(user) if !roles.is_empty() && !roles.contains(&user.role) => {
            Decision::Redirect(View::LANDING)
        }
        SessionState::Authenticated(_) => Decision::Authorized(view),
    }
}

/// Guard for views only meant for visitors who are not logged in.
pub fn public_only(state: &SessionState, view: View) -> Decision {
    match state {
        SessionState::Loading => Decision::Loading,
        SessionState::Authenticated(_) => Decision::Redirect(View::LANDING),
        SessionState::Unauthenticated => Decision::Authorized(view),
    }
}
