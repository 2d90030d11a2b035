//! Views of the frontend and the navigator holding the current one.

use std::sync::Arc;

use ams_shared::account::Role;
use tokio::sync::watch;
use tracing::debug;

use crate::{guard, SessionState};

/// A view the frontend can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Signup,
    Dashboard,
    Tests,
    Admin,
    Students,
    Performance,
    AptitudePrep,
    Announcements,
    AnnouncementApplicants,
    JobsApplicants,
}

/// Who may render a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only rendered for visitors who are not logged in.
    PublicOnly,
    /// Requires a session whose role is in the set.
    /// An empty set admits any role.
    Protected(&'static [Role]),
}

const STAFF: &[Role] = &[Role::Admin, Role::Teacher];
const EVERYONE: &[Role] = &[Role::Admin, Role::Teacher, Role::Student];

impl View {
    /// The unauthenticated entry view.
    pub const ENTRY: View = View::Login;
    /// The default view after logging in.
    pub const LANDING: View = View::Dashboard;

    pub const ALL: [View; 11] = [
        View::Login,
        View::Signup,
        View::Dashboard,
        View::Tests,
        View::Admin,
        View::Students,
        View::Performance,
        View::AptitudePrep,
        View::Announcements,
        View::AnnouncementApplicants,
        View::JobsApplicants,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Signup => "/signup",
            View::Dashboard => "/dashboard",
            View::Tests => "/tests",
            View::Admin => "/admin",
            View::Students => "/students",
            View::Performance => "/performance",
            View::AptitudePrep => "/aptitude-prep",
            View::Announcements => "/announcements",
            View::AnnouncementApplicants => "/announcements/applicants",
            View::JobsApplicants => "/admin/jobs-applicants",
        }
    }

    pub fn access(&self) -> Access {
        match self {
            View::Login | View::Signup => Access::PublicOnly,
            View::Dashboard | View::Tests => Access::Protected(&[]),
            View::Admin | View::AnnouncementApplicants | View::JobsApplicants => {
                Access::Protected(&[Role::Admin])
            }
            View::Students => Access::Protected(STAFF),
            View::Performance | View::AptitudePrep | View::Announcements => {
                Access::Protected(EVERYONE)
            }
        }
    }

    /// Resolves a path, ignoring any query string. The root path resolves
    /// to the landing view; unknown paths resolve to `None`.
    pub fn from_path(path: &str) -> Option<View> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        let path = match path.trim_end_matches('/') {
            "" => return Some(View::LANDING),
            path => path,
        };

        View::ALL.into_iter().find(|view| view.path() == path)
    }
}

/// Holds the current view. Every redirect goes through here.
#[derive(Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<View>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(View::LANDING)
    }
}

impl Navigator {
    pub fn new(initial: View) -> Self {
        Self {
            current: Arc::new(watch::channel(initial).0),
        }
    }

    #[inline]
    pub fn current(&self) -> View {
        *self.current.borrow()
    }

    pub fn navigate(&self, view: View) {
        debug!("navigating to {}", view.path());
        self.current.send_replace(view);
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.current.subscribe()
    }

    /// Requests a view and applies the guard's decision.
    ///
    /// Nothing changes while the session is loading.
    pub fn open(&self, view: View, state: &SessionState) -> guard::Decision {
        let decision = guard::decide(state, view);
        match decision {
            guard::Decision::Loading => {}
            guard::Decision::Authorized(view) | guard::Decision::Redirect(view) => {
                self.navigate(view)
            }
        }
        decision
    }
}
