//! Announcements as the current user sees them, and their administration.
//!
//! Every failure is reported through the [`Notifier`] before it is returned.

use ams_shared::announcement::handle::{
    AnnouncementDescriptor, Applicant, ListAnnouncementsQuery, MessageResult,
};
use tracing::info;

use crate::{raw, Announcement, Context, Error, Notifier, Role, SessionState};

const TITLE: &str = "Error";

/// Lists the announcements visible to the current user.
///
/// Students ask the backend to pre-filter by their department, and the
/// result is filtered again locally so a lenient backend cannot leak
/// announcements targeted at other departments.
pub async fn list(cx: &Context, notifier: &Notifier) -> Result<Vec<Announcement>, Error> {
    let state = cx.session_state();
    let user = state.user();

    let query = ListAnnouncementsQuery {
        department: user
            .filter(|user| user.role == Role::Student)
            .and_then(|user| user.department.clone()),
    };
    let mut announcements = raw::call(raw::announcement::List { query }, cx)
        .await
        .map_err(|err| fail(notifier, err, "Failed to load announcements"))?;

    if let Some(user) = user {
        announcements.retain(|a| a.visible_to(user));
    }
    Ok(announcements)
}

pub async fn get(cx: &Context, notifier: &Notifier, id: &str) -> Result<Announcement, Error> {
    raw::call(raw::announcement::Get { id }, cx)
        .await
        .map_err(|err| fail(notifier, err, "Failed to load announcement"))
}

pub async fn create(
    cx: &Context,
    notifier: &Notifier,
    descriptor: &AnnouncementDescriptor,
) -> Result<Announcement, Error> {
    let fallback = "Failed to create announcement";
    require_admin(cx).map_err(|err| fail(notifier, err, fallback))?;

    let announcement = raw::call(raw::announcement::Create { descriptor }, cx)
        .await
        .map_err(|err| fail(notifier, err, fallback))?;
    info!("created announcement {}", announcement.id);
    notifier.success("Success", "Announcement created");
    Ok(announcement)
}

pub async fn update(
    cx: &Context,
    notifier: &Notifier,
    id: &str,
    descriptor: &AnnouncementDescriptor,
) -> Result<MessageResult, Error> {
    let fallback = "Failed to update announcement";
    require_admin(cx).map_err(|err| fail(notifier, err, fallback))?;

    let res = raw::call(raw::announcement::Update { id, descriptor }, cx)
        .await
        .map_err(|err| fail(notifier, err, fallback))?;
    notifier.success("Success", "Announcement updated");
    Ok(res)
}

pub async fn delete(cx: &Context, notifier: &Notifier, id: &str) -> Result<MessageResult, Error> {
    let fallback = "Failed to delete announcement";
    require_admin(cx).map_err(|err| fail(notifier, err, fallback))?;

    let res = raw::call(raw::announcement::Delete { id }, cx)
        .await
        .map_err(|err| fail(notifier, err, fallback))?;
    info!("deleted announcement {id}");
    notifier.success("Success", "Announcement deleted");
    Ok(res)
}

/// The students who applied to a job announcement.
pub async fn applicants(
    cx: &Context,
    notifier: &Notifier,
    id: &str,
) -> Result<Vec<Applicant>, Error> {
    let fallback = "Failed to load applicants";
    require_admin(cx).map_err(|err| fail(notifier, err, fallback))?;

    raw::call(raw::announcement::Applicants { id }, cx)
        .await
        .map_err(|err| fail(notifier, err, fallback))
}

fn require_admin(cx: &Context) -> Result<(), Error> {
    match cx.session_state() {
        SessionState::Authenticated(user) => match user.role {
            Role::Admin => Ok(()),
            Role::Teacher | Role::Student => Err(Error::PermissionDenied),
        },
        SessionState::Loading | SessionState::Unauthenticated => Err(Error::NotLoggedIn),
    }
}

fn fail(notifier: &Notifier, err: Error, fallback: &str) -> Error {
    match err {
        Error::NotLoggedIn => notifier.error("Not logged in", "Please login to continue"),
        ref err => notifier.report(TITLE, err, fallback),
    };
    err
}
