mod common;

use std::sync::atomic::Ordering;

use ams_client::{announcement, exam, notify::Kind, Error};
use ams_shared::{
    announcement::{handle::AnnouncementDescriptor, AnnouncementType},
    exam::{TestDescriptor, TestType},
};
use common::Backend;

fn ids(announcements: &[ams_client::Announcement]) -> Vec<&str> {
    announcements.iter().map(|a| a.id.as_str()).collect()
}

/// Test: a Civil student does not see a job targeted at other departments.
#[tokio::test]
async fn students_see_their_departments_only() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.login_as("priya@college.edu").await;

    let list = announcement::list(&client.cx, &client.notifier)
        .await
        .unwrap();
    assert_eq!(ids(&list), ["a2", "a3", "a4"]);

    let hit = backend.mock.hits.lock().last().cloned().unwrap();
    assert_eq!(hit.path, "/api/announcements");
    assert_eq!(list[1].publisher_name(), "Admin");
}

#[tokio::test]
async fn staff_see_everything() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.login_as("anil@college.edu").await;

    let list = announcement::list(&client.cx, &client.notifier)
        .await
        .unwrap();
    assert_eq!(ids(&list), ["a1", "a2", "a3", "a4"]);
    assert_eq!(list[0].publisher_name(), "Dean Rao");
}

fn descriptor() -> AnnouncementDescriptor {
    AnnouncementDescriptor {
        title: "Campus placement drive".to_owned(),
        body: "Register by Friday.".to_owned(),
        kind: AnnouncementType::Job,
        is_global: false,
        target_departments: vec!["Computer Science".to_owned()],
    }
}

#[tokio::test]
async fn only_admins_manage_announcements() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.session.initialize().await;

    assert!(matches!(
        announcement::create(&client.cx, &client.notifier, &descriptor()).await,
        Err(Error::NotLoggedIn)
    ));
    assert_eq!(client.titles(), ["Not logged in"]);

    client.login_as("anil@college.edu").await;
    assert!(matches!(
        announcement::delete(&client.cx, &client.notifier, "a1").await,
        Err(Error::PermissionDenied)
    ));
    assert!(matches!(
        announcement::applicants(&client.cx, &client.notifier, "a2").await,
        Err(Error::PermissionDenied)
    ));
    assert_eq!(backend.mock.count("DELETE", "/api/announcements/a1"), 0);
    assert_eq!(
        client.titles(),
        ["Not logged in", "Permission denied", "Permission denied"]
    );

    client.session.logout().unwrap();
    client.login_as("dean@college.edu").await;

    let created = announcement::create(&client.cx, &client.notifier, &descriptor())
        .await
        .unwrap();
    assert_eq!(created.id, "a9");
    assert_eq!(created.kind, AnnouncementType::Job);
    assert!(created.is_active);

    let updated = announcement::update(&client.cx, &client.notifier, "a9", &descriptor())
        .await
        .unwrap();
    assert_eq!(updated.message.as_deref(), Some("Announcement a9 updated"));

    announcement::delete(&client.cx, &client.notifier, "a1")
        .await
        .unwrap();
    assert_eq!(backend.mock.count("DELETE", "/api/announcements/a1"), 1);

    let applicants = announcement::applicants(&client.cx, &client.notifier, "a2")
        .await
        .unwrap();
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0].student.name, "Priya Nair");
}

/// Test: a `403` from the backend becomes a titled notification.
#[tokio::test]
async fn forbidden_roster_is_reported() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.login_as("dean@college.edu").await;
    backend.mock.forbid_roster.store(true, Ordering::SeqCst);

    let err = announcement::applicants(&client.cx, &client.notifier, "a2")
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
    let shown = client.notifier.active();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].kind, Kind::Error);
    assert_eq!(shown[0].title, "Permission denied");
    assert_eq!(shown[0].message, "Roster access revoked");
    assert!(client.session.state().is_authenticated());
}

#[tokio::test]
async fn failed_listing_is_reported() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.login_as("priya@college.edu").await;

    let err = announcement::get(&client.cx, &client.notifier, "gone")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert_eq!(client.titles(), ["Error"]);
    assert_eq!(client.notifier.active()[0].message, "Announcement not found");
}

/// Test: ids are sent as a single escaped path segment.
#[tokio::test]
async fn ids_cannot_reach_other_endpoints() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.login_as("priya@college.edu").await;

    let err = announcement::get(&client.cx, &client.notifier, "a2/apply")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert_eq!(
        backend.mock.hits.lock().last().unwrap().path,
        "/api/announcements/a2%2Fapply"
    );
    assert_eq!(backend.mock.count("POST", "/api/announcements/a2/apply"), 0);
}

fn test_descriptor() -> TestDescriptor {
    TestDescriptor {
        title: " Unit test 2 ".to_owned(),
        subject: "Structural Analysis".to_owned(),
        test_type: TestType::Quiz,
        max_marks: 50,
        passing_marks: 20,
        test_date: chrono::NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
        exam_time: "10:00".to_owned(),
        duration: 60,
        venue: "Hall B".to_owned(),
        instructions: String::new(),
        syllabus: "Beams and trusses".to_owned(),
    }
}

#[tokio::test]
async fn test_creation_reports_outcome() {
    let backend = Backend::start().await;
    let client = backend.client();
    client.login_as("anil@college.edu").await;

    let mut invalid = test_descriptor();
    invalid.passing_marks = 50;
    let err = exam::create_test(&client.cx, &client.notifier, invalid)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(backend.mock.count("POST", "/api/tests"), 0);

    exam::create_test(&client.cx, &client.notifier, test_descriptor())
        .await
        .unwrap();

    let mut unknown = test_descriptor();
    unknown.subject = "Unknown".to_owned();
    assert!(exam::create_test(&client.cx, &client.notifier, unknown)
        .await
        .is_err());

    let active = client.notifier.active();
    assert_eq!(
        active
            .iter()
            .map(|n| (n.kind, n.title.as_str(), n.message.as_str()))
            .collect::<Vec<_>>(),
        [
            (
                Kind::Error,
                "Validation Error",
                "Passing marks must be less than maximum marks"
            ),
            (Kind::Success, "Success", "Test created successfully"),
            (Kind::Error, "Error", "Subject not offered"),
        ]
    );
}
