//! An in-process stand-in for the REST backend.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use ams_client::{
    storage::{MemoryStorage, SessionStorage},
    ClientConfig, Context, Navigator, Notifier, SessionStore, View,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const STUDENT_TOKEN: &str = "token-student";
pub const ADMIN_TOKEN: &str = "token-admin";

/// A request the backend received.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// A multipart upload the backend received.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Default)]
pub struct Mock {
    pub hits: Mutex<Vec<Hit>>,
    pub uploads: Mutex<Vec<ReceivedFile>>,
    /// When set, every authenticated endpoint answers `401`.
    pub expired: AtomicBool,
    /// When set, applying fails with a server error.
    pub apply_fails: AtomicBool,
    /// When set, the applicant roster answers `403`.
    pub forbid_roster: AtomicBool,
    /// When set, the student directory fails with a server error.
    pub students_fail: AtomicBool,
    /// Bodies posted to `/tests/:id/marks`, with the test id.
    pub marks: Mutex<Vec<(String, Value)>>,
}

impl Mock {
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.hits
            .lock()
            .iter()
            .filter(|hit| hit.method == method && hit.path == path)
            .count()
    }

    pub fn last(&self, method: &str, path: &str) -> Option<Hit> {
        self.hits
            .lock()
            .iter()
            .rev()
            .find(|hit| hit.method == method && hit.path == path)
            .cloned()
    }

    pub fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }
}

pub fn student() -> Value {
    json!({
        "_id": "s1",
        "name": "Priya Nair",
        "email": "priya@college.edu",
        "role": "student",
        "department": "Civil",
        "rollNumber": "CE-21-014",
        "year": 3
    })
}

pub fn admin() -> Value {
    json!({
        "_id": "u1",
        "name": "Dean Rao",
        "email": "dean@college.edu",
        "role": "admin",
        "employeeId": "EMP-001"
    })
}

pub fn teacher() -> Value {
    json!({
        "_id": "t1",
        "name": "Anil Kumar",
        "email": "anil@college.edu",
        "role": "teacher",
        "department": "Mechanical",
        "employeeId": "EMP-042"
    })
}

fn announcements() -> Vec<Value> {
    vec![
        json!({
            "_id": "a1",
            "title": "Site engineer internship",
            "body": "Mechanical and electrical students only.",
            "type": "job",
            "isGlobal": false,
            "targetDepartments": ["Mechanical", "Electrical"],
            "createdBy": { "_id": "u1", "name": "Dean Rao" },
            "createdAt": "2026-09-01T10:00:00Z",
            "isActive": true
        }),
        json!({
            "_id": "a2",
            "title": "Graduate trainee program",
            "body": "Open to every department.",
            "type": "job",
            "isGlobal": true,
            "targetDepartments": [],
            "createdBy": "u1",
            "createdAt": "2026-09-02T10:00:00Z"
        }),
        json!({
            "_id": "a3",
            "title": "Library closed on Friday",
            "body": "Maintenance.",
            "type": "notice",
            "isGlobal": true,
            "createdAt": "2026-09-03T10:00:00Z"
        }),
        json!({
            "_id": "a4",
            "title": "Survey camp",
            "body": "Civil engineering field work.",
            "type": "general",
            "isGlobal": false,
            "targetDepartments": ["Civil"],
            "createdAt": "2026-09-04T10:00:00Z"
        }),
    ]
}

fn user_for(token: &str) -> Option<Value> {
    match token {
        STUDENT_TOKEN => Some(student()),
        ADMIN_TOKEN => Some(admin()),
        "token-teacher" => Some(teacher()),
        _ => None,
    }
}

fn bearer(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn record(State(mock): State<Arc<Mock>>, req: Request, next: Next) -> Response {
    let authorization = bearer(&req);
    mock.hits.lock().push(Hit {
        method: req.method().to_string(),
        path: req.uri().path().to_owned(),
        authorization: authorization.clone(),
    });

    let public = req.uri().path().starts_with("/api/auth/login")
        || req.uri().path().starts_with("/api/auth/register");
    if !public {
        let known = authorization
            .as_deref()
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(user_for)
            .is_some();

        if mock.expired.load(Ordering::SeqCst) || !known {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "Token expired" })),
            )
                .into_response();
        }
    }

    next.run(req).await
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let (token, user) = match (email, password) {
        ("priya@college.edu", "secret1") => (STUDENT_TOKEN, student()),
        ("dean@college.edu", "secret1") => (ADMIN_TOKEN, admin()),
        ("anil@college.edu", "secret1") => ("token-teacher", teacher()),
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "Invalid credentials" })),
            )
                .into_response()
        }
    };

    Json(json!({ "success": true, "token": token, "user": user })).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "priya@college.edu" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "User already exists" })),
        )
            .into_response();
    }

    let mut user = body.clone();
    user["_id"] = json!("s2");
    if let Some(user) = user.as_object_mut() {
        user.remove("password");
    }
    Json(json!({ "success": true, "token": STUDENT_TOKEN, "user": user })).into_response()
}

async fn verify(req: Request) -> Response {
    let user = bearer(&req)
        .as_deref()
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(user_for);
    Json(json!({ "success": true, "user": user })).into_response()
}

/// Answers every department, so the client has to filter by itself.
async fn list() -> Json<Value> {
    Json(json!({ "success": true, "announcements": announcements() }))
}

async fn create(Json(body): Json<Value>) -> Response {
    let mut announcement = body;
    announcement["_id"] = json!("a9");
    announcement["createdAt"] = json!("2026-10-01T08:00:00Z");
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "announcement": announcement })),
    )
        .into_response()
}

async fn find(Path(id): Path<String>) -> Response {
    let announcements = announcements();
    match announcements.into_iter().find(|a| a["_id"] == id.as_str()) {
        Some(announcement) => {
            Json(json!({ "success": true, "announcement": announcement })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Announcement not found" })),
        )
            .into_response(),
    }
}

async fn update(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "success": true, "message": format!("Announcement {id} updated") }))
}

async fn remove(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({ "success": true, "message": "Announcement deleted" }))
}

async fn upload_resume(
    State(mock): State<Arc<Mock>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let received = ReceivedFile {
            field: field.name().unwrap_or_default().to_owned(),
            file_name: field.file_name().map(str::to_owned),
            content_type: field.content_type().map(str::to_owned),
            size: 0,
        };
        let Ok(bytes) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        mock.uploads.lock().push(ReceivedFile {
            size: bytes.len(),
            ..received
        });
    }

    Json(json!({
        "success": true,
        "message": "Resume uploaded",
        "resume": format!("uploads/resumes/{id}-s1.pdf")
    }))
    .into_response()
}

async fn apply(State(mock): State<Arc<Mock>>) -> Response {
    if mock.apply_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Database unavailable" })),
        )
            .into_response();
    }
    Json(json!({
        "success": true,
        "message": "Application submitted successfully"
    }))
    .into_response()
}

async fn applicants(State(mock): State<Arc<Mock>>) -> Response {
    if mock.forbid_roster.load(Ordering::SeqCst) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "success": false, "message": "Roster access revoked" })),
        )
            .into_response();
    }

    Json(json!({
        "success": true,
        "applicants": [{
            "student": {
                "_id": "s1",
                "name": "Priya Nair",
                "email": "priya@college.edu",
                "department": "Civil",
                "rollNumber": "CE-21-014"
            },
            "resume": "uploads/resumes/a2-s1.pdf",
            "appliedAt": "2026-09-05T12:00:00Z"
        }]
    }))
    .into_response()
}

async fn create_test(Json(body): Json<Value>) -> Response {
    if body["subject"] == "Unknown" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Subject not offered" })),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Test created" })),
    )
        .into_response()
}

async fn students(State(mock): State<Arc<Mock>>, req: Request) -> Response {
    if mock.students_fail.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Directory unavailable" })),
        )
            .into_response();
    }
    if req.uri().query() != Some("limit=100") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    Json(json!({
        "success": true,
        "students": [
            { "_id": "s1", "name": "Priya Nair", "rollNumber": "CE-21-014" },
            { "_id": "s2", "name": "Rahul Menon", "rollNumber": "CE-21-027" },
            { "_id": "s3", "name": "Sara Thomas", "email": "sara@college.edu" }
        ]
    }))
    .into_response()
}

/// `graded` already holds marks; `missing` does not exist.
async fn test_marks(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "graded" => Json(json!({
            "success": true,
            "marks": [{
                "studentId": "s1",
                "marksObtained": 38,
                "remarks": "Good",
                "percentage": 76,
                "grade": "B+"
            }]
        }))
        .into_response(),
        "missing" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Test not found" })),
        )
            .into_response(),
        _ => Json(json!({ "success": true, "marks": [] })).into_response(),
    }
}

/// `locked` refuses with a `200` and `success: false`.
async fn submit_marks(
    State(mock): State<Arc<Mock>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if id == "locked" {
        return Json(json!({ "success": false, "message": "Marks are locked" })).into_response();
    }

    let processed = body["results"].as_array().map_or(0, Vec::len);
    mock.marks.lock().push((id, body));
    Json(json!({ "success": true, "processed": processed })).into_response()
}

pub fn router(mock: Arc<Mock>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/verify", get(verify))
        .route("/announcements", get(list).post(create))
        .route("/announcements/:id", get(find).put(update).delete(remove))
        .route("/announcements/:id/upload-resume", post(upload_resume))
        .route("/announcements/:id/apply", post(apply))
        .route("/announcements/:id/applicants", get(applicants))
        .route("/tests", post(create_test))
        .route("/tests/:id/marks", get(test_marks).post(submit_marks))
        .route("/students", get(students));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(mock.clone(), record))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .with_state(mock)
}

/// A running mock backend.
pub struct Backend {
    pub addr: SocketAddr,
    pub mock: Arc<Mock>,
}

impl Backend {
    pub async fn start() -> Self {
        let mock = Arc::new(Mock::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(mock.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, mock }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A fresh client talking to this backend with in-memory storage.
    pub fn client(&self) -> Client {
        self.client_with(Arc::new(MemoryStorage::new()))
    }

    pub fn client_with(&self, storage: Arc<dyn SessionStorage>) -> Client {
        let config = ClientConfig {
            api_url: self.api_url(),
            ..Default::default()
        };
        let cx = Context::new(&config, storage.clone(), Navigator::new(View::LANDING)).unwrap();

        Client {
            session: SessionStore::new(cx.clone()),
            cx,
            notifier: Notifier::new(),
            storage,
        }
    }
}

pub struct Client {
    pub cx: Context,
    pub session: SessionStore,
    pub notifier: Notifier,
    pub storage: Arc<dyn SessionStorage>,
}

impl Client {
    pub async fn login_as(&self, email: &str) {
        self.session.initialize().await;
        let outcome = self.session.login(email, "secret1").await.unwrap();
        assert!(matches!(outcome, ams_client::session::AuthOutcome::Success(_)));
    }

    /// Titles of the visible notifications, oldest first.
    pub fn titles(&self) -> Vec<String> {
        self.notifier
            .active()
            .into_iter()
            .map(|n| n.title)
            .collect()
    }
}
