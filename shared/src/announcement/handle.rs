use serde::{Deserialize, Serialize};

use super::{Announcement, AnnouncementType};

/// Payload for creating or editing an announcement.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementDescriptor {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementType,
    pub is_global: bool,
    pub target_departments: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ListAnnouncementsQuery {
    /// Set for students so the backend can pre-filter by department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ListAnnouncementsResult {
    #[serde(default)]
    pub announcements: Vec<Announcement>,
}

/// Result of fetching a single announcement, which the backend
/// may send either wrapped or bare.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum GetAnnouncementResult {
    Wrapped { announcement: Announcement },
    Bare(Announcement),
}

impl GetAnnouncementResult {
    #[inline]
    pub fn into_inner(self) -> Announcement {
        match self {
            GetAnnouncementResult::Wrapped { announcement } => announcement,
            GetAnnouncementResult::Bare(announcement) => announcement,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateAnnouncementResult {
    pub announcement: Announcement,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UploadResumeResult {
    #[serde(default)]
    pub message: Option<String>,
    /// Server-side reference of the stored resume.
    #[serde(default)]
    pub resume: Option<String>,
}

/// Generic `{ success, message }` envelope.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MessageResult {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApplicantsResult {
    #[serde(default)]
    pub applicants: Vec<Applicant>,
}

/// A student who applied to a job announcement.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub student: ApplicantStudent,
    #[serde(default)]
    pub resume: Option<String>,
    pub applied_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantStudent {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
}
