pub mod handle;

use serde::{Deserialize, Serialize};

use crate::account::{Role, User};

/// Describes the kind of an announcement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    #[default]
    General,
    /// Job openings, the only kind students may apply to.
    Job,
    Notice,
}

impl AnnouncementType {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::General => "general",
            AnnouncementType::Job => "job",
            AnnouncementType::Notice => "notice",
        }
    }
}

/// Represents an announcement posted by an admin.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(rename = "type", default)]
    pub kind: AnnouncementType,
    /// Whether this announcement targets every department.
    #[serde(default = "default_true")]
    pub is_global: bool,
    /// Departments this announcement targets if it is not global.
    #[serde(default)]
    pub target_departments: Vec<String>,
    #[serde(default)]
    pub created_by: Option<Publisher>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// The publisher of an announcement, either populated or as a bare account id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Publisher {
    Account {
        #[serde(alias = "_id")]
        id: String,
        name: String,
    },
    Id(String),
}

impl Announcement {
    /// Indicates whether the given user may see this announcement in listings.
    ///
    /// Admins and teachers see everything. Students see global announcements
    /// and the ones targeting their department.
    pub fn visible_to(&self, user: &User) -> bool {
        match user.role {
            Role::Admin | Role::Teacher => true,
            Role::Student => {
                self.is_global
                    || user
                        .department
                        .as_ref()
                        .is_some_and(|dept| self.target_departments.contains(dept))
            }
        }
    }

    #[inline]
    pub fn accepts_applications(&self) -> bool {
        self.kind == AnnouncementType::Job
    }

    pub fn publisher_name(&self) -> &str {
        match self.created_by {
            Some(Publisher::Account { ref name, .. }) => name,
            _ => "Admin",
        }
    }
}

#[inline]
fn default_true() -> bool {
    true
}
