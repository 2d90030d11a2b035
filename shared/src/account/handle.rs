use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginDescriptor {
    pub email: lettre::Address,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDescriptor {
    pub name: String,
    pub email: lettre::Address,
    pub password: String,
    pub role: super::Role,
    /// Required if and only if the role is student.
    #[serde(flatten)]
    pub student: Option<StudentProfile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub roll_number: String,
    pub department: String,
    pub year: u8,
}

/// Response envelope of login, register and token verification.
///
/// Verification responses carry no token.
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResult {
    pub success: bool,
    #[serde(default)]
    pub user: Option<super::User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
