use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. A user has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "jobseeker")]
    JobSeeker,
    #[serde(rename = "recruiter")]
    Recruiter,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::JobSeeker => "jobseeker",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jobseeker" | "job-seeker" | "seeker" => Ok(Role::JobSeeker),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Recruiter account state gating job and application management.
///
/// Authoritative only on the server; the client uses it to hide actions early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", remote = "Self")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

document_serde!(User);

impl User {
    pub fn is_recruiter(&self) -> bool {
        self.role == Role::Recruiter
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Recruiters may only manage postings and applications once verified.
    pub fn can_manage_postings(&self) -> bool {
        self.is_recruiter() && self.verification_status == Some(VerificationStatus::Verified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Recruiters sign up with a company; job seekers leave it empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// `{user, token}` returned by login and signup, and persisted for session restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}
