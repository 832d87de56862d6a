use serde::{Deserialize, Serialize};

use super::user::VerificationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub years: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub year: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl JobSeekerProfile {
    pub fn total_experience_years(&self) -> f32 {
        self.experience.iter().map(|e| e.years.max(0.0)).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterProfile {
    pub company: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub verification_documents: Vec<String>,
    /// The account's current verification, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
}

/// Per-role extension of a user.
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    JobSeeker(JobSeekerProfile),
    Recruiter(RecruiterProfile),
}

impl Profile {
    pub fn as_job_seeker(&self) -> Option<&JobSeekerProfile> {
        match self {
            Profile::JobSeeker(profile) => Some(profile),
            Profile::Recruiter(_) => None,
        }
    }

    pub fn as_recruiter(&self) -> Option<&RecruiterProfile> {
        match self {
            Profile::Recruiter(profile) => Some(profile),
            Profile::JobSeeker(_) => None,
        }
    }
}

/// Partial update for a job-seeker profile; `None` fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSeekerProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<WorkExperience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
}
