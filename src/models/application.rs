use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::job::Job;

/// Lifecycle of an application, independent of the job's own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", remote = "Self")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    pub job_id: String,
    /// Embedded copy of the job, when the server populates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    /// Applicant's user id.
    #[serde(default)]
    pub applicant: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    /// Resume reference (URL or storage key).
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

document_serde!(Application);

impl Application {
    /// Only applications still in `applied` may be withdrawn by the applicant.
    pub fn can_withdraw(&self) -> bool {
        self.status == ApplicationStatus::Applied
    }
}

/// Payload submitted when applying to a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}
