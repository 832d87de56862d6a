use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Remote,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Remote => "remote",
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "full-time" | "fulltime" => Ok(JobType::FullTime),
            "part-time" | "parttime" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            "remote" => Ok(JobType::Remote),
            other => Err(format!("unknown job type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
}

/// Coarse seniority bucket used by the recommendation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
}

impl ExperienceLevel {
    /// Bucket for a number of years of experience: under 2 is entry, under 5 is mid.
    pub fn from_years(years: f32) -> Self {
        if years < 2.0 {
            ExperienceLevel::Entry
        } else if years < 5.0 {
            ExperienceLevel::Mid
        } else {
            ExperienceLevel::Senior
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", remote = "Self")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub location: String,
    #[serde(default)]
    pub salary_range: Option<SalaryRange>,
    pub job_type: JobType,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default)]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub application_count: u32,
    /// Owning recruiter's user id.
    #[serde(default)]
    pub recruiter: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

document_serde!(Job);

impl Job {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }

    /// Title, description and requirements joined for text matching.
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.title, self.description);
        for requirement in &self.requirements {
            text.push(' ');
            text.push_str(requirement);
        }
        text
    }
}

/// Create/update payload for a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

/// Query parameters for the public listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
}

impl JobQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        if let Some(location) = self.location.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("location".to_string(), location.to_string()));
        }
        if let Some(job_type) = self.job_type {
            pairs.push(("jobType".to_string(), job_type.as_str().to_string()));
        }
        pairs
    }
}
