use crate::models::{Job, JobType};

/// Client-side narrowing of an already fetched listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    /// Case-insensitive substring of title, description or company.
    pub query: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub open_only: bool,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if self.open_only && !job.is_open() {
            return false;
        }
        if self.job_type.is_some_and(|t| t != job.job_type) {
            return false;
        }
        if let Some(location) = non_blank(&self.location) {
            if !contains_ignore_case(&job.location, location) {
                return false;
            }
        }
        if let Some(query) = non_blank(&self.query) {
            let company = job.company.as_deref().unwrap_or_default();
            return contains_ignore_case(&job.title, query)
                || contains_ignore_case(&job.description, query)
                || contains_ignore_case(company, query);
        }
        true
    }

    /// Matching jobs in their original order.
    pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.matches(job)).collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
