use indexmap::IndexMap;

use crate::models::{Application, ApplicationStatus, Job};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-status counts over a list of applications.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationStats {
    pub total: usize,
    /// Every status is present, in lifecycle order, even with a zero count.
    pub by_status: IndexMap<ApplicationStatus, usize>,
}

impl ApplicationStats {
    pub fn from_applications(applications: &[Application]) -> Self {
        let mut by_status: IndexMap<ApplicationStatus, usize> =
            ApplicationStatus::ALL.iter().map(|status| (*status, 0)).collect();
        for application in applications {
            *by_status.entry(application.status).or_insert(0) += 1;
        }

        Self { total: applications.len(), by_status }
    }

    pub fn count(&self, status: ApplicationStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Share of applications in `status`, in percent with one decimal. Zero when empty.
    pub fn percentage(&self, status: ApplicationStatus) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round1(self.count(status) as f64 * 100.0 / self.total as f64)
    }

    /// Accepted out of decided (accepted or rejected) applications, in percent.
    pub fn acceptance_rate(&self) -> f64 {
        let accepted = self.count(ApplicationStatus::Accepted);
        let decided = accepted + self.count(ApplicationStatus::Rejected);
        if decided == 0 {
            return 0.0;
        }
        round1(accepted as f64 * 100.0 / decided as f64)
    }
}

/// Totals shown on a recruiter's overview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecruiterDashboard {
    pub total_jobs: usize,
    pub open_jobs: usize,
    pub closed_jobs: usize,
    pub total_applications: u64,
    pub most_applied: Option<String>,
}

impl RecruiterDashboard {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let open_jobs = jobs.iter().filter(|job| job.is_open()).count();
        let most_applied = jobs
            .iter()
            .filter(|job| job.application_count > 0)
            .max_by_key(|job| job.application_count)
            .map(|job| job.title.clone());

        Self {
            total_jobs: jobs.len(),
            open_jobs,
            closed_jobs: jobs.len() - open_jobs,
            total_applications: jobs.iter().map(|job| u64::from(job.application_count)).sum(),
            most_applied,
        }
    }

    pub fn average_applications(&self) -> f64 {
        if self.total_jobs == 0 {
            return 0.0;
        }
        round1(self.total_applications as f64 / self.total_jobs as f64)
    }
}
