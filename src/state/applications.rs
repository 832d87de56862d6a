use super::resource::{Reducer, SliceStatus, remove_by_id, replace_by_id};
use crate::models::Application;

pub const FENCE_MINE: &str = "applications:mine";
pub const FENCE_FOR_JOB: &str = "applications:job";

#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationsOutcome {
    MineListed(Vec<Application>),
    ForJobListed { job_id: String, applications: Vec<Application> },
    Submitted(Application),
    Accepted(Application),
    Rejected(Application),
    Withdrawn(String),
}

/// Applications for the current actor kept apart from those of the job being inspected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationsState {
    /// The job seeker's own applications.
    pub mine: Vec<Application>,
    /// Applications received for `inspected_job`.
    pub for_job: Vec<Application>,
    pub inspected_job: Option<String>,
    pub status: SliceStatus,
}

impl ApplicationsState {
    pub fn find_mine(&self, id: &str) -> Option<&Application> {
        self.mine.iter().find(|a| a.id == id)
    }

    pub fn has_applied_to(&self, job_id: &str) -> bool {
        self.mine.iter().any(|a| a.job_id == job_id)
    }
}

impl Reducer for ApplicationsState {
    type Outcome = ApplicationsOutcome;

    fn status(&self) -> &SliceStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut SliceStatus {
        &mut self.status
    }

    fn apply(&mut self, outcome: ApplicationsOutcome) {
        match outcome {
            ApplicationsOutcome::MineListed(applications) => self.mine = applications,
            ApplicationsOutcome::ForJobListed { job_id, applications } => {
                self.inspected_job = Some(job_id);
                self.for_job = applications;
            }
            ApplicationsOutcome::Submitted(application) => self.mine.push(application),
            ApplicationsOutcome::Accepted(application)
            | ApplicationsOutcome::Rejected(application) => {
                replace_by_id(&mut self.for_job, &application);
                replace_by_id(&mut self.mine, &application);
            }
            ApplicationsOutcome::Withdrawn(id) => {
                remove_by_id(&mut self.mine, &id);
            }
        }
    }

    fn same_data(&self, other: &Self) -> bool {
        self.mine == other.mine
            && self.for_job == other.for_job
            && self.inspected_job == other.inspected_job
    }
}
