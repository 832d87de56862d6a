use super::resource::{Reducer, SliceStatus, remove_by_id, replace_by_id};
use crate::models::Job;

pub const FENCE_LIST: &str = "jobs:list";
pub const FENCE_MINE: &str = "jobs:mine";
pub const FENCE_DETAIL: &str = "jobs:detail";

#[derive(Debug, Clone, PartialEq)]
pub enum JobsOutcome {
    Listed(Vec<Job>),
    MineListed(Vec<Job>),
    Fetched(Job),
    Created(Job),
    Updated(Job),
    Deleted(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobsState {
    /// Public listing.
    pub jobs: Vec<Job>,
    /// Postings owned by the signed-in recruiter.
    pub my_jobs: Vec<Job>,
    /// Job currently shown in detail.
    pub selected: Option<Job>,
    pub status: SliceStatus,
}

impl JobsState {
    pub fn find(&self, id: &str) -> Option<&Job> {
        self.selected
            .iter()
            .chain(self.my_jobs.iter())
            .chain(self.jobs.iter())
            .find(|job| job.id == id)
    }
}

impl Reducer for JobsState {
    type Outcome = JobsOutcome;

    fn status(&self) -> &SliceStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut SliceStatus {
        &mut self.status
    }

    fn apply(&mut self, outcome: JobsOutcome) {
        match outcome {
            JobsOutcome::Listed(jobs) => self.jobs = jobs,
            JobsOutcome::MineListed(jobs) => self.my_jobs = jobs,
            JobsOutcome::Fetched(job) => self.selected = Some(job),
            JobsOutcome::Created(job) => self.my_jobs.push(job),
            JobsOutcome::Updated(job) => {
                replace_by_id(&mut self.jobs, &job);
                replace_by_id(&mut self.my_jobs, &job);
                if self.selected.as_ref().is_some_and(|s| s.id == job.id) {
                    self.selected = Some(job);
                }
            }
            JobsOutcome::Deleted(id) => {
                remove_by_id(&mut self.jobs, &id);
                remove_by_id(&mut self.my_jobs, &id);
                if self.selected.as_ref().is_some_and(|s| s.id == id) {
                    self.selected = None;
                }
            }
        }
    }

    fn same_data(&self, other: &Self) -> bool {
        self.jobs == other.jobs && self.my_jobs == other.my_jobs && self.selected == other.selected
    }
}
