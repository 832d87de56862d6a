use super::resource::{Reducer, SliceStatus};
use crate::models::Profile;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    Fetched(Profile),
    Updated(Profile),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub status: SliceStatus,
}

impl Reducer for ProfileState {
    type Outcome = ProfileOutcome;

    fn status(&self) -> &SliceStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut SliceStatus {
        &mut self.status
    }

    fn apply(&mut self, outcome: ProfileOutcome) {
        match outcome {
            ProfileOutcome::Fetched(profile) | ProfileOutcome::Updated(profile) => {
                self.profile = Some(profile);
            }
        }
    }

    fn same_data(&self, other: &Self) -> bool {
        self.profile == other.profile
    }
}
