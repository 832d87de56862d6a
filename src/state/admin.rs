use super::resource::{Reducer, SliceStatus, remove_by_id, replace_by_id};
use crate::models::User;

pub const FENCE_PENDING: &str = "admin:pending";
pub const FENCE_USERS: &str = "admin:users";

#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    PendingListed(Vec<User>),
    UsersListed(Vec<User>),
    /// Recruiter approved or rejected; carries the updated account.
    RecruiterVerified(User),
    UserDeleted(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminState {
    pub pending_recruiters: Vec<User>,
    pub users: Vec<User>,
    pub status: SliceStatus,
}

impl Reducer for AdminState {
    type Outcome = AdminOutcome;

    fn status(&self) -> &SliceStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut SliceStatus {
        &mut self.status
    }

    fn apply(&mut self, outcome: AdminOutcome) {
        match outcome {
            AdminOutcome::PendingListed(recruiters) => self.pending_recruiters = recruiters,
            AdminOutcome::UsersListed(users) => self.users = users,
            AdminOutcome::RecruiterVerified(user) => {
                remove_by_id(&mut self.pending_recruiters, &user.id);
                replace_by_id(&mut self.users, &user);
            }
            AdminOutcome::UserDeleted(id) => {
                remove_by_id(&mut self.users, &id);
                remove_by_id(&mut self.pending_recruiters, &id);
            }
        }
    }

    fn same_data(&self, other: &Self) -> bool {
        self.pending_recruiters == other.pending_recruiters && self.users == other.users
    }
}
