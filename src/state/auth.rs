use super::resource::{Reducer, SliceStatus};
use crate::models::{AuthSession, User, VerificationStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    LoggedIn(AuthSession),
    SignedUp(AuthSession),
    /// Session loaded from durable storage without a network call.
    Restored(AuthSession),
    LoggedOut,
    /// The server reported a new verification status for the signed-in recruiter.
    VerificationChanged(VerificationStatus),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub status: SliceStatus,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn session(&self) -> Option<AuthSession> {
        Some(AuthSession {
            user: self.user.clone()?,
            token: self.token.clone()?,
        })
    }
}

impl Reducer for AuthState {
    type Outcome = AuthOutcome;

    fn status(&self) -> &SliceStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut SliceStatus {
        &mut self.status
    }

    fn apply(&mut self, outcome: AuthOutcome) {
        match outcome {
            AuthOutcome::LoggedIn(session)
            | AuthOutcome::SignedUp(session)
            | AuthOutcome::Restored(session) => {
                self.user = Some(session.user);
                self.token = Some(session.token);
            }
            AuthOutcome::LoggedOut => {
                self.user = None;
                self.token = None;
            }
            AuthOutcome::VerificationChanged(status) => {
                if let Some(user) = self.user.as_mut().filter(|u| u.is_recruiter()) {
                    user.verification_status = Some(status);
                }
            }
        }
    }

    fn same_data(&self, other: &Self) -> bool {
        self.user == other.user && self.token == other.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::state::resource::{RequestTicket, SliceEvent};

    fn session() -> AuthSession {
        AuthSession {
            user: User {
                id: "U1".into(),
                name: "Ada".into(),
                email: "a@b.com".into(),
                role: Role::JobSeeker,
                verification_status: None,
                created_at: None,
            },
            token: "tok".into(),
        }
    }

    #[test]
    fn test_login_success_authenticates() {
        let mut state = AuthState::default();
        let ticket = RequestTicket::new(1, None);

        state.reduce(SliceEvent::Started(ticket));
        assert!(state.loading());

        state.reduce(SliceEvent::Succeeded { ticket, outcome: AuthOutcome::LoggedIn(session()) });
        assert!(!state.loading());
        assert!(state.is_authenticated());
        assert_eq!(state.token(), Some("tok"));
    }

    #[test]
    fn test_login_failure_keeps_logged_out() {
        let mut state = AuthState::default();
        let ticket = RequestTicket::new(1, None);

        state.reduce(SliceEvent::Started(ticket));
        state.reduce(SliceEvent::Failed { ticket, message: "Invalid credentials".into() });

        assert!(!state.loading());
        assert!(!state.is_authenticated());
        assert_eq!(state.error(), Some("Invalid credentials"));
    }

    #[test]
    fn test_started_keeps_previous_error_until_cleared() {
        let mut state = AuthState::default();
        state.reduce(SliceEvent::Failed { ticket: RequestTicket::new(1, None), message: "boom".into() });
        state.reduce(SliceEvent::Started(RequestTicket::new(2, None)));
        assert_eq!(state.error(), Some("boom"));

        state.reduce(SliceEvent::ClearError);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_logout_clears_session() {
        let mut state = AuthState::default();
        state.apply(AuthOutcome::Restored(session()));
        state.apply(AuthOutcome::LoggedOut);
        assert!(!state.is_authenticated());
        assert!(state.user.is_none());
    }

    #[test]
    fn test_verification_change_applies_to_recruiters_only() {
        let mut state = AuthState::default();
        state.apply(AuthOutcome::Restored(session()));
        state.apply(AuthOutcome::VerificationChanged(VerificationStatus::Verified));
        assert_eq!(state.user.as_ref().and_then(|u| u.verification_status), None);

        let mut recruiter = session();
        recruiter.user.role = Role::Recruiter;
        recruiter.user.verification_status = Some(VerificationStatus::Pending);
        state.apply(AuthOutcome::Restored(recruiter));
        state.apply(AuthOutcome::VerificationChanged(VerificationStatus::Verified));

        let stored = state.session().unwrap();
        assert!(stored.user.can_manage_postings());
        assert_eq!(stored.token, "tok");
    }
}
