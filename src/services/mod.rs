//! Resource action modules - one per server resource.
//!
//! Each function turns a view-triggered request into at most one HTTP call and
//! reports its progress to the [`Store`]:
//! 1. `Started` before the call (the slice's `loading` goes up)
//! 2. `Succeeded` with the server payload, or `Failed` with the error message
//!
//! Failures are stored in the slice's `error` field and also returned, so a caller can
//! react, but nothing is escalated further.
//!
//! # Components
//!
//! - [`auth`]: login, signup, logout, session restore
//! - [`jobs`]: public listing, detail, recruiter postings
//! - [`applications`]: apply, list, accept/reject, withdraw
//! - [`profile`]: job-seeker and recruiter profiles, including file uploads
//! - [`admin`]: recruiter verification and user management
//!
//! Some actions are refused client-side with [`ApiError::NotPermitted`] before any request
//! is sent (withdrawing a decided application, job management by an unverified recruiter).
//! The server stays authoritative for all of them.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod jobs;
pub mod profile;

use std::future::Future;

use crate::api::ApiError;
use crate::models::{Role, User};
use crate::state::{Action, SliceEvent, Store};

pub use admin::{
    VerificationDecision, approve_recruiter, delete_user, list_pending_recruiters, list_users,
    reject_recruiter, verify_recruiter,
};
pub use applications::{
    accept_application, apply_to_job, list_job_applications, list_my_applications,
    reject_application, withdraw_application,
};
pub use auth::{login, logout, restore_session, signup};
pub use jobs::{create_job, delete_job, fetch_job, list_jobs, list_my_jobs, update_job};
pub use profile::{
    RecruiterUpdateOutcome, company_change_requires_reverification, fetch_job_seeker_profile,
    fetch_recruiter_profile, update_job_seeker_profile, update_recruiter_profile,
};

/// Run one request bracketed by `Started` and a terminal event on the slice for `O`.
pub(crate) async fn perform<O, R, Fut, F>(
    store: &Store,
    fence: Option<&'static str>,
    request: Fut,
    outcome: F,
) -> Result<R, ApiError>
where
    SliceEvent<O>: Into<Action>,
    Fut: Future<Output = Result<R, ApiError>>,
    F: FnOnce(&R) -> O,
{
    let ticket = store.begin(fence);
    store.dispatch(SliceEvent::<O>::Started(ticket));

    match request.await {
        Ok(value) => {
            store.dispatch(SliceEvent::Succeeded { ticket, outcome: outcome(&value) });
            Ok(value)
        }
        Err(err) => {
            store.dispatch(SliceEvent::<O>::Failed { ticket, message: err.to_string() });
            Err(err)
        }
    }
}

pub(crate) fn require_user(store: &Store) -> Result<User, ApiError> {
    store
        .read(|s| s.auth.user.clone())
        .ok_or_else(|| ApiError::NotPermitted("Please log in first".to_string()))
}

pub(crate) fn require_role(store: &Store, role: Role) -> Result<User, ApiError> {
    let user = require_user(store)?;
    if user.role != role {
        return Err(ApiError::NotPermitted(format!(
            "This action requires a {} account",
            role.as_str()
        )));
    }
    Ok(user)
}

/// Recruiters manage postings and applications only once verified.
pub(crate) fn require_verified_recruiter(store: &Store) -> Result<User, ApiError> {
    let user = require_role(store, Role::Recruiter)?;
    if !user.can_manage_postings() {
        return Err(ApiError::NotPermitted(
            "Your recruiter account must be verified by an administrator first".to_string(),
        ));
    }
    Ok(user)
}
