//! Response schemas for each endpoint.
//!
//! The gateway decodes every successful body into one of these, so a payload missing its
//! field fails with [`ApiError::Schema`](crate::api::ApiError::Schema) instead of leaking
//! half-filled entities into state.

use serde::Deserialize;

use super::{Application, Job, User};

#[derive(Debug, Clone, Deserialize)]
pub struct JobsEnvelope {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobEnvelope {
    pub job: Job,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationsEnvelope {
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationEnvelope {
    pub application: Application,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersEnvelope {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecruitersEnvelope {
    pub recruiters: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEnvelope<P> {
    pub profile: P,
}

/// Acknowledgement body for deletes; the message is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}
