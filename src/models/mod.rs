//! Data models mirrored from the job board REST API.
//!
//! This module contains every entity the client caches:
//! - [`User`]: identity, [`Role`] and recruiter [`VerificationStatus`]
//! - [`Job`]: a posting owned by one recruiter
//! - [`Application`]: the link between a job and a job seeker, with its own lifecycle
//! - [`Profile`]: the per-role extension of a user
//! - [`ClientSettings`]: client configuration loaded by [`ConfigManager`](crate::config::ConfigManager)
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: wire types use camelCase field names; documents are keyed by `_id`,
//!   with a plain `id` accepted when `_id` is absent
//! - **Cloneable**: every state container owns its own copies; nothing is shared by reference
//! - **Comparable**: `PartialEq` lets [`Store`](crate::state::Store) diff old and new state

/// Implements `Serialize`/`Deserialize` for a document type derived with
/// `#[serde(remote = "Self")]`, normalizing its id keys first.
macro_rules! document_serde {
    ($ty:ident) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $ty::serialize(self, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                let value = $crate::models::document_keys(value);
                $ty::deserialize(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod application;
pub mod config;
pub mod envelope;
pub mod job;
pub mod profile;
pub mod user;

pub use application::{Application, ApplicationDraft, ApplicationStatus};
pub use config::ClientSettings;
pub use envelope::{
    ApplicationEnvelope, ApplicationsEnvelope, JobEnvelope, JobsEnvelope, MessageEnvelope,
    ProfileEnvelope, RecruitersEnvelope, UserEnvelope, UsersEnvelope,
};
pub use job::{ExperienceLevel, Job, JobDraft, JobQuery, JobStatus, JobType, SalaryRange};
pub use profile::{
    Education, JobSeekerProfile, JobSeekerProfileUpdate, Profile, RecruiterProfile,
    RecruiterProfileUpdate, WorkExperience,
};
pub use user::{AuthSession, LoginRequest, Role, SignupRequest, User, VerificationStatus};

/// Collapse `_id` and the `id` virtual into a single `_id` key.
///
/// Mongoose documents may carry both; `_id` wins.
pub(crate) fn document_keys(mut value: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(map) = &mut value {
        let plain = map.remove("id");
        if let Some(id) = plain.filter(|_| !map.contains_key("_id")) {
            map.insert("_id".to_string(), id);
        }
    }
    value
}
