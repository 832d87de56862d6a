use crate::api::{ApiError, FilePart, FormPayload, RequestOptions, Transport, endpoints};
use crate::context::AppContext;
use crate::models::{
    JobSeekerProfile, JobSeekerProfileUpdate, Profile, ProfileEnvelope, RecruiterProfile,
    RecruiterProfileUpdate, Role,
};
use crate::state::{AuthOutcome, ProfileOutcome, SliceEvent};

use super::auth::persist;
use super::{perform, require_role};

/// Result of a recruiter profile update.
#[derive(Debug, Clone, PartialEq)]
pub struct RecruiterUpdateOutcome {
    pub profile: RecruiterProfile,
    /// The company changed, so the server will ask for verification again.
    pub requires_reverification: bool,
}

/// Whether an update moves the recruiter to a different company.
///
/// Purely advisory: the server decides whether verification is reset.
pub fn company_change_requires_reverification(
    current: Option<&RecruiterProfile>,
    update: &RecruiterProfileUpdate,
) -> bool {
    let (Some(current), Some(company)) = (current, update.company.as_deref()) else {
        return false;
    };

    let changed = !current.company.trim().eq_ignore_ascii_case(company.trim());
    if changed {
        tracing::warn!(
            "Changing company from '{}' to '{}' requires verification again",
            current.company,
            company
        );
    }
    changed
}

/// Carry a server-reported verification status into the session and persist it.
///
/// The session is otherwise only written at login, so an approval granted later would
/// never reach the client-side gates.
fn sync_verification<T: Transport>(ctx: &AppContext<T>, profile: &RecruiterProfile) {
    let Some(status) = profile.verification_status else {
        return;
    };
    let store = ctx.store();
    let cached = store.read(|s| s.auth.user.as_ref().map(|u| u.verification_status));
    if cached.is_none_or(|current| current == Some(status)) {
        return;
    }

    tracing::info!("Recruiter verification is now {:?}", status);
    let ticket = store.begin(None);
    store.dispatch(SliceEvent::<AuthOutcome>::Started(ticket));
    store.dispatch(SliceEvent::Succeeded { ticket, outcome: AuthOutcome::VerificationChanged(status) });

    if let Some(session) = store.read(|s| s.auth.session()) {
        persist(ctx, &session);
    }
}

fn payload<U: serde::Serialize>(update: &U, files: Vec<FilePart>) -> Result<RequestOptions, ApiError> {
    if files.is_empty() {
        return RequestOptions::post().json(update);
    }
    let form = files
        .into_iter()
        .fold(FormPayload::from_serializable(update)?, FormPayload::file);
    Ok(RequestOptions::post().multipart(form))
}

pub async fn fetch_job_seeker_profile<T: Transport>(ctx: &AppContext<T>) -> Result<JobSeekerProfile, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::JobSeeker)?;
            let envelope: ProfileEnvelope<JobSeekerProfile> =
                ctx.call(endpoints::JOB_SEEKER_PROFILE, RequestOptions::get()).await?;
            Ok(envelope.profile)
        },
        |profile: &JobSeekerProfile| ProfileOutcome::Fetched(Profile::JobSeeker(profile.clone())),
    )
    .await
}

/// Update the job-seeker profile; a resume upload switches the body to multipart.
pub async fn update_job_seeker_profile<T: Transport>(
    ctx: &AppContext<T>,
    update: &JobSeekerProfileUpdate,
    resume: Option<FilePart>,
) -> Result<JobSeekerProfile, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::JobSeeker)?;
            let options = payload(update, resume.into_iter().collect())?;
            let envelope: ProfileEnvelope<JobSeekerProfile> =
                ctx.call(endpoints::JOB_SEEKER_PROFILE_UPDATE, options).await?;
            tracing::info!("Updated job seeker profile");
            Ok(envelope.profile)
        },
        |profile: &JobSeekerProfile| ProfileOutcome::Updated(Profile::JobSeeker(profile.clone())),
    )
    .await
}

pub async fn fetch_recruiter_profile<T: Transport>(ctx: &AppContext<T>) -> Result<RecruiterProfile, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::Recruiter)?;
            let envelope: ProfileEnvelope<RecruiterProfile> =
                ctx.call(endpoints::RECRUITER_PROFILE, RequestOptions::get()).await?;
            sync_verification(ctx, &envelope.profile);
            Ok(envelope.profile)
        },
        |profile: &RecruiterProfile| ProfileOutcome::Fetched(Profile::Recruiter(profile.clone())),
    )
    .await
}

/// Update the recruiter profile, optionally uploading verification documents.
pub async fn update_recruiter_profile<T: Transport>(
    ctx: &AppContext<T>,
    update: &RecruiterProfileUpdate,
    documents: Vec<FilePart>,
) -> Result<RecruiterUpdateOutcome, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::Recruiter)?;
            let current = ctx
                .store()
                .read(|s| s.profile.profile.as_ref().and_then(Profile::as_recruiter).cloned());
            let requires_reverification = company_change_requires_reverification(current.as_ref(), update);

            let options = payload(update, documents)?;
            let envelope: ProfileEnvelope<RecruiterProfile> =
                ctx.call(endpoints::RECRUITER_PROFILE_UPDATE, options).await?;
            tracing::info!("Updated recruiter profile for {}", envelope.profile.company);
            sync_verification(ctx, &envelope.profile);

            Ok(RecruiterUpdateOutcome { profile: envelope.profile, requires_reverification })
        },
        |outcome: &RecruiterUpdateOutcome| ProfileOutcome::Updated(Profile::Recruiter(outcome.profile.clone())),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, MockTransport, PreparedBody, RawResponse};
    use crate::models::{AuthSession, User, VerificationStatus};
    use crate::state::{AuthOutcome, SliceEvent, Store};
    use crate::storage::MemorySessionStorage;
    use reqwest::Method;
    use std::sync::Arc;

    fn context(mock: MockTransport, role: Role) -> AppContext<MockTransport> {
        let ctx = AppContext::new(
            ApiClient::new("http://api.test", mock),
            Store::new(),
            Arc::new(MemorySessionStorage::new()),
        );
        let session = AuthSession {
            user: User {
                id: "U1".into(),
                name: "Pat".into(),
                email: "p@b.com".into(),
                role,
                verification_status: Some(VerificationStatus::Verified),
                created_at: None,
            },
            token: "tok".into(),
        };
        let ticket = ctx.store().begin(None);
        ctx.store()
            .dispatch(SliceEvent::Succeeded { ticket, outcome: AuthOutcome::Restored(session) });
        ctx
    }

    fn recruiter(company: &str) -> RecruiterProfile {
        RecruiterProfile {
            company: company.into(),
            position: None,
            company_website: None,
            verification_documents: vec![],
            verification_status: None,
        }
    }

    #[test]
    fn test_company_change_detection() {
        let current = recruiter("Acme");
        let same = RecruiterProfileUpdate { company: Some(" acme ".into()), ..Default::default() };
        let other = RecruiterProfileUpdate { company: Some("Globex".into()), ..Default::default() };
        let untouched = RecruiterProfileUpdate { position: Some("Lead".into()), ..Default::default() };

        assert!(!company_change_requires_reverification(Some(&current), &same));
        assert!(company_change_requires_reverification(Some(&current), &other));
        assert!(!company_change_requires_reverification(Some(&current), &untouched));
        assert!(!company_change_requires_reverification(None, &other));
    }

    #[tokio::test]
    async fn test_fetch_job_seeker_profile() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.url.ends_with("/profile/jobseeker/me"))
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"{"profile":{"skills":["Rust","SQL"]}}"#)));
        let ctx = context(mock, Role::JobSeeker);

        let profile = fetch_job_seeker_profile(&ctx).await.unwrap();

        assert_eq!(profile.skills, vec!["Rust", "SQL"]);
        let cached = ctx.store().read(|s| s.profile.profile.clone());
        assert_eq!(cached, Some(Profile::JobSeeker(profile)));
    }

    #[tokio::test]
    async fn test_update_job_seeker_profile_with_resume() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::POST
                    && matches!(&req.body, Some(PreparedBody::Multipart(form)) if form.files.len() == 1)
            })
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"{"profile":{"skills":[],"resume":"uploads/cv.pdf"}}"#)));
        let ctx = context(mock, Role::JobSeeker);

        let resume = FilePart {
            field: "resume".into(),
            file_name: "cv.pdf".into(),
            mime: "application/pdf".into(),
            bytes: vec![1, 2, 3],
        };
        let update = JobSeekerProfileUpdate { bio: Some("Hi".into()), ..Default::default() };

        let profile = update_job_seeker_profile(&ctx, &update, Some(resume)).await.unwrap();

        assert_eq!(profile.resume.as_deref(), Some("uploads/cv.pdf"));
    }

    #[tokio::test]
    async fn test_update_recruiter_flags_company_change() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET)
            .returning(|_| Ok(RawResponse::new(200, r#"{"profile":{"company":"Acme"}}"#)));
        mock.expect_send()
            .withf(|req| req.method == Method::POST && matches!(req.body, Some(PreparedBody::Json(_))))
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"{"profile":{"company":"Globex"}}"#)));
        let ctx = context(mock, Role::Recruiter);

        fetch_recruiter_profile(&ctx).await.unwrap();
        let update = RecruiterProfileUpdate { company: Some("Globex".into()), ..Default::default() };
        let outcome = update_recruiter_profile(&ctx, &update, vec![]).await.unwrap();

        assert!(outcome.requires_reverification);
        assert_eq!(outcome.profile.company, "Globex");
    }

    #[tokio::test]
    async fn test_recruiter_profile_refused_for_job_seeker() {
        let mut mock = MockTransport::new();
        mock.expect_send().never();
        let ctx = context(mock, Role::JobSeeker);

        let err = fetch_recruiter_profile(&ctx).await.unwrap_err();

        assert!(matches!(err, ApiError::NotPermitted(_)));
        assert!(ctx.store().read(|s| s.profile.status.error.is_some()));
    }
}
