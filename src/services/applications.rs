use crate::api::{ApiError, FilePart, FormPayload, RequestOptions, Transport, endpoints};
use crate::context::AppContext;
use crate::models::{
    Application, ApplicationDraft, ApplicationEnvelope, ApplicationStatus, ApplicationsEnvelope,
    MessageEnvelope, Role,
};
use crate::state::ApplicationsOutcome;
use crate::state::applications::{FENCE_FOR_JOB, FENCE_MINE};

use super::{perform, require_role, require_verified_recruiter};

/// Apply to a job. With a resume attached the draft goes out as `multipart/form-data`.
pub async fn apply_to_job<T: Transport>(
    ctx: &AppContext<T>,
    job_id: &str,
    draft: &ApplicationDraft,
    resume: Option<FilePart>,
) -> Result<Application, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::JobSeeker)?;
            if ctx.store().read(|s| s.applications.has_applied_to(job_id)) {
                return Err(ApiError::NotPermitted(
                    "You have already applied to this job".to_string(),
                ));
            }

            let options = match resume {
                Some(part) => {
                    RequestOptions::post().multipart(FormPayload::from_serializable(draft)?.file(part))
                }
                None => RequestOptions::post().json(draft)?,
            };
            let envelope: ApplicationEnvelope = ctx.call(&endpoints::apply(job_id), options).await?;
            tracing::info!("Applied to job {} ({})", job_id, envelope.application.id);
            Ok(envelope.application)
        },
        |application: &Application| ApplicationsOutcome::Submitted(application.clone()),
    )
    .await
}

pub async fn list_my_applications<T: Transport>(ctx: &AppContext<T>) -> Result<Vec<Application>, ApiError> {
    perform(
        ctx.store(),
        Some(FENCE_MINE),
        async {
            require_role(ctx.store(), Role::JobSeeker)?;
            let envelope: ApplicationsEnvelope =
                ctx.call(endpoints::MY_APPLICATIONS, RequestOptions::get()).await?;
            Ok(envelope.applications)
        },
        |applications: &Vec<Application>| ApplicationsOutcome::MineListed(applications.clone()),
    )
    .await
}

/// Applications received for one of the recruiter's postings.
pub async fn list_job_applications<T: Transport>(
    ctx: &AppContext<T>,
    job_id: &str,
) -> Result<Vec<Application>, ApiError> {
    perform(
        ctx.store(),
        Some(FENCE_FOR_JOB),
        async {
            require_verified_recruiter(ctx.store())?;
            let envelope: ApplicationsEnvelope =
                ctx.call(&endpoints::job_applications(job_id), RequestOptions::get()).await?;
            Ok(envelope.applications)
        },
        |applications: &Vec<Application>| ApplicationsOutcome::ForJobListed {
            job_id: job_id.to_string(),
            applications: applications.clone(),
        },
    )
    .await
}

pub async fn accept_application<T: Transport>(
    ctx: &AppContext<T>,
    application_id: &str,
) -> Result<Application, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_verified_recruiter(ctx.store())?;
            let envelope: ApplicationEnvelope = ctx
                .call(&endpoints::accept_application(application_id), RequestOptions::put())
                .await?;
            tracing::info!("Accepted application {}", application_id);
            Ok(envelope.application)
        },
        |application: &Application| ApplicationsOutcome::Accepted(application.clone()),
    )
    .await
}

pub async fn reject_application<T: Transport>(
    ctx: &AppContext<T>,
    application_id: &str,
) -> Result<Application, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_verified_recruiter(ctx.store())?;
            let envelope: ApplicationEnvelope = ctx
                .call(&endpoints::reject_application(application_id), RequestOptions::put())
                .await?;
            tracing::info!("Rejected application {}", application_id);
            Ok(envelope.application)
        },
        |application: &Application| ApplicationsOutcome::Rejected(application.clone()),
    )
    .await
}

/// Withdraw one of the job seeker's own applications.
///
/// Refused without a request unless the cached application is still `applied`.
pub async fn withdraw_application<T: Transport>(
    ctx: &AppContext<T>,
    application_id: &str,
) -> Result<(), ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::JobSeeker)?;
            let status = ctx
                .store()
                .read(|s| s.applications.find_mine(application_id).map(|a| a.status));
            match status {
                None => {
                    return Err(ApiError::NotPermitted(format!(
                        "Application {application_id} is not among your applications"
                    )));
                }
                Some(status) if status != ApplicationStatus::Applied => {
                    return Err(ApiError::NotPermitted(format!(
                        "Only pending applications can be withdrawn (this one is {})",
                        status.as_str()
                    )));
                }
                Some(_) => {}
            }

            let _: MessageEnvelope = ctx
                .call(&endpoints::withdraw_application(application_id), RequestOptions::delete())
                .await?;
            tracing::info!("Withdrew application {}", application_id);
            Ok(())
        },
        |_: &()| ApplicationsOutcome::Withdrawn(application_id.to_string()),
    )
    .await
}
