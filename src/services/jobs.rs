use crate::api::{ApiError, RequestOptions, Transport, endpoints};
use crate::context::AppContext;
use crate::models::{Job, JobDraft, JobEnvelope, JobQuery, JobsEnvelope, MessageEnvelope, Role};
use crate::state::JobsOutcome;
use crate::state::jobs::{FENCE_DETAIL, FENCE_LIST, FENCE_MINE};

use super::{perform, require_role, require_verified_recruiter};

/// Refuse changes to a cached posting owned by someone else.
/// Uncached postings are left to the server.
fn ensure_owned<T: Transport>(ctx: &AppContext<T>, job_id: &str, user_id: &str) -> Result<(), ApiError> {
    let owner = ctx
        .store()
        .read(|s| s.jobs.find(job_id).and_then(|job| job.recruiter.clone()));

    match owner {
        Some(owner) if owner != user_id => Err(ApiError::NotPermitted(
            "You can only manage your own job postings".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Public listing, optionally narrowed server-side. Only the newest listing is kept.
pub async fn list_jobs<T: Transport>(ctx: &AppContext<T>, query: &JobQuery) -> Result<Vec<Job>, ApiError> {
    tracing::debug!("Listing jobs: {:?}", query);

    perform(
        ctx.store(),
        Some(FENCE_LIST),
        async {
            let options = RequestOptions::get().query(query.to_pairs());
            let envelope: JobsEnvelope = ctx.call(endpoints::ALL_JOBS, options).await?;
            Ok(envelope.jobs)
        },
        |jobs: &Vec<Job>| JobsOutcome::Listed(jobs.clone()),
    )
    .await
}

pub async fn fetch_job<T: Transport>(ctx: &AppContext<T>, job_id: &str) -> Result<Job, ApiError> {
    perform(
        ctx.store(),
        Some(FENCE_DETAIL),
        async {
            let envelope: JobEnvelope = ctx.call(&endpoints::job(job_id), RequestOptions::get()).await?;
            Ok(envelope.job)
        },
        |job: &Job| JobsOutcome::Fetched(job.clone()),
    )
    .await
}

/// Postings owned by the signed-in recruiter. Unverified recruiters may still look.
pub async fn list_my_jobs<T: Transport>(ctx: &AppContext<T>) -> Result<Vec<Job>, ApiError> {
    perform(
        ctx.store(),
        Some(FENCE_MINE),
        async {
            require_role(ctx.store(), Role::Recruiter)?;
            let envelope: JobsEnvelope = ctx.call(endpoints::MY_JOBS, RequestOptions::get()).await?;
            Ok(envelope.jobs)
        },
        |jobs: &Vec<Job>| JobsOutcome::MineListed(jobs.clone()),
    )
    .await
}

pub async fn create_job<T: Transport>(ctx: &AppContext<T>, draft: &JobDraft) -> Result<Job, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_verified_recruiter(ctx.store())?;
            let options = RequestOptions::post().json(draft)?;
            let envelope: JobEnvelope = ctx.call(endpoints::JOBS, options).await?;
            tracing::info!("Created job {} ({})", envelope.job.id, envelope.job.title);
            Ok(envelope.job)
        },
        |job: &Job| JobsOutcome::Created(job.clone()),
    )
    .await
}

pub async fn update_job<T: Transport>(
    ctx: &AppContext<T>,
    job_id: &str,
    draft: &JobDraft,
) -> Result<Job, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            let user = require_verified_recruiter(ctx.store())?;
            ensure_owned(ctx, job_id, &user.id)?;
            let options = RequestOptions::put().json(draft)?;
            let envelope: JobEnvelope = ctx.call(&endpoints::job(job_id), options).await?;
            tracing::info!("Updated job {}", envelope.job.id);
            Ok(envelope.job)
        },
        |job: &Job| JobsOutcome::Updated(job.clone()),
    )
    .await
}

pub async fn delete_job<T: Transport>(ctx: &AppContext<T>, job_id: &str) -> Result<(), ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            let user = require_verified_recruiter(ctx.store())?;
            ensure_owned(ctx, job_id, &user.id)?;
            let _: MessageEnvelope = ctx.call(&endpoints::job(job_id), RequestOptions::delete()).await?;
            tracing::info!("Deleted job {}", job_id);
            Ok(())
        },
        |_: &()| JobsOutcome::Deleted(job_id.to_string()),
    )
    .await
}
