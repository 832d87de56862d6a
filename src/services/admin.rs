use serde_json::json;

use crate::api::{ApiError, RequestOptions, Transport, endpoints};
use crate::context::AppContext;
use crate::models::{MessageEnvelope, RecruitersEnvelope, Role, User, UserEnvelope, UsersEnvelope, VerificationStatus};
use crate::state::AdminOutcome;
use crate::state::admin::{FENCE_PENDING, FENCE_USERS};

use super::{perform, require_role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationDecision {
    Approve,
    Reject,
}

impl VerificationDecision {
    pub fn status(&self) -> VerificationStatus {
        match self {
            VerificationDecision::Approve => VerificationStatus::Verified,
            VerificationDecision::Reject => VerificationStatus::Rejected,
        }
    }
}

pub async fn list_pending_recruiters<T: Transport>(ctx: &AppContext<T>) -> Result<Vec<User>, ApiError> {
    perform(
        ctx.store(),
        Some(FENCE_PENDING),
        async {
            require_role(ctx.store(), Role::Admin)?;
            let envelope: RecruitersEnvelope =
                ctx.call(endpoints::PENDING_RECRUITERS, RequestOptions::get()).await?;
            Ok(envelope.recruiters)
        },
        |recruiters: &Vec<User>| AdminOutcome::PendingListed(recruiters.clone()),
    )
    .await
}

/// Approve or reject a pending recruiter. The recruiter leaves the pending list either way.
pub async fn verify_recruiter<T: Transport>(
    ctx: &AppContext<T>,
    recruiter_id: &str,
    decision: VerificationDecision,
) -> Result<User, ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            require_role(ctx.store(), Role::Admin)?;
            let options = RequestOptions::put().json(&json!({ "status": decision.status() }))?;
            let envelope: UserEnvelope = ctx.call(&endpoints::verify_recruiter(recruiter_id), options).await?;
            tracing::info!("Recruiter {} marked {:?}", recruiter_id, decision.status());
            Ok(envelope.user)
        },
        |user: &User| AdminOutcome::RecruiterVerified(user.clone()),
    )
    .await
}

pub async fn approve_recruiter<T: Transport>(ctx: &AppContext<T>, recruiter_id: &str) -> Result<User, ApiError> {
    verify_recruiter(ctx, recruiter_id, VerificationDecision::Approve).await
}

pub async fn reject_recruiter<T: Transport>(ctx: &AppContext<T>, recruiter_id: &str) -> Result<User, ApiError> {
    verify_recruiter(ctx, recruiter_id, VerificationDecision::Reject).await
}

pub async fn list_users<T: Transport>(ctx: &AppContext<T>) -> Result<Vec<User>, ApiError> {
    perform(
        ctx.store(),
        Some(FENCE_USERS),
        async {
            require_role(ctx.store(), Role::Admin)?;
            let envelope: UsersEnvelope = ctx.call(endpoints::USERS, RequestOptions::get()).await?;
            Ok(envelope.users)
        },
        |users: &Vec<User>| AdminOutcome::UsersListed(users.clone()),
    )
    .await
}

/// Delete a user account. Admins cannot delete themselves.
pub async fn delete_user<T: Transport>(ctx: &AppContext<T>, user_id: &str) -> Result<(), ApiError> {
    perform(
        ctx.store(),
        None,
        async {
            let admin = require_role(ctx.store(), Role::Admin)?;
            if admin.id == user_id {
                return Err(ApiError::NotPermitted("You cannot delete your own account".to_string()));
            }
            let _: MessageEnvelope = ctx.call(&endpoints::user(user_id), RequestOptions::delete()).await?;
            tracing::info!("Deleted user {}", user_id);
            Ok(())
        },
        |_: &()| AdminOutcome::UserDeleted(user_id.to_string()),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, MockTransport, PreparedBody, RawResponse};
    use crate::models::AuthSession;
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
                id: "ADM".into(),
                name: "Root".into(),
                email: "root@b.com".into(),
                role,
                verification_status: None,
                created_at: None,
            },
            token: "tok".into(),
        };
        let ticket = ctx.store().begin(None);
        ctx.store()
            .dispatch(SliceEvent::Succeeded { ticket, outcome: AuthOutcome::Restored(session) });
        ctx
    }

    const PENDING: &str = r#"{"recruiters":[{"_id":"R1","name":"Rita","email":"r@b.com","role":"recruiter","verificationStatus":"pending"}]}"#;

    #[tokio::test]
    async fn test_approve_removes_from_pending() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET)
            .returning(|_| Ok(RawResponse::new(200, PENDING)));
        mock.expect_send()
            .withf(|req| {
                req.method == Method::PUT
                    && req.url == "http://api.test/admin/recruiters/R1/verify"
                    && req.body == Some(PreparedBody::Json(json!({ "status": "verified" })))
            })
            .times(1)
            .returning(|_| {
                Ok(RawResponse::new(
                    200,
                    r#"{"user":{"_id":"R1","name":"Rita","email":"r@b.com","role":"recruiter","verificationStatus":"verified"}}"#,
                ))
            });
        let ctx = context(mock, Role::Admin);

        list_pending_recruiters(&ctx).await.unwrap();
        let user = approve_recruiter(&ctx, "R1").await.unwrap();

        assert!(user.can_manage_postings());
        assert!(ctx.store().read(|s| s.admin.pending_recruiters.is_empty()));
    }

    #[tokio::test]
    async fn test_non_admin_refused() {
        let mut mock = MockTransport::new();
        mock.expect_send().never();
        let ctx = context(mock, Role::Recruiter);

        assert!(list_users(&ctx).await.is_err());
        assert!(reject_recruiter(&ctx, "R1").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_user_removes_from_list() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.method == Method::GET && req.url.ends_with("/admin/users"))
            .returning(|_| {
                Ok(RawResponse::new(
                    200,
                    r#"{"users":[{"_id":"U7","name":"Lee","email":"l@b.com","role":"jobseeker"}]}"#,
                ))
            });
        mock.expect_send()
            .withf(|req| req.method == Method::DELETE && req.url.ends_with("/admin/users/U7"))
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"{"message":"User deleted"}"#)));
        let ctx = context(mock, Role::Admin);

        list_users(&ctx).await.unwrap();
        delete_user(&ctx, "U7").await.unwrap();

        assert!(ctx.store().read(|s| s.admin.users.is_empty()));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let mut mock = MockTransport::new();
        mock.expect_send().never();
        let ctx = context(mock, Role::Admin);

        let err = delete_user(&ctx, "ADM").await.unwrap_err();

        assert!(matches!(err, ApiError::NotPermitted(_)));
    }
}
