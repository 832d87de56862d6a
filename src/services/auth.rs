use crate::api::{ApiError, RequestOptions, Transport, endpoints};
use crate::context::AppContext;
use crate::models::{AuthSession, LoginRequest, SignupRequest};
use crate::state::{AuthOutcome, SliceEvent};

use super::perform;

pub(super) fn persist<T: Transport>(ctx: &AppContext<T>, session: &AuthSession) {
    // the session is already live in memory; a storage failure only costs the restore
    if let Err(err) = ctx.sessions().save(session) {
        tracing::warn!("Could not persist session: {}", err);
    }
}

pub async fn login<T: Transport>(
    ctx: &AppContext<T>,
    credentials: &LoginRequest,
) -> Result<AuthSession, ApiError> {
    tracing::info!("Logging in as {}", credentials.email);

    perform(
        ctx.store(),
        None,
        async {
            let options = RequestOptions::post().json(credentials)?;
            let session: AuthSession = ctx.client().request(endpoints::LOGIN, options, None).await?;
            persist(ctx, &session);
            Ok(session)
        },
        |session: &AuthSession| AuthOutcome::LoggedIn(session.clone()),
    )
    .await
}

pub async fn signup<T: Transport>(
    ctx: &AppContext<T>,
    request: &SignupRequest,
) -> Result<AuthSession, ApiError> {
    tracing::info!("Signing up {} as {}", request.email, request.role.as_str());

    perform(
        ctx.store(),
        None,
        async {
            let options = RequestOptions::post().json(request)?;
            let session: AuthSession = ctx.client().request(endpoints::SIGNUP, options, None).await?;
            persist(ctx, &session);
            Ok(session)
        },
        |session: &AuthSession| AuthOutcome::SignedUp(session.clone()),
    )
    .await
}

/// Forget the persisted session and drop every cached resource.
///
/// The store is reset even when clearing storage fails; the failure is then reported on
/// the fresh auth slice.
pub async fn logout<T: Transport>(ctx: &AppContext<T>) -> Result<(), ApiError> {
    let cleared = ctx.sessions().clear();
    let store = ctx.store();
    store.reset();

    match cleared {
        Ok(()) => {
            tracing::info!("Logged out");
            Ok(())
        }
        Err(err) => {
            tracing::warn!("Logged out, but the persisted session remains: {}", err);
            let ticket = store.begin(None);
            store.dispatch(SliceEvent::<AuthOutcome>::Started(ticket));
            store.dispatch(SliceEvent::<AuthOutcome>::Failed { ticket, message: err.to_string() });
            Err(err)
        }
    }
}

/// Load a previously persisted session without contacting the server.
pub fn restore_session<T: Transport>(ctx: &AppContext<T>) -> Result<Option<AuthSession>, ApiError> {
    let store = ctx.store();
    let ticket = store.begin(None);
    store.dispatch(SliceEvent::<AuthOutcome>::Started(ticket));

    match ctx.sessions().load() {
        Ok(Some(session)) => {
            tracing::info!("Restored session for {}", session.user.email);
            store.dispatch(SliceEvent::Succeeded {
                ticket,
                outcome: AuthOutcome::Restored(session.clone()),
            });
            Ok(Some(session))
        }
        Ok(None) => {
            store.dispatch(SliceEvent::Succeeded { ticket, outcome: AuthOutcome::LoggedOut });
            Ok(None)
        }
        Err(err) => {
            store.dispatch(SliceEvent::<AuthOutcome>::Failed { ticket, message: err.to_string() });
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, MockTransport, RawResponse};
    use crate::state::Store;
    use crate::storage::{MemorySessionStorage, MockSessionStorage, SessionStorage};
    use reqwest::Method;
    use std::sync::Arc;

    const SESSION_BODY: &str = r#"{"user":{"_id":"U1","name":"Ada","email":"a@b.com","role":"jobseeker"},"token":"tok-1"}"#;

    fn context(mock: MockTransport, storage: Arc<MemorySessionStorage>) -> AppContext<MockTransport> {
        AppContext::new(ApiClient::new("http://api.test", mock), Store::new(), storage)
    }

    fn credentials() -> LoginRequest {
        LoginRequest { email: "a@b.com".into(), password: "x".into() }
    }

    #[tokio::test]
    async fn test_login_posts_json_and_persists() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::POST
                    && req.url == "http://api.test/auth/login"
                    && req.header("content-type") == Some("application/json")
                    && req.header("authorization").is_none()
            })
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, SESSION_BODY)));

        let storage = Arc::new(MemorySessionStorage::new());
        let ctx = context(mock, Arc::clone(&storage));

        let session = login(&ctx, &credentials()).await.unwrap();

        assert_eq!(session.token, "tok-1");
        let state = ctx.store().snapshot();
        assert!(state.auth.is_authenticated());
        assert!(!state.auth.status.loading);
        assert_eq!(storage.load().unwrap().map(|s| s.token), Some("tok-1".to_string()));
    }

    #[tokio::test]
    async fn test_login_rejected_stores_message() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(RawResponse::new(401, r#"{"error":"Invalid credentials"}"#)));

        let storage = Arc::new(MemorySessionStorage::new());
        let ctx = context(mock, Arc::clone(&storage));

        let err = login(&ctx, &credentials()).await.unwrap_err();

        assert!(err.is_unauthorized());
        let state = ctx.store().snapshot();
        assert_eq!(state.auth.status.error.as_deref(), Some("Invalid credentials"));
        assert!(!state.auth.is_authenticated());
        assert!(storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_storage_and_store() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(RawResponse::new(201, SESSION_BODY)));

        let storage = Arc::new(MemorySessionStorage::new());
        let ctx = context(mock, Arc::clone(&storage));
        signup(
            &ctx,
            &SignupRequest {
                name: "Ada".into(),
                email: "a@b.com".into(),
                password: "x".into(),
                role: crate::models::Role::JobSeeker,
                company: None,
            },
        )
        .await
        .unwrap();

        logout(&ctx).await.unwrap();

        assert!(!ctx.store().snapshot().is_authenticated());
        assert!(storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_storage_failure_survives_reset() {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_clear()
            .times(1)
            .returning(|| Err(ApiError::Storage("disk is read-only".into())));
        let ctx = AppContext::new(
            ApiClient::new("http://api.test", MockTransport::new()),
            Store::new(),
            Arc::new(storage),
        );

        let err = logout(&ctx).await.unwrap_err();

        let state = ctx.store().snapshot();
        assert!(!state.is_authenticated());
        assert!(!state.auth.status.loading);
        assert_eq!(state.auth.status.error, Some(err.to_string()));
        assert_eq!(state.epoch(), 1);
    }

    #[test]
    fn test_restore_session_without_network() {
        let session: AuthSession = serde_json::from_str(SESSION_BODY).unwrap();
        let storage = Arc::new(MemorySessionStorage::with_session(session));
        let mut mock = MockTransport::new();
        mock.expect_send().never();
        let ctx = context(mock, storage);

        let restored = restore_session(&ctx).unwrap();

        assert!(restored.is_some());
        assert_eq!(ctx.token().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_restore_session_when_nothing_saved() {
        let ctx = context(MockTransport::new(), Arc::new(MemorySessionStorage::new()));

        assert!(restore_session(&ctx).unwrap().is_none());
        assert!(!ctx.store().snapshot().is_authenticated());
        assert!(!ctx.store().snapshot().auth.status.loading);
    }
}
