use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::de::DeserializeOwned;

use crate::api::{ApiClient, ApiError, HttpTransport, RequestOptions, Transport};
use crate::metrics::Metrics;
use crate::models::{ClientSettings, User};
use crate::state::Store;
use crate::storage::{FileSessionStorage, SessionStorage};

/// Everything a view needs, passed explicitly instead of reached through globals.
///
/// Holds the gateway, the [`Store`], the durable session storage and the shared
/// [`Metrics`]. Cloning is cheap and every clone sees the same state.
pub struct AppContext<T> {
    client: ApiClient<T>,
    store: Store,
    sessions: Arc<dyn SessionStorage>,
}

impl<T: Transport> AppContext<T> {
    /// Wire a context together. The client is pointed at the store's metrics.
    pub fn new(client: ApiClient<T>, store: Store, sessions: Arc<dyn SessionStorage>) -> Self {
        let client = client.with_metrics(Arc::clone(store.metrics()));
        Self { client, store, sessions }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn sessions(&self) -> &dyn SessionStorage {
        self.sessions.as_ref()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        self.store.metrics()
    }

    pub fn token(&self) -> Option<String> {
        self.store.read(|s| s.auth.token.clone())
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.read(|s| s.auth.user.clone())
    }

    /// Issue a request with the current session token attached.
    pub async fn call<R: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<R, ApiError> {
        let token = self.token();
        self.client.request(path, options, token.as_deref()).await
    }
}

impl AppContext<HttpTransport> {
    /// Build the production context: reqwest transport and file-backed session storage.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let transport = HttpTransport::new(settings).context("Failed to build HTTP transport")?;
        let client = ApiClient::new(settings.api_base_url.clone(), transport);
        let sessions = Arc::new(FileSessionStorage::new(&settings.data_dir));

        tracing::info!(
            "Client context ready: api={}, data_dir={}",
            settings.api_base_url,
            settings.data_dir
        );

        Ok(Self::new(client, Store::new(), sessions))
    }
}

impl<T: Clone> Clone for AppContext<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: self.store.clone(),
            sessions: Arc::clone(&self.sessions),
        }
    }
}
