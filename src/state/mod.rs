// State management module
//
// Resource containers are plain structs with pure reducers. The Store wraps them in
// Arc<RwLock<T>>, applies dispatched actions and emits change events for views.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod jobs;
pub mod profile;
pub mod resource;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::metrics::Metrics;

pub use admin::{AdminOutcome, AdminState};
pub use applications::{ApplicationsOutcome, ApplicationsState};
pub use auth::{AuthOutcome, AuthState};
pub use jobs::{JobsOutcome, JobsState};
pub use profile::{ProfileOutcome, ProfileState};
pub use resource::{Reducer, Reduction, RequestTicket, SliceEvent, SliceStatus};

/// Identifies one resource container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slice {
    Auth,
    Jobs,
    Applications,
    Profile,
    Admin,
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slice::Auth => "auth",
            Slice::Jobs => "jobs",
            Slice::Applications => "applications",
            Slice::Profile => "profile",
            Slice::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// Everything a view can ask the store to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Auth(SliceEvent<AuthOutcome>),
    Jobs(SliceEvent<JobsOutcome>),
    Applications(SliceEvent<ApplicationsOutcome>),
    Profile(SliceEvent<ProfileOutcome>),
    Admin(SliceEvent<AdminOutcome>),
    /// Drop every cached resource (logout).
    Reset,
}

impl From<SliceEvent<AuthOutcome>> for Action {
    fn from(event: SliceEvent<AuthOutcome>) -> Self {
        Action::Auth(event)
    }
}

impl From<SliceEvent<JobsOutcome>> for Action {
    fn from(event: SliceEvent<JobsOutcome>) -> Self {
        Action::Jobs(event)
    }
}

impl From<SliceEvent<ApplicationsOutcome>> for Action {
    fn from(event: SliceEvent<ApplicationsOutcome>) -> Self {
        Action::Applications(event)
    }
}

impl From<SliceEvent<ProfileOutcome>> for Action {
    fn from(event: SliceEvent<ProfileOutcome>) -> Self {
        Action::Profile(event)
    }
}

impl From<SliceEvent<AdminOutcome>> for Action {
    fn from(event: SliceEvent<AdminOutcome>) -> Self {
        Action::Admin(event)
    }
}

impl Action {
    fn ticket(&self) -> Option<RequestTicket> {
        match self {
            Action::Auth(event) => event.ticket(),
            Action::Jobs(event) => event.ticket(),
            Action::Applications(event) => event.ticket(),
            Action::Profile(event) => event.ticket(),
            Action::Admin(event) => event.ticket(),
            Action::Reset => None,
        }
    }
}

/// Change events emitted when state is modified
///
/// Views subscribe to these instead of polling the store.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    LoadingChanged { slice: Slice, loading: bool },
    ErrorChanged { slice: Slice, error: Option<String> },
    /// Cached entities of a slice were replaced or mutated
    DataChanged { slice: Slice },
    SessionChanged { is_authenticated: bool },
    StateReset,
}

/// One container per server resource.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub jobs: JobsState,
    pub applications: ApplicationsState,
    pub profile: ProfileState,
    pub admin: AdminState,
    epoch: u64,
}

impl AppState {
    /// Route an action to its container. Pure; no events are emitted here.
    pub fn reduce(&mut self, action: Action) -> Reduction {
        if action.ticket().is_some_and(|ticket| ticket.epoch < self.epoch) {
            return Reduction::Stale;
        }

        match action {
            Action::Auth(event) => self.auth.reduce(event),
            Action::Jobs(event) => self.jobs.reduce(event),
            Action::Applications(event) => self.applications.reduce(event),
            Action::Profile(event) => self.profile.reduce(event),
            Action::Admin(event) => self.admin.reduce(event),
            Action::Reset => {
                *self = AppState {
                    epoch: self.epoch + 1,
                    ..AppState::default()
                };
                Reduction::Applied
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Bumped by every reset; tickets from an earlier epoch are ignored.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Single source of truth for cached server data, passed explicitly to whoever needs it.
///
/// - [`dispatch()`](Self::dispatch) is the only way to mutate state
/// - [`read()`](Self::read) / [`snapshot()`](Self::snapshot) for reading
/// - [`subscribe()`](Self::subscribe) for listening to [`StateChange`] events
///
/// Cloning a `Store` shares the same underlying state.
pub struct Store {
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for state change events
    state_tx: broadcast::Sender<StateChange>,

    next_seq: Arc<AtomicU64>,

    metrics: Arc<Metrics>,
}

impl Store {
    /// Create a new Store with empty containers and a broadcast buffer of 100 events
    pub fn new() -> Self {
        Self::with_metrics(Arc::new(Metrics::new()))
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
            next_seq: Arc::new(AtomicU64::new(1)),
            metrics,
        }
    }

    /// Issue a ticket for a new request. Pass a fence key for fetches that replace data.
    pub fn begin(&self, fence: Option<&'static str>) -> RequestTicket {
        let epoch = self.read(AppState::epoch);
        RequestTicket::new(self.next_seq.fetch_add(1, Ordering::Relaxed), fence).in_epoch(epoch)
    }

    /// Get a clone of the current state
    pub fn snapshot(&self) -> AppState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let token = store.read(|state| state.auth.token.clone());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&state)
    }

    /// Apply an action and emit the resulting change events
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn dispatch(&self, action: impl Into<Action>) -> Vec<StateChange> {
        let action = action.into();
        let is_reset = matches!(action, Action::Reset);

        let changes = {
            let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            let old_state = state.clone();

            if state.reduce(action) == Reduction::Stale {
                self.metrics.record_stale_response();
                tracing::debug!("Dropped a superseded response");
            }

            let mut changes = detect_changes(&old_state, &state);
            if is_reset {
                changes.insert(0, StateChange::StateReset);
            }
            changes
        };

        self.metrics.record_state_update();
        for change in &changes {
            match self.state_tx.send(change.clone()) {
                Ok(_) => self.metrics.record_state_broadcast(),
                // no subscribers is fine
                Err(_) => self.metrics.record_state_broadcast_error(),
            }
        }

        changes
    }

    /// Drop all cached resources
    pub fn reset(&self) -> Vec<StateChange> {
        self.dispatch(Action::Reset)
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
            next_seq: Arc::clone(&self.next_seq),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

fn diff_slice<S: Reducer>(slice: Slice, old: &S, new: &S, changes: &mut Vec<StateChange>) {
    if old.loading() != new.loading() {
        changes.push(StateChange::LoadingChanged { slice, loading: new.loading() });
    }
    if old.error() != new.error() {
        changes.push(StateChange::ErrorChanged {
            slice,
            error: new.error().map(str::to_string),
        });
    }
    if !old.same_data(new) {
        changes.push(StateChange::DataChanged { slice });
    }
}

/// Detect what changed between two states and generate events
fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    diff_slice(Slice::Auth, &old.auth, &new.auth, &mut changes);
    diff_slice(Slice::Jobs, &old.jobs, &new.jobs, &mut changes);
    diff_slice(Slice::Applications, &old.applications, &new.applications, &mut changes);
    diff_slice(Slice::Profile, &old.profile, &new.profile, &mut changes);
    diff_slice(Slice::Admin, &old.admin, &new.admin, &mut changes);

    if old.is_authenticated() != new.is_authenticated() {
        changes.push(StateChange::SessionChanged {
            is_authenticated: new.is_authenticated(),
        });
    }

    changes
}
