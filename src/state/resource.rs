//! Building blocks shared by every resource slice: tickets, events, the in-flight
//! tracker and the targeted list mutations.

use std::collections::{BTreeSet, HashMap};

use crate::models::{Application, Job, User};

/// Issued by [`Store::begin`](super::Store::begin) for every request.
///
/// Fetches that replace cached data carry a `fence` key; a completion whose ticket is
/// older than the newest ticket issued for the same fence is dropped. Every ticket also
/// carries the store epoch it was issued in; a reset starts a new epoch and events from
/// earlier epochs are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub seq: u64,
    pub fence: Option<&'static str>,
    pub epoch: u64,
}

impl RequestTicket {
    pub fn new(seq: u64, fence: Option<&'static str>) -> Self {
        Self { seq, fence, epoch: 0 }
    }

    pub fn in_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }
}

/// The four event shapes every container reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceEvent<O> {
    Started(RequestTicket),
    Succeeded { ticket: RequestTicket, outcome: O },
    Failed { ticket: RequestTicket, message: String },
    ClearError,
}

impl<O> SliceEvent<O> {
    pub fn ticket(&self) -> Option<RequestTicket> {
        match self {
            SliceEvent::Started(ticket)
            | SliceEvent::Succeeded { ticket, .. }
            | SliceEvent::Failed { ticket, .. } => Some(*ticket),
            SliceEvent::ClearError => None,
        }
    }
}

/// Whether an event changed the slice or was dropped as superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestTracker {
    in_flight: BTreeSet<u64>,
    latest: HashMap<&'static str, u64>,
}

impl RequestTracker {
    pub fn start(&mut self, ticket: RequestTicket) {
        self.in_flight.insert(ticket.seq);
        if let Some(fence) = ticket.fence {
            let latest = self.latest.entry(fence).or_insert(ticket.seq);
            *latest = (*latest).max(ticket.seq);
        }
    }

    /// Retire a ticket. Returns false when a newer request on the same fence exists.
    pub fn finish(&mut self, ticket: RequestTicket) -> bool {
        self.in_flight.remove(&ticket.seq);
        match ticket.fence {
            Some(fence) => self
                .latest
                .get(fence)
                .is_none_or(|latest| *latest <= ticket.seq),
            None => true,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }
}

/// `loading` / `error` metadata carried by every slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceStatus {
    pub loading: bool,
    pub error: Option<String>,
    tracker: RequestTracker,
}

impl SliceStatus {
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }
}

/// A resource container: cached data plus a [`SliceStatus`], updated only by `reduce`.
pub trait Reducer {
    type Outcome;

    fn status(&self) -> &SliceStatus;

    fn status_mut(&mut self) -> &mut SliceStatus;

    /// Fold a successful outcome into the cached data.
    fn apply(&mut self, outcome: Self::Outcome);

    /// Compare cached data, ignoring loading/error metadata.
    fn same_data(&self, other: &Self) -> bool;

    fn loading(&self) -> bool {
        self.status().loading
    }

    fn error(&self) -> Option<&str> {
        self.status().error.as_deref()
    }

    /// Pure reducer over the four event shapes.
    ///
    /// `Started` does not clear a previous error; only a success or `ClearError` does.
    /// A failure leaves cached data untouched.
    fn reduce(&mut self, event: SliceEvent<Self::Outcome>) -> Reduction {
        match event {
            SliceEvent::Started(ticket) => {
                let status = self.status_mut();
                status.tracker.start(ticket);
                status.loading = true;
                Reduction::Applied
            }
            SliceEvent::Succeeded { ticket, outcome } => {
                let status = self.status_mut();
                let current = status.tracker.finish(ticket);
                status.loading = status.tracker.is_busy();
                if !current {
                    return Reduction::Stale;
                }
                status.error = None;
                self.apply(outcome);
                Reduction::Applied
            }
            SliceEvent::Failed { ticket, message } => {
                let status = self.status_mut();
                let current = status.tracker.finish(ticket);
                status.loading = status.tracker.is_busy();
                if !current {
                    return Reduction::Stale;
                }
                status.error = Some(message);
                Reduction::Applied
            }
            SliceEvent::ClearError => {
                self.status_mut().error = None;
                Reduction::Applied
            }
        }
    }
}

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Job {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Application {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Find-by-id-and-replace. Length never changes; returns whether an element matched.
pub fn replace_by_id<T: Identified + Clone>(items: &mut [T], item: &T) -> bool {
    let mut replaced = false;
    for existing in items.iter_mut().filter(|existing| existing.id() == item.id()) {
        *existing = item.clone();
        replaced = true;
    }
    replaced
}

/// Filter-out-by-id. Returns how many elements were removed.
pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> usize {
    let before = items.len();
    items.retain(|item| item.id() != id);
    before - items.len()
}
