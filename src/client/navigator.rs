//! In-place navigation: fetch a stack diff, apply it, record history.
//!
//! # Responsibilities
//! - Short-circuit cross-origin (native) and same-URL (no-op) targets
//! - Keep at most one stack request in flight, aborting the older one
//! - Apply payloads atomically or fall back to a native navigation
//! - Replay history snapshots on back/forward without the network

use std::cell::RefCell;

use futures_util::future::{AbortHandle, Abortable};
use url::Url;

use crate::client::apply::{apply_frames, apply_snapshot, ApplyError};
use crate::client::fetch::{FetchError, StackFetcher, StackRequest};
use crate::client::host::{BrowserHost, ScrollPosition};
use crate::client::snapshot::ClientSnapshot;
use crate::protocol::PayloadError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing one.
    pub replace: bool,
}

/// Why a navigation ended in a native page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    CrossOrigin,
    Fetch(FetchError),
    Payload(PayloadError),
    Apply(ApplyError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The payload or snapshot was applied in place.
    Applied,
    /// Target equals the current URL.
    Unchanged,
    /// A newer navigation aborted this one; nothing was applied.
    Superseded,
    /// Handed to the browser as a full page load.
    FullNavigation(FallbackReason),
}

#[derive(Debug, Default)]
struct RouterState {
    in_flight: Option<AbortHandle>,
    generation: u64,
    current_route_path: Option<String>,
}

/// Client-side navigation over a [`BrowserHost`] and a [`StackFetcher`].
pub struct ClientRouter<H, F> {
    host: H,
    fetcher: F,
    state: RefCell<RouterState>,
}

impl<H: BrowserHost, F: StackFetcher> ClientRouter<H, F> {
    pub fn new(host: H, fetcher: F) -> Self {
        let current_route_path = host
            .boundaries()
            .last()
            .filter(|b| b.id.is_route())
            .map(|b| b.id.scope.clone());
        Self {
            host,
            fetcher,
            state: RefCell::new(RouterState {
                current_route_path,
                ..RouterState::default()
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn current_route_path(&self) -> Option<String> {
        self.state.borrow().current_route_path.clone()
    }

    /// Snapshot the initial document into the current history entry.
    pub fn record_initial_snapshot(&self) {
        let location = self.host.location();
        if let Some(snapshot) = ClientSnapshot::capture(&self.host, &location, self.host.scroll()) {
            self.state.borrow_mut().current_route_path = Some(snapshot.route_path.clone());
            self.host.replace_state(snapshot.to_state(), &location);
        }
    }

    pub async fn navigate(&self, target: &Url, options: NavigateOptions) -> NavigationOutcome {
        let location = self.host.location();
        if target.origin() != location.origin() {
            self.host.assign_location(target);
            return NavigationOutcome::FullNavigation(FallbackReason::CrossOrigin);
        }
        if *target == location {
            return NavigationOutcome::Unchanged;
        }

        self.persist_scroll();
        self.fetch_and_apply(target, options).await
    }

    /// Handle a `popstate` carrying `state` (location already updated).
    pub async fn on_popstate(&self, state: Option<serde_json::Value>) -> NavigationOutcome {
        self.cancel_in_flight();

        let snapshot = state.as_ref().and_then(ClientSnapshot::from_state);
        let Some(snapshot) = snapshot else {
            tracing::debug!("No usable snapshot in history entry; refetching");
            let location = self.host.location();
            return self
                .fetch_and_apply(&location, NavigateOptions { replace: true })
                .await;
        };

        match apply_snapshot(&self.host, &snapshot.frames) {
            Ok(()) => {
                self.state.borrow_mut().current_route_path = Some(snapshot.route_path);
                self.host.scroll_to(snapshot.scroll);
                NavigationOutcome::Applied
            }
            Err(e) => self.fall_back(&self.host.location(), FallbackReason::Apply(e)),
        }
    }

    async fn fetch_and_apply(&self, target: &Url, options: NavigateOptions) -> NavigationOutcome {
        let live_versions: Vec<u64> = self.host.boundaries().iter().map(|b| b.version).collect();
        let current = self.current_route_path();
        let request = StackRequest::new(target, current.as_deref(), &live_versions);

        let (handle, registration) = AbortHandle::new_pair();
        let generation = {
            let mut state = self.state.borrow_mut();
            if let Some(previous) = state.in_flight.replace(handle) {
                previous.abort();
            }
            state.generation += 1;
            state.generation
        };

        let result = Abortable::new(self.fetcher.fetch(request), registration).await;

        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                return NavigationOutcome::Superseded;
            }
            state.in_flight = None;
        }

        let payload = match result {
            Err(_aborted) => return NavigationOutcome::Superseded,
            Ok(Err(e)) => return self.fall_back(target, FallbackReason::Fetch(e)),
            Ok(Ok(payload)) => payload,
        };
        if let Err(e) = payload.validate() {
            return self.fall_back(target, FallbackReason::Payload(e));
        }
        if let Err(e) = apply_frames(&self.host, &payload.frames) {
            return self.fall_back(target, FallbackReason::Apply(e));
        }

        self.state.borrow_mut().current_route_path = Some(payload.route_path.clone());
        if let Some(snapshot) = ClientSnapshot::capture(&self.host, target, ScrollPosition::TOP) {
            if options.replace {
                self.host.replace_state(snapshot.to_state(), target);
            } else {
                self.host.push_state(snapshot.to_state(), target);
            }
        }
        self.host.scroll_to(ScrollPosition::TOP);

        tracing::debug!(route = %payload.route_path, frames = payload.frames.len(), "Navigation applied");
        NavigationOutcome::Applied
    }

    /// Store the current scroll offsets in the current history entry.
    fn persist_scroll(&self) {
        let location = self.host.location();
        let scroll = self.host.scroll();
        let snapshot = self
            .host
            .history_state()
            .as_ref()
            .and_then(ClientSnapshot::from_state)
            .map(|snapshot| ClientSnapshot { scroll, ..snapshot })
            .or_else(|| ClientSnapshot::capture(&self.host, &location, scroll));

        if let Some(snapshot) = snapshot {
            self.host.replace_state(snapshot.to_state(), &location);
        }
    }

    fn cancel_in_flight(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(previous) = state.in_flight.take() {
            previous.abort();
        }
        state.generation += 1;
    }

    fn fall_back(&self, target: &Url, reason: FallbackReason) -> NavigationOutcome {
        tracing::warn!(target = %target, reason = ?reason, "Falling back to full navigation");
        self.host.assign_location(target);
        NavigationOutcome::FullNavigation(reason)
    }
}
