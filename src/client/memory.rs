//! Headless [`BrowserHost`] keeping the document and history in memory.

use std::cell::RefCell;

use url::Url;

use crate::client::host::{BrowserHost, LiveBoundary, ScrollPosition};

/// One entry of the in-memory session history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: Url,
    pub state: Option<serde_json::Value>,
}

#[derive(Debug)]
struct MemoryState {
    location: Url,
    boundaries: Vec<LiveBoundary>,
    scroll: ScrollPosition,
    history: Vec<HistoryEntry>,
    index: usize,
    hard_navigations: Vec<Url>,
    mutations: usize,
}

#[derive(Debug)]
pub struct MemoryHost {
    state: RefCell<MemoryState>,
}

impl MemoryHost {
    pub fn new(location: Url, boundaries: Vec<LiveBoundary>) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                history: vec![HistoryEntry {
                    url: location.clone(),
                    state: None,
                }],
                location,
                boundaries,
                scroll: ScrollPosition::TOP,
                index: 0,
                hard_navigations: Vec::new(),
                mutations: 0,
            }),
        }
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.borrow().history.clone()
    }

    pub fn history_index(&self) -> usize {
        self.state.borrow().index
    }

    /// Full-page navigations requested so far.
    pub fn hard_navigations(&self) -> Vec<Url> {
        self.state.borrow().hard_navigations.clone()
    }

    /// Boundary replacements and appends so far.
    pub fn mutations(&self) -> usize {
        self.state.borrow().mutations
    }

    /// Move through history like back/forward; returns the entry's state,
    /// or `None` when `delta` leaves the history.
    pub fn go(&self, delta: isize) -> Option<Option<serde_json::Value>> {
        let mut state = self.state.borrow_mut();
        let index = state.index.checked_add_signed(delta)?;
        let entry = state.history.get(index)?.clone();
        state.index = index;
        state.location = entry.url;
        Some(entry.state)
    }
}

impl BrowserHost for MemoryHost {
    fn location(&self) -> Url {
        self.state.borrow().location.clone()
    }

    fn boundaries(&self) -> Vec<LiveBoundary> {
        self.state.borrow().boundaries.clone()
    }

    fn truncate_boundaries(&self, len: usize) {
        self.state.borrow_mut().boundaries.truncate(len);
    }

    fn replace_boundary(&self, index: usize, boundary: LiveBoundary) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.boundaries.get_mut(index) {
            *slot = boundary;
            state.mutations += 1;
        }
    }

    fn append_boundary(&self, boundary: LiveBoundary) {
        let mut state = self.state.borrow_mut();
        state.boundaries.push(boundary);
        state.mutations += 1;
    }

    fn scroll(&self) -> ScrollPosition {
        self.state.borrow().scroll
    }

    fn scroll_to(&self, position: ScrollPosition) {
        self.state.borrow_mut().scroll = position;
    }

    fn history_state(&self) -> Option<serde_json::Value> {
        let state = self.state.borrow();
        state.history.get(state.index).and_then(|e| e.state.clone())
    }

    fn push_state(&self, value: serde_json::Value, url: &Url) {
        let mut state = self.state.borrow_mut();
        let next = state.index + 1;
        state.history.truncate(next);
        state.history.push(HistoryEntry {
            url: url.clone(),
            state: Some(value),
        });
        state.index = next;
        state.location = url.clone();
    }

    fn replace_state(&self, value: serde_json::Value, url: &Url) {
        let mut state = self.state.borrow_mut();
        let index = state.index;
        state.history[index] = HistoryEntry {
            url: url.clone(),
            state: Some(value),
        };
        state.location = url.clone();
    }

    fn assign_location(&self, url: &Url) {
        let mut state = self.state.borrow_mut();
        state.hard_navigations.push(url.clone());
        state.location = url.clone();
    }
}
