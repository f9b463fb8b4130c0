//! Latest-request-wins guard for asynchronously produced view results.
//!
//! # Invariants
//! - Tokens from one gate are strictly increasing.
//! - A view only applies results carrying the most recently issued token.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generation number handed out when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Issues request tokens and remembers the latest one.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier token.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// View contents guarded by a `RequestGate`.
#[derive(Debug)]
pub struct FilteredView<T> {
    gate: RequestGate,
    items: Vec<T>,
    applied: Option<RequestToken>,
}

impl<T> Default for FilteredView<T> {
    fn default() -> Self {
        Self {
            gate: RequestGate::new(),
            items: Vec::new(),
            applied: None,
        }
    }
}

impl<T> FilteredView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request for this view.
    pub fn issue(&self) -> RequestToken {
        self.gate.issue()
    }

    /// Applies `items` when `token` is the latest request. Returns whether
    /// the result was applied; stale results are dropped.
    pub fn resolve(&mut self, token: RequestToken, items: Vec<T>) -> bool {
        if !self.gate.is_current(token) {
            log::debug!(
                "event=view_resolve module=request_gate status=stale token={} count={}",
                token.id(),
                items.len()
            );
            return false;
        }
        self.items = items;
        self.applied = Some(token);
        true
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Token of the result currently shown.
    pub fn applied(&self) -> Option<RequestToken> {
        self.applied
    }
}
