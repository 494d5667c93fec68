//! Quote-refetch debouncer.
//!
//! Holds at most one pending request. Each schedule replaces the previous one
//! and restarts the quiet period, so the quote provider only ever sees the
//! amount the user settled on.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::types::QuoteRequest;

#[derive(Debug)]
pub struct QuoteDebouncer {
    delay: Duration,
    pending: Option<(QuoteRequest, Instant)>,
}

impl QuoteDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending request and restart the quiet period at `now`.
    pub fn schedule(&mut self, request: QuoteRequest, now: Instant) {
        trace!(amount = %request.amount, "quote refetch scheduled");
        self.pending = Some((request, now));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending request once `delay` has passed since it was
    /// scheduled.
    pub fn poll(&mut self, now: Instant) -> Option<QuoteRequest> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if ready {
            self.pending.take().map(|(request, _)| request)
        } else {
            None
        }
    }
}
