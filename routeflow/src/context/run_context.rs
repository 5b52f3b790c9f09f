//! The execution context threaded through every run.

use super::CancelSignal;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::Span;
use uuid::Uuid;

/// Carries cancellation, deadline, identity, and the active trace span.
///
/// The caller builds the context; the engine only reads it, apart from
/// swapping in child spans while a run or a transition is executing.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: Uuid,
    created_at: DateTime<Utc>,
    cancel: CancelSignal,
    deadline: Option<Instant>,
    span: Span,
}

impl RunContext {
    /// Creates a context attached to the caller's current span.
    #[must_use]
    pub fn new() -> Self {
        Self::with_span(Span::current())
    }

    /// Creates a context with tracing switched off.
    #[must_use]
    pub fn detached() -> Self {
        Self::with_span(Span::none())
    }

    /// Creates a context whose active span is `span`.
    #[must_use]
    pub fn with_span(span: Span) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            cancel: CancelSignal::new(),
            deadline: None,
            span,
        }
    }

    /// Shares an existing cancellation signal.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a context with a fresh run ID that shares cancellation and
    /// deadline with this one.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            cancel: self.cancel.clone(),
            deadline: self.deadline,
            span: self.span.clone(),
        }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns when the context was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the cancellation signal.
    #[must_use]
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns the time left before the deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns true if the context is cancelled or past its deadline.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.is_expired()
    }

    /// Returns the active span.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Returns true if the active span is recorded by a subscriber.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        !self.span.is_disabled()
    }

    /// Swaps the active span, returning the previous one.
    pub(crate) fn replace_span(&mut self, span: Span) -> Span {
        std::mem::replace(&mut self.span, span)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
