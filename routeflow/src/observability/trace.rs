//! Trace integration for runs and transitions.
//!
//! Spans are only created when the caller's span is recorded by a
//! subscriber. Otherwise every operation here is a no-op, so a run behaves
//! identically with tracing on or off.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::field::Empty;
use tracing::Span;

/// Best-effort payload renderer used in trace events.
pub type SnapshotFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Placeholder used when no snapshot function is configured.
pub const SNAPSHOT_DISABLED: &str = "<snapshot disabled>";

/// Renders `data` as JSON, substituting a placeholder on failure.
pub fn to_debug_string<T: Serialize>(data: &T) -> String {
    serde_json::to_string(data)
        .unwrap_or_else(|err| format!("<snapshot unavailable: {err}>"))
}

/// Snapshot function backed by [`to_debug_string`].
pub fn json_snapshot<T: Serialize + 'static>() -> SnapshotFn<T> {
    Arc::new(|data: &T| to_debug_string(data))
}

/// The span covering one run.
#[derive(Debug, Clone)]
pub struct RunSpan {
    span: Span,
}

impl RunSpan {
    /// Opens a run span under `parent`, or a disabled span if `parent` is not
    /// recorded.
    #[must_use]
    pub fn start(parent: &Span, run: &str) -> Self {
        if parent.is_disabled() {
            return Self::disabled();
        }
        let span = tracing::info_span!(
            parent: parent,
            "routeflow.run",
            run = %run,
            otel.status_code = Empty,
            otel.status_message = Empty,
        );
        Self { span }
    }

    /// A span on which every operation is a no-op.
    #[must_use]
    pub fn disabled() -> Self {
        Self { span: Span::none() }
    }

    /// Returns true if this span is recorded.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        !self.span.is_disabled()
    }

    /// Returns the underlying span.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Opens a child span for one transition.
    #[must_use]
    pub fn child(&self, transition: &str) -> Span {
        if !self.is_recording() {
            return Span::none();
        }
        tracing::info_span!(
            parent: &self.span,
            "routeflow.transition",
            transition = %transition,
        )
    }

    /// Emits the run start event.
    pub fn start_event(&self, snapshot: &str) {
        if self.is_recording() {
            tracing::info!(parent: &self.span, snapshot, "run.start");
        }
    }

    /// Emits the run end event.
    pub fn end_event(&self, snapshot: &str, elapsed_ms: f64) {
        if self.is_recording() {
            tracing::info!(parent: &self.span, snapshot, elapsed_ms, "run.end");
        }
    }

    /// Marks the span status as error.
    pub fn set_error(&self, message: &str) {
        if self.is_recording() {
            self.span.record("otel.status_code", "ERROR");
            self.span.record("otel.status_message", message);
        }
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}
