//! The request container threaded through every transition.

use super::State;
use crate::context::RunContext;
use crate::engine::RunSettings;
use crate::errors::RouterError;
use std::fmt::{self, Debug};

/// A compensating action run after the main loop.
///
/// Receives the context, the current payload, and the final error (if any),
/// and returns the payload handed to the next deferred action.
pub type DeferFn<T> = Box<dyn FnOnce(&RunContext, T, Option<&RouterError>) -> T + Send>;

/// The per-run carrier of payload, routing pointer, error, and deferred
/// actions.
///
/// A request moves by value through each transition. Routing methods consume
/// and return it so a transition body reads as a chain:
///
/// ```rust,ignore
/// let step = transition("charge", |mut req: Request<Order>| {
///     req.data.charged = true;
///     req.defer(|_ctx, order, err| if err.is_some() { order.refund() } else { order })
///         .route_to(ship.clone())
/// });
/// ```
pub struct Request<T> {
    pub(crate) context: Option<RunContext>,
    /// The caller's payload.
    pub data: T,
    pub(crate) err: Option<RouterError>,
    pub(crate) next: Option<State<T>>,
    pub(crate) defers: Vec<DeferFn<T>>,
    pub(crate) settings: RunSettings<T>,
}

impl<T> Request<T> {
    /// Creates a request with no context and no initial transition.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            context: None,
            data,
            err: None,
            next: None,
            defers: Vec::new(),
            settings: RunSettings::default(),
        }
    }

    /// Creates a request ready to run: context and first transition set.
    #[must_use]
    pub fn start(context: RunContext, data: T, first: State<T>) -> Self {
        Self::new(data).with_context(context).route_to(first)
    }

    /// Sets the context.
    #[must_use]
    pub fn with_context(mut self, context: RunContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Routes the run to `next`.
    #[must_use]
    pub fn route_to(mut self, next: State<T>) -> Self {
        self.set_next(Some(next));
        self
    }

    /// Ends the run normally after the current transition.
    #[must_use]
    pub fn stop(mut self) -> Self {
        self.next = None;
        self
    }

    /// Ends the run with an error.
    #[must_use]
    pub fn fail(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.set_err(RouterError::transition(err));
        self
    }

    /// Registers a compensating action.
    #[must_use]
    pub fn defer<F>(mut self, action: F) -> Self
    where
        F: FnOnce(&RunContext, T, Option<&RouterError>) -> T + Send + 'static,
    {
        self.defers.push(Box::new(action));
        self
    }

    /// Replaces the routing pointer in place.
    ///
    /// The driver clears it again after any step that leaves an error set.
    pub fn set_next(&mut self, next: Option<State<T>>) {
        self.next = next;
    }

    /// Records an error and clears the routing pointer.
    pub(crate) fn set_err(&mut self, err: RouterError) {
        self.err = Some(err);
        self.next = None;
    }

    /// Returns the context, if set.
    #[must_use]
    pub fn context(&self) -> Option<&RunContext> {
        self.context.as_ref()
    }

    /// Returns the payload.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the payload mutably.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// Consumes the request, yielding the payload.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns the error, if set.
    #[must_use]
    pub fn err(&self) -> Option<&RouterError> {
        self.err.as_ref()
    }

    /// Returns the next transition, if any.
    #[must_use]
    pub fn next(&self) -> Option<&State<T>> {
        self.next.as_ref()
    }

    /// Returns the next transition's name, if any.
    #[must_use]
    pub fn next_name(&self) -> Option<&str> {
        self.next.as_ref().map(|state| state.name())
    }

    /// Returns true when the run would not execute another transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.next.is_none() || self.err.is_some()
    }

    /// Returns the number of deferred actions not yet executed.
    #[must_use]
    pub fn pending_defers(&self) -> usize {
        self.defers.len()
    }
}

impl<T: Debug> Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("data", &self.data)
            .field("err", &self.err)
            .field("next", &self.next_name())
            .field("pending_defers", &self.defers.len())
            .field("has_context", &self.context.is_some())
            .finish()
    }
}
