//! Spy transitions and recording hooks for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{Request, State, Transition};
use crate::interceptors::WrapHook;

/// A shared, ordered log of labels.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Returns a copy of all entries in order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// A transition that counts its invocations and delegates to a closure.
pub struct SpyTransition<F> {
    name: String,
    calls: AtomicUsize,
    log: Option<CallLog>,
    func: F,
}

impl<F> SpyTransition<F> {
    /// Creates a new spy.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            calls: AtomicUsize::new(0),
            log: None,
            func,
        }
    }

    /// Also records the transition name into `log` on every call.
    #[must_use]
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Returns the number of times the transition was executed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> std::fmt::Debug for SpyTransition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpyTransition")
            .field("name", &self.name)
            .field("calls", &self.calls())
            .finish()
    }
}

#[async_trait]
impl<T, F> Transition<T> for SpyTransition<F>
where
    T: Send + 'static,
    F: Fn(Request<T>) -> Request<T> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, req: Request<T>) -> Request<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.push(self.name.clone());
        }
        (self.func)(req)
    }
}

/// Creates a spy that stops the run, returning both the spy and its state
/// handle.
pub fn stopping_spy<T: Send + 'static>(
    name: &str,
) -> (Arc<SpyTransition<fn(Request<T>) -> Request<T>>>, State<T>) {
    let spy = Arc::new(SpyTransition::new(name, Request::stop as fn(Request<T>) -> Request<T>));
    let state: State<T> = spy.clone();
    (spy, state)
}

/// A hook that records `"<label>:<transition>"` into a [`CallLog`].
#[derive(Debug, Clone)]
pub struct RecordingHook {
    label: String,
    log: CallLog,
    failure: Option<String>,
}

impl RecordingHook {
    /// Creates a hook that records and succeeds.
    #[must_use]
    pub fn new(label: impl Into<String>, log: CallLog) -> Self {
        Self {
            label: label.into(),
            log,
            failure: None,
        }
    }

    /// Creates a hook that records and then fails with `message`.
    #[must_use]
    pub fn failing(label: impl Into<String>, log: CallLog, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            log,
            failure: Some(message.into()),
        }
    }

    /// Converts into a shareable hook handle.
    pub fn shared<T: Send + 'static>(self) -> Arc<dyn WrapHook<T>> {
        Arc::new(self)
    }
}

#[async_trait]
impl<T: Send + 'static> WrapHook<T> for RecordingHook {
    async fn wrap(&self, _req: &mut Request<T>, state: &State<T>) -> anyhow::Result<()> {
        self.log.push(format!("{}:{}", self.label, state.name()));
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spy_counts_and_logs() {
        let log = CallLog::new();
        let spy = SpyTransition::new("spy", |req: Request<u8>| req.stop()).with_log(log.clone());

        let _ = spy.execute(Request::new(0)).await;
        let _ = spy.execute(Request::new(0)).await;

        assert_eq!(spy.calls(), 2);
        assert_eq!(log.entries(), vec!["spy", "spy"]);
    }

    #[tokio::test]
    async fn test_stopping_spy() {
        let (spy, state) = stopping_spy::<u8>("halt");
        let req = state.execute(Request::new(0).route_to(state.clone())).await;
        assert!(req.next().is_none());
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn test_recording_hook_failure() {
        let log = CallLog::new();
        let hook = RecordingHook::failing("pre", log.clone(), "nope").shared::<u8>();
        let (_, state) = stopping_spy::<u8>("step");

        let mut req = Request::new(0);
        let err = hook.wrap(&mut req, &state).await.unwrap_err();

        assert_eq!(err.to_string(), "nope");
        assert_eq!(log.entries(), vec!["pre:step"]);
    }
}
