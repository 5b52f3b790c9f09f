//! Built-in hooks for per-transition timing and logging.

use super::WrapHook;
use crate::core::{Request, State};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Duration of one transition invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTiming {
    /// Transition name.
    pub name: String,
    /// Wall-clock time between pre-wrap and post-wrap.
    pub duration: Duration,
}

#[derive(Default)]
struct TimingState {
    pending: Option<(String, Instant)>,
    records: Vec<StageTiming>,
}

/// Collects transition durations through a pre-wrap/post-wrap hook pair.
///
/// Use one instance per run: transitions within a run are sequential, so a
/// single pending slot is enough.
#[derive(Clone, Default)]
pub struct StageTimings {
    state: Arc<Mutex<TimingState>>,
}

impl StageTimings {
    /// Creates an empty timing table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook that starts the clock; register it as pre-wrap.
    pub fn pre_hook<T: Send + 'static>(&self) -> Arc<dyn WrapHook<T>> {
        Arc::new(TimingHook {
            state: self.state.clone(),
            starts: true,
        })
    }

    /// Hook that stops the clock; register it as post-wrap.
    pub fn post_hook<T: Send + 'static>(&self) -> Arc<dyn WrapHook<T>> {
        Arc::new(TimingHook {
            state: self.state.clone(),
            starts: false,
        })
    }

    /// Returns the recorded timings in execution order.
    #[must_use]
    pub fn records(&self) -> Vec<StageTiming> {
        self.state.lock().records.clone()
    }

    /// Returns the sum of all recorded durations.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.state.lock().records.iter().map(|r| r.duration).sum()
    }
}

impl std::fmt::Debug for StageTimings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageTimings")
            .field("records", &self.state.lock().records.len())
            .finish()
    }
}

struct TimingHook {
    state: Arc<Mutex<TimingState>>,
    starts: bool,
}

#[async_trait]
impl<T: Send + 'static> WrapHook<T> for TimingHook {
    async fn wrap(&self, _req: &mut Request<T>, state: &State<T>) -> anyhow::Result<()> {
        let mut timing = self.state.lock();
        if self.starts {
            timing.pending = Some((state.name().to_string(), Instant::now()));
        } else if let Some((name, started)) = timing.pending.take() {
            timing.records.push(StageTiming {
                name,
                duration: started.elapsed(),
            });
        }
        Ok(())
    }
}

/// A hook that logs every transition it wraps.
#[derive(Debug, Clone, Default)]
pub struct LoggingHook {
    label: Option<String>,
}

impl LoggingHook {
    /// Creates a logging hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logging hook whose lines carry `label`.
    #[must_use]
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> WrapHook<T> for LoggingHook {
    async fn wrap(&self, req: &mut Request<T>, state: &State<T>) -> anyhow::Result<()> {
        let run_id = req.context().map(|ctx| ctx.run_id().to_string());
        match self.label.as_deref() {
            Some(label) => info!(transition = state.name(), label, ?run_id, "Transition wrapped"),
            None => debug!(transition = state.name(), ?run_id, "Transition wrapped"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transition;

    #[tokio::test]
    async fn test_timing_pair_records_duration() {
        let timings = StageTimings::new();
        let pre = timings.pre_hook::<u32>();
        let post = timings.post_hook::<u32>();
        let state = transition("slow", |req: Request<u32>| req.stop());

        let mut req = Request::new(0);
        pre.wrap(&mut req, &state).await.unwrap();
        std::thread::sleep(Duration::from_millis(5));
        post.wrap(&mut req, &state).await.unwrap();

        let records = timings.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "slow");
        assert!(records[0].duration >= Duration::from_millis(5));
        assert_eq!(timings.total(), records[0].duration);
    }

    #[tokio::test]
    async fn test_post_without_pre_records_nothing() {
        let timings = StageTimings::new();
        let post = timings.post_hook::<u32>();
        let state = transition("orphan", |req: Request<u32>| req);

        let mut req = Request::new(0);
        post.wrap(&mut req, &state).await.unwrap();
        assert!(timings.records().is_empty());
    }

    #[tokio::test]
    async fn test_logging_hook_never_fails() {
        let hook = LoggingHook::labelled("audit");
        let state = transition("step", |req: Request<u32>| req);
        let mut req = Request::new(0);
        assert!(WrapHook::wrap(&hook, &mut req, &state).await.is_ok());
    }
}
