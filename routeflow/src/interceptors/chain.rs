//! Wrap hooks and the ordered chain that runs them.

use crate::core::{Request, State};
use crate::errors::{HookPhase, RouterError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for interceptors invoked around every transition.
///
/// The same trait serves both sides: a hook registered as pre-wrap runs
/// before the transition, one registered as post-wrap runs after it on the
/// returned request. Returning an error aborts the run.
#[async_trait]
pub trait WrapHook<T>: Send + Sync {
    /// Invoked with the request and the transition being wrapped.
    async fn wrap(&self, req: &mut Request<T>, state: &State<T>) -> anyhow::Result<()>;
}

/// A hook backed by a synchronous closure.
pub struct FnHook<F> {
    func: F,
}

impl<F> FnHook<F> {
    /// Creates a new function-based hook.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<T, F> WrapHook<T> for FnHook<F>
where
    T: Send + 'static,
    F: Fn(&mut Request<T>, &State<T>) -> anyhow::Result<()> + Send + Sync,
{
    async fn wrap(&self, req: &mut Request<T>, state: &State<T>) -> anyhow::Result<()> {
        (self.func)(req, state)
    }
}

/// Wraps a closure as a shareable hook.
pub fn hook<T, F>(func: F) -> Arc<dyn WrapHook<T>>
where
    T: Send + 'static,
    F: Fn(&mut Request<T>, &State<T>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(FnHook::new(func))
}

/// An ordered list of hooks for one side of a transition.
pub struct HookChain<T> {
    hooks: Vec<Arc<dyn WrapHook<T>>>,
}

impl<T> HookChain<T> {
    /// Creates a new empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Appends hooks, keeping registration order.
    pub fn extend(&mut self, hooks: impl IntoIterator<Item = Arc<dyn WrapHook<T>>>) {
        self.hooks.extend(hooks);
    }

    /// Runs every hook in registration order, stopping at the first error.
    pub async fn run(
        &self,
        phase: HookPhase,
        req: &mut Request<T>,
        state: &State<T>,
    ) -> Result<(), RouterError> {
        for hook in &self.hooks {
            if let Err(source) = hook.wrap(req, state).await {
                return Err(RouterError::Hook {
                    stage: state.name().to_string(),
                    phase,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Returns the number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<T> Clone for HookChain<T> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<T> Default for HookChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HookChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("len", &self.hooks.len())
            .finish()
    }
}
