//! Transition trait and closure adapters.
//!
//! A transition is one step of a routed pipeline. It receives the request by
//! value and hands it back, having decided where the run goes next.

use super::Request;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// A shared handle to a transition, as stored in [`Request::next`].
pub type State<T> = Arc<dyn Transition<T>>;

/// Trait for pipeline transitions.
///
/// `name` is the transition's structural identity: the cyclic detector keys
/// on it, and spans and logs are labelled with it. Two instances with the
/// same name count as the same transition.
#[async_trait]
pub trait Transition<T>: Send + Sync {
    /// Returns the name of the transition.
    fn name(&self) -> &str;

    /// Executes the transition.
    ///
    /// Implementations route with [`Request::route_to`], finish with
    /// [`Request::stop`], or abort with [`Request::fail`]. Leaving the
    /// routing untouched re-enters this same transition.
    async fn execute(&self, req: Request<T>) -> Request<T>;
}

/// A transition backed by a synchronous closure.
pub struct FnTransition<F> {
    name: String,
    func: F,
}

impl<F> FnTransition<F> {
    /// Creates a new function-based transition.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnTransition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransition")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<T, F> Transition<T> for FnTransition<F>
where
    T: Send + 'static,
    F: Fn(Request<T>) -> Request<T> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, req: Request<T>) -> Request<T> {
        (self.func)(req)
    }
}

type BoxedStep<T> = Box<dyn Fn(Request<T>) -> BoxFuture<'static, Request<T>> + Send + Sync>;

/// A transition backed by an async closure.
pub struct AsyncFnTransition<T> {
    name: String,
    func: BoxedStep<T>,
}

impl<T: Send + 'static> AsyncFnTransition<T> {
    /// Creates a new async function-based transition.
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Request<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Request<T>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(move |req: Request<T>| func(req).boxed()),
        }
    }
}

impl<T> Debug for AsyncFnTransition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnTransition")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> Transition<T> for AsyncFnTransition<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, req: Request<T>) -> Request<T> {
        (self.func)(req).await
    }
}

/// Wraps a synchronous closure as a shareable transition.
pub fn transition<T, F>(name: impl Into<String>, func: F) -> State<T>
where
    T: Send + 'static,
    F: Fn(Request<T>) -> Request<T> + Send + Sync + 'static,
{
    Arc::new(FnTransition::new(name, func))
}

/// Wraps an async closure as a shareable transition.
pub fn async_transition<T, F, Fut>(name: impl Into<String>, func: F) -> State<T>
where
    T: Send + 'static,
    F: Fn(Request<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Request<T>> + Send + 'static,
{
    Arc::new(AsyncFnTransition::new(name, func))
}
