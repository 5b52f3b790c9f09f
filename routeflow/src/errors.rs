//! Error types for the routeflow engine.
//!
//! Every failure a run can end with is a [`RouterError`]. The driver hands it
//! back inside a [`RunFailure`] together with the terminal request, so the
//! caller can always inspect partial payload state.

use crate::core::Request;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Separator placed between transition names in a cyclic call trace.
pub const STAGE_SEPARATOR: &str = " -> ";

/// The main error type for routeflow runs.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The run was rejected before any transition executed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A run option failed while being applied.
    #[error("Run option failed: {0}")]
    Option(#[source] anyhow::Error),

    /// A transition was entered twice within one run.
    #[error("{0}")]
    Cyclic(#[from] CyclicError),

    /// A transition reported a failure. Displayed verbatim.
    #[error(transparent)]
    Transition(anyhow::Error),

    /// A pre-wrap or post-wrap hook rejected a transition.
    #[error("{phase} hook failed around transition '{stage}': {source}")]
    Hook {
        /// The transition being wrapped.
        stage: String,
        /// Which side of the transition the hook ran on.
        phase: HookPhase,
        /// The hook's error.
        #[source]
        source: anyhow::Error,
    },

    /// The configured step budget ran out.
    #[error("Step budget of {limit} transitions exceeded")]
    StepBudgetExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// The driver was asked to execute a missing transition.
    #[error("Internal error: no transition to execute")]
    MissingTransition,
}

impl RouterError {
    /// Wraps a user-reported failure.
    pub fn transition(err: impl Into<anyhow::Error>) -> Self {
        Self::Transition(err.into())
    }

    /// Returns true for errors raised before any transition executed.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Option(_))
    }

    /// Returns the cyclic error, if this is one.
    #[must_use]
    pub fn as_cyclic(&self) -> Option<&CyclicError> {
        match self {
            Self::Cyclic(err) => Some(err),
            _ => None,
        }
    }

    /// Short machine-readable kind, used in logs and span fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Option(_) => "option",
            Self::Cyclic(_) => "cyclic",
            Self::Transition(_) => "transition",
            Self::Hook { .. } => "hook",
            Self::StepBudgetExceeded { .. } => "step_budget",
            Self::MissingTransition => "internal",
        }
    }
}

/// Side of a transition a hook runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Before the transition.
    PreWrap,
    /// After the transition.
    PostWrap,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreWrap => write!(f, "pre-wrap"),
            Self::PostWrap => write!(f, "post-wrap"),
        }
    }
}

/// Which precondition of a run was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// The run name was empty or whitespace.
    BlankName,
    /// The request carried no context.
    MissingContext,
    /// The request had no initial transition.
    MissingTransition,
    /// The request already carried an error.
    PresetError,
}

/// Error raised when a run is rejected before executing.
#[derive(Debug, Clone, Error)]
#[error("Invalid run '{run}': {message}")]
pub struct ValidationError {
    /// Which check failed.
    pub kind: ValidationKind,
    /// The run name as supplied.
    pub run: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(kind: ValidationKind, run: impl Into<String>) -> Self {
        let message = match kind {
            ValidationKind::BlankName => "run name must not be blank",
            ValidationKind::MissingContext => "request has no context",
            ValidationKind::MissingTransition => "request has no initial transition",
            ValidationKind::PresetError => "request already carries an error",
        };
        Self {
            kind,
            run: run.into(),
            message: message.to_string(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("run".to_string(), serde_json::Value::String(self.run.clone()));
        map.insert(
            "kind".to_string(),
            serde_json::Value::String(format!("{:?}", self.kind)),
        );
        map.insert(
            "message".to_string(),
            serde_json::Value::String(self.message.clone()),
        );
        map
    }
}

/// Error raised when a transition name repeats within one run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cyclic transition call detected: {stages}")]
pub struct CyclicError {
    /// Ordered call trace up to and including the repeated name.
    pub stages: String,
}

impl CyclicError {
    /// Builds the error from the visited names plus the repeated one.
    #[must_use]
    pub fn from_trace<S: AsRef<str>>(visited: &[S], repeated: &str) -> Self {
        let mut stages = String::new();
        for name in visited {
            stages.push_str(name.as_ref());
            stages.push_str(STAGE_SEPARATOR);
        }
        stages.push_str(repeated);
        Self { stages }
    }

    /// Splits the trace back into individual names.
    #[must_use]
    pub fn path(&self) -> Vec<&str> {
        self.stages.split(STAGE_SEPARATOR).collect()
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "stages".to_string(),
            serde_json::Value::String(self.stages.clone()),
        );
        map.insert(
            "path".to_string(),
            serde_json::Value::Array(
                self.path()
                    .into_iter()
                    .map(|s| serde_json::Value::String(s.to_string()))
                    .collect(),
            ),
        );
        map
    }
}

/// A failed run: the terminal request together with the error that ended it.
///
/// The error is moved out of the request, so `request().err()` is `None`.
pub struct RunFailure<T> {
    request: Request<T>,
    error: RouterError,
}

impl<T> RunFailure<T> {
    pub(crate) fn new(request: Request<T>, error: RouterError) -> Self {
        Self { request, error }
    }

    /// Returns the error that ended the run.
    #[must_use]
    pub fn error(&self) -> &RouterError {
        &self.error
    }

    /// Returns the terminal request.
    #[must_use]
    pub fn request(&self) -> &Request<T> {
        &self.request
    }

    /// Consumes the failure, yielding the terminal request.
    #[must_use]
    pub fn into_request(self) -> Request<T> {
        self.request
    }

    /// Consumes the failure, yielding the request and the error.
    #[must_use]
    pub fn into_parts(self) -> (Request<T>, RouterError) {
        (self.request, self.error)
    }

    /// Returns true if the run was stopped by the cyclic detector.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        self.error.as_cyclic().is_some()
    }

    /// Returns true if the run never started executing transitions.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.error.is_validation()
    }
}

impl<T> fmt::Debug for RunFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunFailure")
            .field("error", &self.error)
            .field("pending_defers", &self.request.pending_defers())
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for RunFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<T> std::error::Error for RunFailure<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
