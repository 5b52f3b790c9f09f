//! The run driver: validation, the routing loop, and deferred actions.

use super::ledger::{CycleLedger, LedgerPool};
use super::options::{RunOption, RunSettings};
use crate::core::{Request, State};
use crate::errors::{HookPhase, RouterError, RunFailure, ValidationError, ValidationKind};
use crate::observability::{RunSpan, SpanTimer, SNAPSHOT_DISABLED};
use tracing::{debug, info, warn, Instrument, Span};

/// Executes a routed run.
///
/// Validates `req`, applies `options`, then invokes transitions until one
/// stops the run or an error is set. Deferred actions run afterwards in
/// reverse registration order. On failure the terminal request is returned
/// inside the [`RunFailure`].
pub async fn run<T, I>(
    name: &str,
    mut req: Request<T>,
    options: I,
) -> Result<Request<T>, RunFailure<T>>
where
    T: Send + 'static,
    I: IntoIterator<Item = RunOption<T>>,
{
    if let Err(err) = validate(name, &req) {
        warn!(run = name, error = %err, "Run rejected");
        return Err(RunFailure::new(req, err.into()));
    }

    for option in options {
        if let Err(source) = option(&mut req) {
            warn!(run = name, error = %source, "Run option failed");
            return Err(RunFailure::new(req, RouterError::Option(source)));
        }
    }

    let settings = std::mem::take(&mut req.settings);
    let mut ledger = settings.cyclic_check.then(|| LedgerPool::global().checkout());

    let parent = req
        .context
        .as_ref()
        .map_or_else(Span::none, |ctx| ctx.span().clone());
    let run_span = RunSpan::start(&parent, name);
    let timer = SpanTimer::start();
    if run_span.is_recording() {
        run_span.start_event(&snapshot(&settings, &req.data));
    }
    let caller_span = enter_span(&mut req, &run_span, run_span.span().clone());

    let mut steps = 0_usize;
    while let Some(state) = req.next.clone() {
        let exhausted = settings.max_steps.filter(|&limit| steps >= limit);
        if let Some(limit) = exhausted {
            req.set_err(RouterError::StepBudgetExceeded { limit });
        } else {
            steps += 1;
            let visited = ledger.as_mut();
            req = step(name, req, Some(state.clone()), &settings, visited, &run_span).await;
        }

        if let Some(err) = req.err.as_ref() {
            let message = match exhausted {
                Some(limit) => format!(
                    "step budget of {limit} transitions exhausted before '{}'",
                    state.name()
                ),
                None => format!("transition '{}' failed: {err}", state.name()),
            };
            run_span.set_error(&message);
            if settings.log_stages {
                warn!(
                    run = name,
                    transition = state.name(),
                    kind = err.kind(),
                    error = %err,
                    "Transition failed"
                );
            }
            break;
        }
    }

    req = run_deferred(name, req, settings.log_stages);
    drop(ledger);

    if run_span.is_recording() {
        run_span.end_event(&snapshot(&settings, &req.data), timer.elapsed_ms());
    }
    enter_span(&mut req, &run_span, caller_span);

    if settings.log_stages {
        info!(
            run = name,
            steps,
            elapsed_ms = timer.elapsed_ms(),
            failed = req.err.is_some(),
            "Run finished"
        );
    }

    match req.err.take() {
        Some(err) => Err(RunFailure::new(req, err)),
        None => Ok(req),
    }
}

fn validate<T>(name: &str, req: &Request<T>) -> Result<(), ValidationError> {
    let kind = if name.trim().is_empty() {
        ValidationKind::BlankName
    } else if req.context.is_none() {
        ValidationKind::MissingContext
    } else if req.next.is_none() {
        ValidationKind::MissingTransition
    } else if req.err.is_some() {
        ValidationKind::PresetError
    } else {
        return Ok(());
    };
    Err(ValidationError::new(kind, name))
}

/// Executes one transition with its cycle check, hooks, and child span.
async fn step<T: Send + 'static>(
    run: &str,
    mut req: Request<T>,
    state: Option<State<T>>,
    settings: &RunSettings<T>,
    ledger: Option<&mut CycleLedger<'_>>,
    run_span: &RunSpan,
) -> Request<T> {
    let Some(state) = state else {
        req.set_err(RouterError::MissingTransition);
        return req;
    };

    if let Some(ledger) = ledger {
        if let Err(err) = ledger.visit(state.name()) {
            req.set_err(err.into());
            return req;
        }
    }

    if settings.log_stages {
        debug!(run, transition = state.name(), "Transition started");
    }
    let timer = SpanTimer::start();

    if run_span.is_recording() {
        let child = run_span.child(state.name());
        let parent = enter_span(&mut req, run_span, child.clone());
        req = execute_wrapped(req, &state, settings).instrument(child).await;
        enter_span(&mut req, run_span, parent);
    } else {
        req = execute_wrapped(req, &state, settings).await;
    }

    if settings.log_stages && req.err.is_none() {
        info!(
            run,
            transition = state.name(),
            next = req.next_name().unwrap_or("<stop>"),
            elapsed_ms = timer.elapsed_ms(),
            "Transition finished"
        );
    }
    req
}

async fn execute_wrapped<T: Send + 'static>(
    mut req: Request<T>,
    state: &State<T>,
    settings: &RunSettings<T>,
) -> Request<T> {
    if let Err(err) = settings.pre_wrap.run(HookPhase::PreWrap, &mut req, state).await {
        req.set_err(err);
        return req;
    }

    req = state.execute(req).await;
    if req.err.is_some() {
        req.next = None;
    }

    if let Err(err) = settings.post_wrap.run(HookPhase::PostWrap, &mut req, state).await {
        if req.err.is_some() {
            warn!(
                transition = state.name(),
                error = %err,
                "Post-wrap hook failed after transition error"
            );
        } else {
            req.set_err(err);
        }
    }
    if req.err.is_some() {
        req.next = None;
    }
    req
}

/// Runs deferred actions last-registered-first, threading the payload.
fn run_deferred<T>(run: &str, mut req: Request<T>, log: bool) -> Request<T> {
    let defers = std::mem::take(&mut req.defers);
    if defers.is_empty() {
        return req;
    }

    if log {
        debug!(run, count = defers.len(), failed = req.err.is_some(), "Running deferred actions");
    }
    let ctx = req.context.clone().unwrap_or_else(crate::context::RunContext::detached);
    for action in defers.into_iter().rev() {
        req.data = action(&ctx, req.data, req.err.as_ref());
    }
    req
}

/// Swaps the context span when the run is traced, returning the previous one.
fn enter_span<T>(req: &mut Request<T>, run_span: &RunSpan, span: Span) -> Span {
    if !run_span.is_recording() {
        return Span::none();
    }
    req.context
        .as_mut()
        .map_or_else(Span::none, |ctx| ctx.replace_span(span))
}

fn snapshot<T>(settings: &RunSettings<T>, data: &T) -> String {
    settings
        .snapshot
        .as_ref()
        .map_or_else(|| SNAPSHOT_DISABLED.to_string(), |render| render(data))
}
