//! Trace IDs for correlating the requests of one user action
//!
//! A trace ID is scoped to a future with [`in_trace`]; every HTTP request
//! made inside it carries the ID in the `x-trace-id` header and in its logs.
//! Unlike a thread-local, the scope follows the task across `.await` points
//! and worker threads.

use std::future::Future;

use uuid::Uuid;

tokio::task_local! {
    static TRACE_ID: String;
}

/// Generate a new trace ID
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// The trace ID of the enclosing [`in_trace`] scope, if any
pub fn current_trace_id() -> Option<String> {
    TRACE_ID.try_with(Clone::clone).ok()
}

/// Run `fut` with `trace_id` as its trace context
pub async fn in_trace<F: Future>(trace_id: String, fut: F) -> F::Output {
    TRACE_ID.scope(trace_id, fut).await
}

/// Run `fut` under a fresh trace ID, passed to the closure
pub async fn with_trace_id<F, Fut, R>(f: F) -> R
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = R>,
{
    let trace_id = new_trace_id();
    let result = in_trace(trace_id.clone(), f(trace_id.clone())).await;
    tracing::debug!(trace_id = %trace_id, "Trace context completed");
    result
}
