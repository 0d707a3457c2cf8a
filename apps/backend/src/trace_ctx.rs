//! Task-local request context for the web boundary.
//!
//! `RequestTrace` opens the scope; anything running inside the request future
//! (handlers, services, error rendering) can read the trace id without it being
//! threaded through every signature. Outside a request the id is `"unknown"`.

use std::future::Future;

use tokio::task_local;

const UNKNOWN: &str = "unknown";

task_local! {
    static TRACE_ID: String;
}

pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}
