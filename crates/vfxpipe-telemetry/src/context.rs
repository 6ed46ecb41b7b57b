//! Span and task-local context for the server process.
//!
//! The application span is entered once at start-up and never left. Each HTTP
//! request runs inside a task-local [`RequestScope`] so error paths deep in a
//! handler can tag logs with the caller's request id and route.

use std::future::Future;
use std::sync::Arc;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

tokio::task_local! {
    static REQUEST_SCOPE: RequestScope;
}

#[derive(Clone)]
struct RequestScope {
    request_id: Arc<str>,
    route: Arc<str>,
}

fn read_scope(field: impl FnOnce(&RequestScope) -> &str) -> Option<String> {
    REQUEST_SCOPE.try_with(|scope| field(scope).to_owned()).ok()
}

/// Keeps the `vfxpipe` process span entered while alive.
pub struct GlobalContextGuard {
    _entered: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter a process span tagged with `mode` and the build identifier.
    ///
    /// The span is leaked; create one guard per process.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "vfxpipe",
            mode = %mode,
            build_sha = %build_sha()
        )));
        Self {
            _entered: span.enter(),
        }
    }
}

/// Run `fut` with a request id and route visible to [`current_request_id`]
/// and [`current_route`].
pub async fn with_request_context<Fut, T>(
    request_id: impl Into<String>,
    route: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let (request_id, route): (String, String) = (request_id.into(), route.into());
    let scope = RequestScope {
        request_id: Arc::from(request_id),
        route: Arc::from(route),
    };
    REQUEST_SCOPE.scope(scope, fut).await
}

/// Request id of the request being served on this task.
#[must_use]
pub fn current_request_id() -> Option<String> {
    read_scope(|scope| scope.request_id.as_ref())
}

/// Matched route of the request being served on this task.
#[must_use]
pub fn current_route() -> Option<String> {
    read_scope(|scope| scope.route.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_is_visible_only_inside_the_future() {
        assert!(current_request_id().is_none());
        let seen = with_request_context("req-7", "/get_files_folders", async {
            (current_request_id(), current_route())
        })
        .await;
        assert_eq!(seen.0.as_deref(), Some("req-7"));
        assert_eq!(seen.1.as_deref(), Some("/get_files_folders"));
        assert!(current_route().is_none());
    }

    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_request() {
        let inner = with_request_context("outer", "/ingest_request", async {
            with_request_context("inner", "/ping", async { current_request_id() }).await
        })
        .await;
        assert_eq!(inner.as_deref(), Some("inner"));
    }

    #[test]
    fn process_guard_can_be_dropped() {
        drop(GlobalContextGuard::new("test"));
    }
}
