//! Request counting middleware.
//!
//! Requests are labelled by their matched route template; anything the router
//! did not match is counted under a single `unmatched` label so stray paths
//! cannot grow the label set.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::response::Response;
use tower::{Layer, Service};
use tracing::debug;
use vfxpipe_telemetry::{Metrics, with_request_context};

use crate::http::constants::HEADER_REQUEST_ID;

const UNMATCHED_ROUTE: &str = "unmatched";

type BoxedResponseFuture<E> = Pin<Box<dyn Future<Output = Result<Response, E>> + Send>>;

#[derive(Clone)]
pub(crate) struct RequestCountLayer {
    metrics: Metrics,
}

impl RequestCountLayer {
    pub(crate) const fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for RequestCountLayer {
    type Service = RequestCount<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestCount {
            inner,
            metrics: self.metrics.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct RequestCount<S> {
    inner: S,
    metrics: Metrics,
}

fn route_label<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str)
        .to_string()
}

fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl<S, B> Service<Request<B>> for RequestCount<S>
where
    S: Service<Request<B>, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxedResponseFuture<S::Error>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let route = route_label(&request);
        let id = request_id(&request);
        let metrics = self.metrics.clone();
        let pending = self.inner.call(request);

        Box::pin(with_request_context(id, route.clone(), async move {
            let response = pending.await?;
            let status = response.status().as_u16();
            metrics.inc_http_request(&route, status);
            debug!(route = %route, status, "request counted");
            Ok(response)
        }))
    }
}
