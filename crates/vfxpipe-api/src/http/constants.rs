//! Shared HTTP constants (headers, problem URIs, content types).

pub(crate) use vfxpipe_telemetry::REQUEST_ID_HEADER as HEADER_REQUEST_ID;

pub(crate) const PROBLEM_INTERNAL: &str = "https://vfxpipe.dev/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://vfxpipe.dev/problems/bad-request";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://vfxpipe.dev/problems/not-found";

pub(crate) const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";
