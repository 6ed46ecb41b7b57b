//! Command handlers grouped by endpoint.

use vfxpipe_api_models::ProblemInvalidParam;

pub(crate) mod files;
pub(crate) mod ingest;
pub(crate) mod status;
pub(crate) mod workspace;

/// Summarise client-side validation failures in one line.
pub(crate) fn rejected_fields(params: &[ProblemInvalidParam]) -> String {
    let fields: Vec<_> = params
        .iter()
        .map(|param| param.pointer.trim_start_matches('/'))
        .collect();
    format!("empty values for: {}", fields.join(", "))
}
