//! Shared state handed to every handler.

use vfxpipe_fsops::FsOpsService;
use vfxpipe_telemetry::Metrics;

pub(crate) struct ApiState {
    pub(crate) engine: FsOpsService,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) const fn new(engine: FsOpsService, telemetry: Metrics) -> Self {
        Self { engine, telemetry }
    }
}
