use metrics_exporter_prometheus::PrometheusHandle;
use review_allocator::workflows::assignment::{AssignmentService, KeywordOverlapOracle};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Allocator wired into the HTTP surface.
pub(crate) type Allocator = AssignmentService<KeywordOverlapOracle>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}
