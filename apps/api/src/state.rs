use std::sync::Arc;

use crate::config::Config;
use crate::scoring::catalog::GuideCatalog;
use crate::scoring::engine::ReportScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable scorer. Default: HeuristicScorer.
    pub scorer: Arc<dyn ReportScorer>,
    /// Per-domain guides, immutable after startup.
    pub guides: Arc<GuideCatalog>,
}
