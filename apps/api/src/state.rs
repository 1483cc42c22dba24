use std::sync::Arc;

use crate::registry::Registry;
use crate::store::AssessmentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AssessmentStore>,
    /// Owns the generator, QC pipeline and assessment settings.
    pub registry: Arc<Registry>,
}
