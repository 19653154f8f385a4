use std::sync::Arc;

use crate::config::Config;
use crate::contexts::TabRegistry;
use crate::credentials::CredentialStore;
use crate::pipeline::PipelineController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tabs: Arc<TabRegistry>,
    /// Reasoning-service key, written only by the settings route.
    pub credentials: Arc<CredentialStore>,
    pub pipeline: Arc<PipelineController>,
}
