mod backend;
mod config;
mod contexts;
mod credentials;
mod errors;
mod extractor;
mod models;
mod pipeline;
mod reasoning;
mod router;
mod routes;
mod session;
mod state;
mod storage;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::BackendClient;
use crate::config::Config;
use crate::contexts::{BackgroundContext, TabRegistry};
use crate::credentials::CredentialStore;
use crate::pipeline::PipelineController;
use crate::reasoning::ReasoningClient;
use crate::router::{Context, MessageRouter};
use crate::routes::build_router;
use crate::session::identity::GoogleIdentity;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::storage::{LocalStore, MemoryStore, SqliteStore};

const MEMORY_STORAGE: &str = "memory";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting copilot v{}", env!("CARGO_PKG_VERSION"));

    // Durable local storage: API key and session
    let store: Arc<dyn LocalStore> = if config.storage_url == MEMORY_STORAGE {
        warn!("STORAGE_URL=memory: API key and session will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::connect(&config.storage_url).await?)
    };

    let credentials = Arc::new(CredentialStore::new(store.clone()));
    credentials.load().await?;

    let reasoning = Arc::new(ReasoningClient::new(
        &config.reasoning_api_base,
        &config.reasoning_model,
        config.reasoning_timeout,
        credentials.clone(),
    )?);
    info!("Reasoning client initialized (model: {})", reasoning.model());

    let backend = Arc::new(BackendClient::new(&config.backend_api_url, config.backend_timeout)?);
    let identity = Arc::new(GoogleIdentity::new(
        &config.identity_revoke_url,
        config.backend_timeout,
    )?);
    info!("Backend client initialized ({})", config.backend_api_url);

    let session = Arc::new(SessionStore::new(store, backend.clone(), identity));

    let router = Arc::new(MessageRouter::new());
    router.register(Context::Background, Arc::new(BackgroundContext::new(reasoning)));
    let tabs = Arc::new(TabRegistry::new(router.clone()));

    let pipeline = Arc::new(PipelineController::new(
        router,
        tabs.clone(),
        session,
        backend,
        config.tailor_mode,
    ));
    info!("Pipeline ready (tailor mode: {:?})", config.tailor_mode);

    // Session is read once, before the first request is served
    pipeline.restore_session().await?;

    let state = AppState {
        config: config.clone(),
        tabs,
        credentials,
        pipeline,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("127.0.0.1:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
