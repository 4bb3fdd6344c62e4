//! Service wiring and startup

use crate::config::ServerConfig;
use crate::routes;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use zonegate_authorization::ZoneAccessEngine;
use zonegate_core::effects::{AuditStoreEffects, ClockEffects, IdentityEffects};
use zonegate_core::Result;
use zonegate_effects::{
    DirectorySeed, JsonlAuditStore, MemoryAuditStore, MemoryCacheHandler, MemoryDirectory,
    RealClock,
};

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    /// Decision engine
    pub engine: Arc<ZoneAccessEngine>,
    /// Session lookup
    pub identity: Arc<dyn IdentityEffects>,
    /// Login endpoint anonymous subjects are redirected to
    pub login_url: String,
    /// Cookie carrying the session token
    pub session_cookie: String,
}

/// Handlers built from a [`ServerConfig`]
pub struct Gateway {
    /// Request handler state
    pub state: AppState,
    /// Directory backing rules and sessions
    pub directory: MemoryDirectory,
    /// Decision cache, swept periodically while serving
    pub cache: MemoryCacheHandler,
}

impl Gateway {
    /// Load the directory and open the audit store named by `config`
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let directory = match &config.directory_path {
            Some(path) => {
                let directory = MemoryDirectory::from_seed(DirectorySeed::load(path)?)?;
                info!(path = %path.display(), "Loaded zone directory");
                directory
            }
            None => {
                warn!("No directory file configured; every zone is unknown");
                MemoryDirectory::new()
            }
        };

        let audit: Arc<dyn AuditStoreEffects> = match &config.audit_log_path {
            Some(path) => Arc::new(JsonlAuditStore::open(path).await?),
            None => {
                warn!("No audit log file configured; audit records are kept in memory");
                Arc::new(MemoryAuditStore::new())
            }
        };

        Ok(Self::assemble(config, directory, audit, Arc::new(RealClock)))
    }

    /// Wire already-built collaborators together
    pub fn assemble(
        config: &ServerConfig,
        directory: MemoryDirectory,
        audit: Arc<dyn AuditStoreEffects>,
        clock: Arc<dyn ClockEffects>,
    ) -> Self {
        let cache = MemoryCacheHandler::new(clock.clone());
        let engine = ZoneAccessEngine::new(
            config.zone_access.clone(),
            Arc::new(directory.clone()),
            Arc::new(cache.clone()),
            audit,
            clock,
        );
        let state = AppState {
            engine: Arc::new(engine),
            identity: Arc::new(directory.clone()),
            login_url: config.login_url.clone(),
            session_cookie: config.session_cookie.clone(),
        };
        Self {
            state,
            directory,
            cache,
        }
    }
}

/// Routes of the auth-request service
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::check_auth))
        .route("/info", get(routes::access_info))
        .route("/info/:zone", get(routes::zone_info))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/health", get(routes::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the service until Ctrl-C
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;
    let addr = config.socket_addr()?;
    let gateway = Gateway::from_config(&config).await?;

    let purge = tokio::spawn(purge_expired(
        gateway.cache.clone(),
        Duration::from_secs(config.cache_purge_interval_secs),
    ));

    let app = router(gateway.state);

    info!("Starting zonegate on {addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    info!("Zonegate stopped");
    Ok(())
}

async fn purge_expired(cache: MemoryCacheHandler, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let removed = cache.purge_expired().await;
        if removed > 0 {
            debug!(removed, "Purged expired cache slots");
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
