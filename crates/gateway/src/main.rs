//! Folio API Gateway
//!
//! HTTP entry point for documents, selections and page metadata.
//! Handles:
//! - Request routing and validation
//! - Metadata generation through the external service
//! - Observability (logging, metrics)

mod extract;
mod handlers;
mod middleware;
#[cfg(test)]
mod testing;

use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use folio_common::{
    config::AppConfig,
    db::{
        DbPool, DocumentRepository, MetaRepository, PgDocumentRepository, PgMetaRepository,
        PgSelectionRepository, SelectionRepository,
    },
    errors::{AppError, Result},
    metagen::{HttpMetaGenerator, MetaGenerator},
    metrics,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::Notify};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub documents: Arc<dyn DocumentRepository>,
    pub selections: Arc<dyn SelectionRepository>,
    pub meta: Arc<dyn MetaRepository>,
    pub metagen: Option<Arc<dyn MetaGenerator>>,
}

impl AppState {
    /// The metadata generator, or a configuration error when no service
    /// URL was set
    pub fn metagen(&self) -> Result<&dyn MetaGenerator> {
        self.metagen
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "metagen.base_url is not configured".to_string(),
            })
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config);
    info!("Starting Folio API Gateway v{}", folio_common::VERSION);

    config.database.resolve_defaults();

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        install_prometheus(config.observability.metrics_port)?;
    }

    // Initialize database connection
    let db = match DbPool::new(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return Err(e.into());
        }
    };
    if let Err(e) = db.run_migrations().await {
        error!(error = %e, "Failed to apply migrations");
        return Err(e.into());
    }

    let metagen: Option<Arc<dyn MetaGenerator>> = match config.metagen.base_url {
        Some(_) => Some(Arc::new(HttpMetaGenerator::new(&config.metagen)?)),
        None => {
            warn!("metagen.base_url not set, metadata generation is disabled");
            None
        }
    };

    // Create app state
    let state = AppState {
        documents: Arc::new(PgDocumentRepository::new(db.clone())),
        selections: Arc::new(PgSelectionRepository::new(db.clone())),
        meta: Arc::new(PgMetaRepository::new(db.clone())),
        db,
        metagen,
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let draining = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let draining = draining.clone();
            async move { draining.notified().await }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result?;
            return Ok(());
        }
        _ = shutdown_signal() => draining.notify_one(),
    }

    // In-flight requests get `shutdown_timeout` to finish
    match tokio::time::timeout(config.shutdown_timeout(), &mut server).await {
        Ok(result) => result?,
        Err(_) => warn!(
            timeout_secs = config.server.shutdown_timeout_secs,
            "Graceful shutdown timed out, dropping open connections"
        ),
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_prometheus(port: u16) -> std::result::Result<(), Box<dyn std::error::Error>> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_request_duration_seconds", metrics::METRICS_PREFIX)),
            metrics::LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_meta_generation_duration_seconds", metrics::METRICS_PREFIX)),
            metrics::META_GENERATION_BUCKETS,
        )?
        .install()?;

    info!(port, "Prometheus exporter listening");
    Ok(())
}

/// Mount `route` under `path` both with and without a trailing slash
fn both<S>(router: Router<S>, path: &str, route: MethodRouter<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .route(path, route.clone())
        .route(&format!("{}/", path), route)
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    use handlers::{documents, health, meta, selections};

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let mut api = Router::new();
    api = both(
        api,
        "/documents",
        get(documents::get_documents)
            .post(documents::upload_document)
            .put(documents::upload_document)
            .delete(documents::delete_document),
    );
    api = both(
        api,
        "/selections",
        get(selections::get_selections)
            .post(selections::create_selection)
            .delete(selections::delete_selections),
    );
    api = both(api, "/selections/bulk", post(selections::create_selections_bulk));
    api = both(
        api,
        "/meta",
        get(meta::get_meta)
            .post(meta::add_meta)
            .put(meta::update_meta)
            .delete(meta::delete_meta),
    );

    // Compose the app
    Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/api/v1", api)
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
