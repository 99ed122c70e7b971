use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::{self, HeaderName, HeaderValue, Method},
    routing::get,
};
use products_hr::EmployeeStore;
use serde::Serialize;
use tokio::{net::TcpListener, sync::Mutex};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{config::AppConfig, employees, network::NetworkSimulator};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<EmployeeStore>>,
    pub network: Arc<NetworkSimulator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Fresh store built from the configured id strategy, seeded when enabled.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut store = EmployeeStore::new(config.id_strategy);
        if config.seed_demo_data {
            store
                .seed(products_hr::demo_employees())
                .context("failed to seed demo employees")?;
        }
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            network: Arc::new(NetworkSimulator::new(&config.network)),
            config: Arc::new(config.clone()),
        })
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(%config.addr, namespace = %state.config.namespace, "directory server listening");
    serve_on(listener, state).await
}

/// Serve on an already-bound listener until Ctrl+C or SIGTERM.
pub async fn serve_on(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    let api = employees::routes(&state);
    let namespace = state.config.namespace.clone();
    let router = if namespace.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&namespace, api)
    };
    router
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

/// Route table as `(verb, path)` pairs for the configured namespace.
pub fn route_table(config: &AppConfig) -> Vec<(&'static str, String)> {
    let collection = platform_api::employees_path(&config.namespace);
    let item = format!("{collection}/{{id}}");
    vec![
        ("GET", collection.clone()),
        ("POST", collection),
        ("PUT", item.clone()),
        ("DELETE", item),
        ("GET", "/health".to_string()),
    ]
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let employees = state.store.lock().await.len();
    Json(HealthResponse {
        ok: true,
        employees,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    employees: usize,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}
