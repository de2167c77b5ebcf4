//! Dashboard HTTP API for restqa.
//!
//! The router is built over an [`AppState`] that carries the injected
//! [`ProjectService`] and [`ScenarioGenerator`], so tests can drive it with
//! the in-memory doubles from `restqa-fake`.

mod cors;
mod error;
mod handlers;
mod options;

pub use error::ApiError;
pub use options::{
    API_SEGMENTS, DASHBOARD_DEV_ORIGIN, DEFAULT_PORT, DEFAULT_REPORT_PREFIX, ServerOptions,
    normalize_prefix,
};

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use restqa_adapters::ScenarioGenerator;
use restqa_app::ProjectService;
use restqa_error::{RestqaError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ProjectService>,
    pub generator: Arc<dyn ScenarioGenerator>,
    pub options: Arc<ServerOptions>,
    /// Replaced by `POST /init`.
    config_path: Arc<RwLock<PathBuf>>,
}

impl AppState {
    pub fn new(
        service: Arc<dyn ProjectService>,
        generator: Arc<dyn ScenarioGenerator>,
        options: ServerOptions,
        config_path: PathBuf,
    ) -> Self {
        Self {
            service,
            generator,
            options: Arc::new(options),
            config_path: Arc::new(RwLock::new(config_path)),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_config_path(&self, path: PathBuf) {
        *self
            .config_path
            .write()
            .unwrap_or_else(PoisonError::into_inner) = path;
    }
}

pub fn build_router(state: AppState) -> Router {
    let reports = ServeDir::new(&state.options.report_folder);
    let router = Router::new()
        .route("/version", get(handlers::version))
        .route("/config", get(handlers::config))
        .route("/features", get(handlers::list_features))
        .route(
            "/features/{*path}",
            get(handlers::get_feature).put(handlers::update_feature),
        )
        .route("/preferences", get(handlers::preferences))
        .route("/init", post(handlers::initialize))
        .route("/generate", post(handlers::generate))
        .route("/tips", get(handlers::tips))
        .nest_service(state.options.report_prefix(), reports);

    let router = match &state.options.dashboard_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(from_fn_with_state(state.clone(), cors::cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `state.options.bind` and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.options.bind;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| RestqaError::Io {
            context: format!("bind {addr}"),
            source,
        })?;
    info!(
        %addr,
        tests = %state.options.test_folder.display(),
        reports = %state.options.report_prefix(),
        "dashboard listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|source| RestqaError::Io {
            context: format!("serve {addr}"),
            source,
        })
}
