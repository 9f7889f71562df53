//! HTTP API gateway for CareTutor.
//!
//! Exposes REST endpoints for health checks and the v1 API with chat,
//! sessions, document listings, and the framework catalog. The gateway
//! owns the in-memory session logs; the pipeline itself is stateless.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use caretutor_config::AppConfig;
use caretutor_core::{DocumentStore, Provider};
use caretutor_pipeline::{FrameworkLoader, PipelineSettings, StrategyKind, TutorPipeline};
use caretutor_providers::AnthropicProvider;
use caretutor_store::{DriveFolders, DriveStore};

pub use api_v1::{ApiState, SharedApiState};

/// Build the router: health at the root, the v1 API nested under /v1.
pub fn build_router(state: SharedApiState) -> Router {
    // CORS: a local console may poll the read-only endpoints.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::exact(
            "http://localhost:8080".parse().unwrap(),
        ))
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Build the live API state from configuration: a Drive-backed store, the
/// Anthropic provider, and the pipeline wired for the configured strategy.
///
/// Fails when no model API key is configured.
pub fn build_state(config: &AppConfig) -> Result<SharedApiState, Box<dyn std::error::Error>> {
    let api_key = config
        .api_key
        .clone()
        .ok_or("no model API key configured; run `caretutor onboard` or set ANTHROPIC_API_KEY")?;

    let folders = DriveFolders::new(
        &config.store.folders.patient_data,
        &config.store.folders.guidelines,
        &config.store.folders.prompt_framework,
    );
    let mut drive = DriveStore::new(folders).with_base_url(&config.store.base_url);
    if let Some(key) = &config.store.api_key {
        drive = drive.with_api_key(key);
    }
    if let Some(token) = &config.store.access_token {
        drive = drive.with_access_token(token);
    }
    let store: Arc<dyn DocumentStore> = Arc::new(drive);

    let provider: Arc<dyn Provider> = Arc::new(AnthropicProvider::new(api_key));

    let strategy: StrategyKind = config
        .context_strategy
        .parse()
        .map_err(|message| caretutor_core::Error::Config { message })?;
    let settings = PipelineSettings {
        model: config.model.clone(),
        framework_folder: config.store.folders.prompt_framework.clone(),
        answer_max_tokens: config.answer_max_tokens,
        selection_max_tokens: config.selection_max_tokens,
        strategy,
    };

    let pipeline = TutorPipeline::new(store.clone(), provider, settings);
    let loader = FrameworkLoader::new(store.clone(), &config.store.folders.prompt_framework);

    Ok(Arc::new(ApiState {
        pipeline,
        store,
        loader,
        sessions: RwLock::new(HashMap::new()),
    }))
}

/// Start the gateway HTTP server and serve until shutdown.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = build_state(&config)?;
    let app = build_router(state);

    info!(addr = %addr, "gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        AppConfig {
            api_key: Some("sk-ant-test".into()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn build_state_requires_api_key() {
        assert!(build_state(&AppConfig::default()).is_err());
    }

    #[tokio::test]
    async fn health_endpoint() {
        let state = build_state(&test_config()).expect("state should build");
        let app = build_router(state);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let state = build_state(&test_config()).expect("state should build");
        let app = build_router(state);

        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
