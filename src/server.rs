use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::evaluation::Evaluator;
use crate::models::{EvaluationInput, EvaluationRequest, EvaluationResponse, HealthResponse};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, error, info};

/// Shared, read-only state handed to every handler
#[derive(Debug, Clone)]
struct AppState {
    evaluator: Evaluator,
    service_name: Arc<str>,
}

/// Build the application router with all routes and middleware
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        evaluator: Evaluator::new(),
        service_name: Arc::from(config.service_name.as_str()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/eval", post(evaluate))
        .route("/api/eval-only", post(evaluate))
        .route("/health", get(health))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Score the requested metrics for one request
async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let Json(request) = payload?;
    let input = EvaluationInput::from(request);
    debug!(metrics = ?input.metrics, "Scoring evaluation request");

    Ok(Json(state.evaluator.evaluate(&input)))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.service_name.to_string(),
    })
}

/// Bind the configured address and serve until a shutdown signal arrives
pub async fn serve(config: ServerConfig) -> Result<()> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    serve_on(listener, &config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` completes
pub async fn serve_on<F>(listener: TcpListener, config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!(address = %local_addr, service = %config.service_name, "Evaluation server listening");

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Evaluation server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl-C");
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
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
