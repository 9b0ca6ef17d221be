//! Single-page UI over HTTP.
//!
//! `GET /` shows the empty form, `POST /` classifies the submitted `text` and
//! re-renders the page in the verdict's colors, `GET /health` reports the model.

mod page;

pub use page::{PageState, Pages};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::{PipelineError, Result};
use crate::sentiment::SentimentClassifier;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    classifier: Arc<dyn SentimentClassifier>,
    pages: Arc<Pages>,
}

impl AppState {
    /// Wraps `classifier` and compiles the page template.
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Result<Self> {
        Ok(Self {
            classifier,
            pages: Arc::new(Pages::new()?),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    text: String,
}

/// Renders a page or, if rendering itself fails, a bare 500.
fn page_response(state: &AppState, status: StatusCode, text: &str, page: PageState) -> Response {
    match state.pages.render(text, &page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn index_handler(State(state): State<AppState>) -> Response {
    page_response(&state, StatusCode::OK, "", PageState::Idle)
}

async fn analyze_handler(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Response {
    if form.text.trim().is_empty() {
        tracing::debug!("blank submission, classifier not called");
        return page_response(&state, StatusCode::OK, &form.text, PageState::EmptyInput);
    }

    let classifier = Arc::clone(&state.classifier);
    let text = form.text.clone();
    let outcome = tokio::task::spawn_blocking(move || classifier.classify(&text))
        .await
        .map_err(|e| PipelineError::Unexpected(format!("Classifier task failed: {e}")))
        .and_then(|result| result);

    match outcome {
        Ok(prediction) => {
            tracing::info!(
                label = %prediction.label,
                score = prediction.score,
                chars = form.text.chars().count(),
                "analyzed text"
            );
            page_response(
                &state,
                StatusCode::OK,
                &form.text,
                PageState::Classified(prediction),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "classification failed");
            page_response(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                &form.text,
                PageState::Failed(e.to_string()),
            )
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": state.classifier.model_id(),
    }))
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler).post(analyze_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the UI on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Sentiment Analyzer listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
