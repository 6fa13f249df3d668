//! HTTP surface: one endpoint, `GET /transcript/:id`

use crate::error::{Result, ScrapeError};
use crate::service::TranscriptService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub fn router(service: Arc<TranscriptService>) -> Router {
    Router::new()
        .route("/transcript/:id", get(get_transcript))
        .with_state(service)
}

pub async fn serve(addr: SocketAddr, service: Arc<TranscriptService>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn get_transcript(
    State(service): State<Arc<TranscriptService>>,
    Path(id): Path<String>,
) -> Response {
    match service.fetch(&id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(ScrapeError::ContentUnavailable) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no transcript available for {}", id) })),
        )
            .into_response(),
        Err(e) => {
            error!("Transcript fetch for {} failed: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "failed to fetch transcript",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
