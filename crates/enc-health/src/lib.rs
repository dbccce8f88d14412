//! Liveness endpoint for external process supervisors.
//!
//! Reports the process as up regardless of the bot's connection to Telegram.

use std::net::SocketAddr;

use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const ROOT_TEXT: &str = "✅ Encryptonite Bot is running!";

/// Fixed `/health` payload.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
}

pub const HEALTHY: HealthStatus = HealthStatus {
    status: "healthy",
    service: "telegram-bot",
};

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn home() -> &'static str {
    ROOT_TEXT
}

async fn health() -> Json<HealthStatus> {
    Json(HEALTHY)
}

/// Serve the liveness routes until `shutdown` is cancelled.
pub async fn serve(addr: SocketAddr, shutdown: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "liveness server listening");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("liveness server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn get_path(path: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let resp = router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn root_reports_running_as_plain_text() {
        let (status, content_type, body) = get_path("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert_eq!(String::from_utf8(body).unwrap(), ROOT_TEXT);
    }

    #[tokio::test]
    async fn health_returns_fixed_payload() {
        let (status, content_type, body) = get_path("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "healthy", "service": "telegram-bot"})
        );
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _, _) = get_path("/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serve_stops_on_cancel() {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(serve(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            shutdown.clone(),
        ));
        shutdown.cancel();
        task.await.unwrap().unwrap();
    }
}
