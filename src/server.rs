// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP transport.
//!
//! Thin axum layer over the decision engine. Validation happens at
//! deserialization; malformed requests never reach the core.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::decision::DecisionEngine;
use crate::engine_core::audit::AuditEvent;
use crate::engine_core::constants;
use crate::engine_core::models::{DecisionResponse, IngestRequest, SendEmailRequest};

pub fn router(engine: Arc<DecisionEngine>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tool/ingest", post(ingest))
        .route("/tool/send_email", post(send_email))
        .route("/audit/logs", get(audit_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Bind and serve until the process is stopped.
pub async fn serve(engine: Arc<DecisionEngine>, listen_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(engine)).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct IngestResponse {
    chunk_id: String,
}

async fn ingest(
    State(engine): State<Arc<DecisionEngine>>,
    Json(req): Json<IngestRequest>,
) -> Json<IngestResponse> {
    let chunk = engine.ingest(&req);
    Json(IngestResponse {
        chunk_id: chunk.chunk_id,
    })
}

async fn send_email(
    State(engine): State<Arc<DecisionEngine>>,
    Json(req): Json<SendEmailRequest>,
) -> Json<DecisionResponse> {
    Json(engine.decide_send_email(&req).await)
}

#[derive(Deserialize)]
struct AuditLogsQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct AuditLogsResponse {
    events: Vec<AuditEvent>,
}

async fn audit_logs(
    State(engine): State<Arc<DecisionEngine>>,
    Query(query): Query<AuditLogsQuery>,
) -> Json<AuditLogsResponse> {
    let limit = query.limit.unwrap_or(constants::store::EVENTS_LIMIT);
    Json(AuditLogsResponse {
        events: engine.audit_events(limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decision::SimulatedDeliverer;
    use crate::engine::dlp::DlpScanner;
    use crate::engine_core::models::PolicyDefinition;
    use crate::engine_core::store::ChunkStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let engine = Arc::new(DecisionEngine::new(
            Arc::new(ChunkStore::new(256)),
            Arc::new(PolicyDefinition::default()),
            DlpScanner::new().unwrap(),
            Arc::new(SimulatedDeliverer),
        ));
        router(engine)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ingest_returns_chunk_id() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tool/ingest")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"session_id":"s1","text":"hi","trust_zone":"untrusted","source":"web"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["chunk_id"].as_str().unwrap().starts_with("chunk_"));
    }

    #[tokio::test]
    async fn malformed_trust_zone_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tool/ingest")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"session_id":"s1","text":"hi","trust_zone":"sideways","source":"web"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
