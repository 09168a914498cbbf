use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use qadesk_engine::{QaService, Response as QaResponse};
use qadesk_security::{Category, MaskReport, Redaction};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Deserialize)]
struct AnswerRequest {
    query: String,
}

#[derive(Deserialize)]
struct MaskRequest {
    text: String,
}

#[derive(Deserialize)]
struct FeedbackRequest {
    query: String,
    feedback: String,
}

/// Masking result as exposed over HTTP; failure reasons stay server-side
#[derive(Serialize)]
struct MaskResponse {
    text: String,
    redactions: Vec<Redaction>,
    degraded: Vec<DegradedMatch>,
}

#[derive(Serialize)]
struct DegradedMatch {
    category: Category,
    offset: usize,
}

impl From<MaskReport> for MaskResponse {
    fn from(report: MaskReport) -> Self {
        Self {
            text: report.text,
            redactions: report.redactions,
            degraded: report
                .degraded
                .into_iter()
                .map(|d| DegradedMatch {
                    category: d.category,
                    offset: d.offset,
                })
                .collect(),
        }
    }
}

pub struct QaServer {
    pub service: Arc<QaService>,
    fingerprint: String,
}

#[derive(Clone)]
struct AppState {
    server: Arc<QaServer>,
}

impl QaServer {
    pub fn new(service: Arc<QaService>) -> Self {
        let fingerprint = service.dataset().fingerprint();
        Self {
            service,
            fingerprint,
        }
    }

    pub fn router(self: Arc<Self>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(handle_info))
            .route("/api/answer", post(api_answer))
            .route("/api/mask", post(api_mask))
            .route("/api/feedback", post(api_feedback))
            .layer(cors)
            .with_state(AppState { server: self })
    }

    pub async fn serve(service: Arc<QaService>, host: &str, port: u16) -> anyhow::Result<()> {
        let app = Arc::new(Self::new(service)).router();

        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr).await?;

        info!("qadesk server listening on {}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// GET / - server info and health check
async fn handle_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let service = &state.server.service;
    Json(serde_json::json!({
        "name": "qadesk",
        "version": env!("CARGO_PKG_VERSION"),
        "entries": service.dataset().len(),
        "fingerprint": state.server.fingerprint,
        "threshold": service.threshold(),
    }))
}

/// POST /api/answer
async fn api_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Json<QaResponse> {
    Json(state.server.service.respond(&req.query))
}

/// POST /api/mask
async fn api_mask(State(state): State<AppState>, Json(req): Json<MaskRequest>) -> Json<MaskResponse> {
    Json(state.server.service.mask_with_report(&req.text).into())
}

/// POST /api/feedback
async fn api_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Response {
    match state
        .server
        .service
        .record_feedback(&req.query, &req.feedback)
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "Feedback recorded" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to record feedback");
            (StatusCode::INTERNAL_SERVER_ERROR, "Could not record feedback").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qadesk_core::{QaDataset, QaPair};
    use qadesk_engine::{NO_MATCH_MESSAGE, ResponseKind};
    use qadesk_journal::{Journals, LogSink, MemorySink};

    fn state(feedback: Arc<MemorySink>) -> AppState {
        let dataset = QaDataset::from_pairs(vec![
            QaPair::new(
                "How do I rotate my api token",
                "Call https://api.example.com/rotate with token=abc123",
            ),
            QaPair::new("Where are invoices stored", "Invoices live in the billing portal."),
        ]);
        let sink: Arc<dyn LogSink> = Arc::new(MemorySink::new());
        let journals = Journals::new(sink.clone(), sink, feedback);
        let service = Arc::new(QaService::new(dataset, journals).unwrap());

        AppState {
            server: Arc::new(QaServer::new(service)),
        }
    }

    #[tokio::test]
    async fn test_info() {
        let Json(info) = handle_info(State(state(Arc::new(MemorySink::new())))).await;

        assert_eq!(info["name"], "qadesk");
        assert_eq!(info["entries"], 2);
        assert_eq!(info["threshold"], 0.3);
        assert_eq!(info["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_answer_is_masked() {
        let request = AnswerRequest {
            query: "rotate api token".to_string(),
        };

        let Json(response) = api_answer(State(state(Arc::new(MemorySink::new()))), Json(request)).await;

        assert_eq!(response.kind, ResponseKind::Answered);
        assert_eq!(
            response.text,
            "Call xxxxx://xxx.xxxxxxx.xxx/xxxxxx with token=********"
        );
    }

    #[tokio::test]
    async fn test_answer_no_match() {
        let request = AnswerRequest {
            query: "completely unrelated".to_string(),
        };

        let Json(response) = api_answer(State(state(Arc::new(MemorySink::new()))), Json(request)).await;

        assert_eq!(response.kind, ResponseKind::NoMatch);
        assert_eq!(response.text, NO_MATCH_MESSAGE);
    }

    #[tokio::test]
    async fn test_mask_endpoint() {
        let request = MaskRequest {
            text: "mail bob@example.com".to_string(),
        };

        let Json(response) = api_mask(State(state(Arc::new(MemorySink::new()))), Json(request)).await;

        assert_eq!(response.text, "mail b****@example.com");
        assert_eq!(response.redactions.len(), 1);
        assert_eq!(response.redactions[0].category, Category::Email);
    }

    #[tokio::test]
    async fn test_mask_endpoint_hides_failure_reasons() {
        let request = MaskRequest {
            text: "Use {name} placeholders".to_string(),
        };

        let Json(response) = api_mask(State(state(Arc::new(MemorySink::new()))), Json(request)).await;
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["text"], "Use {name} placeholders");
        assert_eq!(json["degraded"][0]["category"], "record");
        assert_eq!(json["degraded"][0]["offset"], 4);
        assert!(json["degraded"][0].get("reason").is_none());
    }

    #[tokio::test]
    async fn test_feedback_endpoint() {
        let feedback = Arc::new(MemorySink::new());
        let request = FeedbackRequest {
            query: "rotate token".to_string(),
            feedback: "worked".to_string(),
        };

        let response = api_feedback(State(state(feedback.clone())), Json(request)).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(feedback.len(), 1);
    }
}
