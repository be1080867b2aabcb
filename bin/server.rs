// LedgerFlow AI - analysis service

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ledgerflow_analysis::{AnalysisEngine, AnalysisInput};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:8000";
const ADDR_VAR: &str = "LEDGERFLOW_ADDR";

const NOT_CONFIGURED: &str = "GEMINI_API_KEY is not configured. AI service is unavailable.";
const ANALYSIS_FAILED: &str =
    "Internal AI Analysis Failed during computation or Gemini API call.";

#[derive(Clone)]
struct AppState {
    engine: AnalysisEngine,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// POST /calculate-score
async fn calculate_score(
    State(state): State<AppState>,
    Json(input): Json<AnalysisInput>,
) -> Response {
    if !state.engine.has_model() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorDetail {
                detail: NOT_CONFIGURED,
            }),
        )
            .into_response();
    }

    match state.engine.analyze_input(&input).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!("Analysis failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorDetail {
                    detail: ANALYSIS_FAILED,
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: "LedgerFlow AI",
    })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/calculate-score", post(calculate_score))
        .route("/health", get(health_check))
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState {
        engine: AnalysisEngine::from_env(),
    };

    let addr = std::env::var(ADDR_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("LedgerFlow AI listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use async_trait::async_trait;
    use ledgerflow_analysis::StructuredModel;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct CannedModel(Value);

    #[async_trait]
    impl StructuredModel for CannedModel {
        async fn generate(
            &self,
            _prompt: &str,
            _response_schema: &Value,
        ) -> ledgerflow_analysis::Result<String> {
            Ok(self.0.to_string())
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn score_request(body: Value) -> Request<Body> {
        Request::post("/calculate-score")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState {
            engine: AnalysisEngine::without_model(),
        });

        let (status, body) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "service": "LedgerFlow AI" }));
    }

    #[tokio::test]
    async fn test_unconfigured_model_is_unavailable() {
        let app = router(AppState {
            engine: AnalysisEngine::without_model(),
        });

        let (status, body) = send(
            app,
            score_request(json!({ "transactions": [], "current_balance": 1000 })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], json!(NOT_CONFIGURED));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_unavailable() {
        let app = router(AppState {
            engine: AnalysisEngine::from_lookup(|_| None),
        });

        let (status, body) = send(
            app,
            score_request(json!({
                "transactions": [
                    { "date": "2024-01-01", "category": "Food", "amount": "100000", "type": "debit" }
                ],
                "current_balance": "500000"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], json!(NOT_CONFIGURED));
    }

    #[tokio::test]
    async fn test_score_relays_model_result() {
        let reply = json!({
            "financial_score": 64,
            "days_to_zero": 12,
            "monthly_spending_shifts": [
                { "category": "Food", "change_percent": 30.0, "trend": "increase" }
            ],
            "advice": "Trim dining out."
        });
        let model: Arc<dyn StructuredModel> = Arc::new(CannedModel(reply.clone()));
        let app = router(AppState {
            engine: AnalysisEngine::new(Some(model)),
        });

        let (status, body) = send(
            app,
            score_request(json!({
                "transactions": [
                    { "date": "2024-01-01", "category": "Food", "amount": "100000", "type": "debit" }
                ],
                "current_balance": "500000"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, reply);
    }
}
