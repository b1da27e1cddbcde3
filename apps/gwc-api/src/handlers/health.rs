//! 健康检查
//!
//! - GET /health

use api_contract::HealthResponse;
use axum::{Json, response::IntoResponse};

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{get, send, test_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn health_is_served_with_and_without_prefix() {
        let app = test_app();
        for uri in ["/health", "/api/health"] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["ok"], true);
        }
    }

    #[tokio::test]
    async fn responses_carry_request_ids() {
        use tower::ServiceExt;
        let response = test_app().oneshot(get("/health")).await.expect("response");
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-trace-id"));
    }
}
