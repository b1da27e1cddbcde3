//! Handlers 模块

pub mod deploy;
pub mod formulas;
pub mod health;
pub mod io_tree;
pub mod metrics;

pub use deploy::*;
pub use formulas::*;
pub use health::*;
pub use io_tree::*;
pub use metrics::*;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{AppState, build_app};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use gwc_deploy::DeployService;
    use gwc_storage::{InMemoryConfigGraphStore, InMemorySnapshotStore};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    pub const MAX_BODY_BYTES: usize = 64 * 1024;

    pub fn test_app() -> Router {
        let deploy = Arc::new(DeployService::new(
            Arc::new(InMemorySnapshotStore::new()),
            Arc::new(InMemoryConfigGraphStore::new()),
        ));
        build_app(AppState { deploy }, MAX_BODY_BYTES)
    }

    /// 发送请求并把响应体解析为 JSON
    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    pub fn post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(body.into())
            .expect("request")
    }
}
