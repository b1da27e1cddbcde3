//! 请求上下文中间件
//!
//! 为每个请求生成 request_id/trace_id：
//! - 写入请求扩展，供 handler 读取
//! - 打开 `request` span，请求内日志自动携带
//! - 以 `x-request-id` / `x-trace-id` 响应头回传

use axum::{body::Body, extract::Request, http::HeaderValue, middleware::Next, response::Response};
use gwc_telemetry::new_request_ids;
use tracing::{Instrument, info_span};

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
