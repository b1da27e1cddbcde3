//! HTTP 错误响应辅助函数
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应：
//! - 400：INVALID.REQUEST / INVALID.FORMAT / INVALID.DOCUMENT
//! - 404：RESOURCE.NOT_FOUND
//! - 500：DEPLOY.FAILED / DEPLOY.TIMEOUT

use api_contract::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gwc_deploy::DeployError;

fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(code, message.into())),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, "INVALID.REQUEST", message)
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    error_response(StatusCode::NOT_FOUND, "RESOURCE.NOT_FOUND", message)
}

/// 部署错误响应
///
/// 解析 / 文档错误为 400，其余流水线错误一律 500。
pub fn deploy_error(err: DeployError) -> Response {
    let message = err.to_string();
    match err {
        DeployError::InvalidFormat(_) => {
            error_response(StatusCode::BAD_REQUEST, "INVALID.FORMAT", message)
        }
        DeployError::InvalidDocument(_) => {
            error_response(StatusCode::BAD_REQUEST, "INVALID.DOCUMENT", message)
        }
        DeployError::NotFound(_) => not_found_error(message),
        DeployError::Timeout { .. } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "DEPLOY.TIMEOUT", message)
        }
        DeployError::InvalidFormula { .. } | DeployError::Storage(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "DEPLOY.FAILED", message)
        }
    }
}
