//! 路由定义
//!
//! - 健康检查：/health
//! - 部署：POST /deploy（部署原始配置）、GET /deploy（当前配置）
//! - IO 层级树：/io-tree
//! - 公式校验：/formulas/validate
//! - 部署指标：/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，支持 / 和 /api/ 两种前缀
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/deploy", post(deploy_config).get(current_config))
        .route("/io-tree", get(io_tree))
        .route("/formulas/validate", post(validate_formula))
        .route("/metrics", get(get_metrics))
}
