//! 网关配置部署 HTTP API。
//!
//! 路由同时挂载在 `/` 与 `/api` 下；未配置数据库时使用内存存储。

mod handlers;
mod middleware;
mod routes;
mod utils;

use axum::{Router, extract::DefaultBodyLimit, middleware as axum_middleware};
use gwc_config::AppConfig;
use gwc_deploy::DeployService;
use gwc_storage::{
    ConfigGraphStore, InMemoryConfigGraphStore, InMemorySnapshotStore, PgConfigGraphStore,
    PgSnapshotStore, SnapshotStore, connect_pool,
};
use gwc_telemetry::init_tracing;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub deploy: Arc<DeployService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let (snapshots, graph): (Arc<dyn SnapshotStore>, Arc<dyn ConfigGraphStore>) =
        match config.database_url.as_deref() {
            Some(database_url) => {
                // Postgres 存储（需先执行 migrations）
                let pool = connect_pool(database_url, config.db_max_connections).await?;
                (
                    Arc::new(PgSnapshotStore::new(pool.clone())),
                    Arc::new(PgConfigGraphStore::new(pool)),
                )
            }
            None => {
                warn!(target: "gwc.api", "GWC_DATABASE_URL not set, using in-memory stores");
                (
                    Arc::new(InMemorySnapshotStore::new()),
                    Arc::new(InMemoryConfigGraphStore::new()),
                )
            }
        };
    let deploy =
        Arc::new(DeployService::new(snapshots, graph).with_store_timeout(config.store_timeout()));
    let app = build_app(AppState { deploy }, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "gwc.api", http_addr = %config.http_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// 组装完整应用：业务路由 + 请求体上限 + HTTP 追踪 + 请求上下文。
pub fn build_app(state: AppState, max_body_bytes: usize) -> Router {
    let api = routes::create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(axum_middleware::from_fn(middleware::request_context))
}
