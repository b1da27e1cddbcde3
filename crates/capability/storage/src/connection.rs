//! 数据库连接管理
//!
//! 提供数据库连接池初始化功能：
//! - connect_pool：建立 Postgres 连接池

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// 默认最大连接数
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// 建立 Postgres 连接池
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `max_connections`：最大连接数（部署串行执行，通常无需调大）
pub async fn connect_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(database_url)
        .await?;
    Ok(pool)
}
