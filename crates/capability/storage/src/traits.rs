//! 存储接口 Trait 定义
//!
//! - SnapshotStore：原始配置快照（只追加）
//! - ConfigGraphStore：配置关系图（整图替换）
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{ConfigGraph, GraphCounts, SnapshotRecord};
use async_trait::async_trait;

/// 快照存储接口
///
/// 快照一经写入不可修改、不会删除。
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 追加一条快照
    async fn write_snapshot(&self, raw: &str) -> Result<SnapshotRecord, StorageError>;

    /// 最近一条快照（按 created_at 倒序，同一时刻取 ID 最大者）
    async fn latest_snapshot(&self) -> Result<Option<SnapshotRecord>, StorageError>;

    /// 快照总数
    async fn count_snapshots(&self) -> Result<u64, StorageError>;
}

/// 配置关系图存储接口
#[async_trait]
pub trait ConfigGraphStore: Send + Sync {
    /// 原子替换整张关系图
    ///
    /// 先按子 → 父顺序删除旧行，再按父 → 子顺序写入新行。
    /// 任一步失败时旧图保持不变。
    async fn replace_graph(&self, graph: &ConfigGraph) -> Result<GraphCounts, StorageError>;

    /// 读取当前关系图
    async fn load_graph(&self) -> Result<ConfigGraph, StorageError>;
}
