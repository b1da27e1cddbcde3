//! 快照内存存储实现
//!
//! 功能：
//! - 只追加的快照日志
//! - 最近快照查询

use crate::error::StorageError;
use crate::models::SnapshotRecord;
use crate::now_epoch_ms;
use crate::traits::SnapshotStore;
use std::sync::RwLock;

/// 快照内存存储
///
/// 使用 RwLock + Vec 保存，ID 从 1 开始递增。
pub struct InMemorySnapshotStore {
    snapshots: RwLock<Vec<SnapshotRecord>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn write_snapshot(&self, raw: &str) -> Result<SnapshotRecord, StorageError> {
        let mut snapshots = self.snapshots.write().map_err(|_| StorageError::lock())?;
        let record = SnapshotRecord {
            snapshot_id: snapshots.len() as i64 + 1,
            raw: raw.to_string(),
            created_at_ms: now_epoch_ms(),
        };
        snapshots.push(record.clone());
        Ok(record)
    }

    async fn latest_snapshot(&self) -> Result<Option<SnapshotRecord>, StorageError> {
        let snapshots = self.snapshots.read().map_err(|_| StorageError::lock())?;
        Ok(snapshots
            .iter()
            .max_by_key(|record| (record.created_at_ms, record.snapshot_id))
            .cloned())
    }

    async fn count_snapshots(&self) -> Result<u64, StorageError> {
        let snapshots = self.snapshots.read().map_err(|_| StorageError::lock())?;
        Ok(snapshots.len() as u64)
    }
}
