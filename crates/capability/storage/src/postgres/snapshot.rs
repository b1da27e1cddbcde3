//! Postgres 快照存储实现

use crate::error::StorageError;
use crate::models::SnapshotRecord;
use crate::now_epoch_ms;
use crate::traits::SnapshotStore;
use sqlx::{PgPool, Row};

pub struct PgSnapshotStore {
    pub pool: PgPool,
}

impl PgSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url, max_connections).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn write_snapshot(&self, raw: &str) -> Result<SnapshotRecord, StorageError> {
        let created_at_ms = now_epoch_ms();
        let row = sqlx::query(
            "insert into config_snapshots (raw, created_at_ms) values ($1, $2) \
             returning snapshot_id",
        )
        .bind(raw)
        .bind(created_at_ms)
        .fetch_one(&self.pool)
        .await?;
        Ok(SnapshotRecord {
            snapshot_id: row.try_get("snapshot_id")?,
            raw: raw.to_string(),
            created_at_ms,
        })
    }

    async fn latest_snapshot(&self) -> Result<Option<SnapshotRecord>, StorageError> {
        let row = sqlx::query(
            "select snapshot_id, raw, created_at_ms from config_snapshots \
             order by created_at_ms desc, snapshot_id desc limit 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(SnapshotRecord {
            snapshot_id: row.try_get("snapshot_id")?,
            raw: row.try_get("raw")?,
            created_at_ms: row.try_get("created_at_ms")?,
        }))
    }

    async fn count_snapshots(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("select count(*) from config_snapshots")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
