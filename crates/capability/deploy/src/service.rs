//! 部署服务
//!
//! 单写者：同一时刻只有一次部署在执行，重叠请求排队等待。
//! 读路径（当前配置、IO 树）不取锁。

use crate::error::DeployError;
use crate::materialize::{MaterializeReport, materialize};
use domain::{SourceFormat, parse_document};
use gwc_storage::{
    ConfigGraph, ConfigGraphStore, GraphCounts, SnapshotRecord, SnapshotStore, StorageError,
};
use gwc_telemetry::{
    record_deploy_failure, record_deploy_latency_ms, record_deploy_success,
    record_dropped_stats_tags, record_rows_written, record_snapshot_written,
    record_unresolved_references,
};
use gwc_topology::{PortNode, TreeOptions, build_tree};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info};

/// 单次存储调用的默认超时
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// 一次成功部署的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct DeploySummary {
    pub snapshot_id: i64,
    pub format: SourceFormat,
    pub counts: GraphCounts,
    pub report: MaterializeReport,
}

impl DeploySummary {
    pub fn unresolved_references(&self) -> usize {
        self.report.unresolved_references.len()
    }

    pub fn dropped_stats_tags(&self) -> usize {
        self.report.dropped_stats_tags.len()
    }
}

pub struct DeployService {
    snapshots: Arc<dyn SnapshotStore>,
    graph: Arc<dyn ConfigGraphStore>,
    store_timeout: Duration,
    write_lock: Mutex<()>,
}

impl DeployService {
    pub fn new(snapshots: Arc<dyn SnapshotStore>, graph: Arc<dyn ConfigGraphStore>) -> Self {
        Self {
            snapshots,
            graph,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// 部署一份原始配置文本（YAML 或 JSON）。
    ///
    /// 格式 / 文档错误不写快照；之后的任何失败都会留下快照，
    /// 但关系图保持部署前的状态。
    pub async fn deploy(&self, raw: &str) -> Result<DeploySummary, DeployError> {
        let started_at = Instant::now();
        let result = self.deploy_serialized(raw).await;
        match &result {
            Ok(summary) => {
                record_deploy_success();
                record_rows_written(summary.counts.total() as u64);
                record_unresolved_references(summary.unresolved_references() as u64);
                record_dropped_stats_tags(summary.dropped_stats_tags() as u64);
                info!(
                    target: "gwc.deploy",
                    snapshot_id = summary.snapshot_id,
                    format = summary.format.as_str(),
                    rows = summary.counts.total(),
                    unresolved_references = summary.unresolved_references(),
                    dropped_stats_tags = summary.dropped_stats_tags(),
                    "deploy_completed"
                );
            }
            Err(err) => {
                record_deploy_failure();
                error!(target: "gwc.deploy", error = %err, "deploy_failed");
            }
        }
        record_deploy_latency_ms(started_at.elapsed().as_millis() as u64);
        result
    }

    async fn deploy_serialized(&self, raw: &str) -> Result<DeploySummary, DeployError> {
        let _guard = self.write_lock.lock().await;

        if raw.trim().is_empty() {
            return Err(DeployError::InvalidFormat("empty document".to_string()));
        }
        let (document, format) = parse_document(raw)?;
        info!(
            target: "gwc.deploy",
            format = format.as_str(),
            ports = document.io_setup.ports.len(),
            tags = document.io_tag_count(),
            calculation_tags = document.calculation_tags.len(),
            stats_tags = document.stats_tags.len(),
            "document_parsed"
        );

        let snapshot = self
            .bounded("write_snapshot", self.snapshots.write_snapshot(raw))
            .await?;
        record_snapshot_written();
        info!(
            target: "gwc.deploy",
            snapshot_id = snapshot.snapshot_id,
            bytes = raw.len(),
            "snapshot_written"
        );

        let materialized = materialize(&document)?;
        let counts = self
            .bounded("replace_graph", self.graph.replace_graph(&materialized.graph))
            .await?;

        Ok(DeploySummary {
            snapshot_id: snapshot.snapshot_id,
            format,
            counts,
            report: materialized.report,
        })
    }

    /// 最近一次部署的原始文本。
    pub async fn current_config(&self) -> Result<SnapshotRecord, DeployError> {
        self.bounded("latest_snapshot", self.snapshots.latest_snapshot())
            .await?
            .ok_or_else(|| DeployError::NotFound("No config snapshot found".to_string()))
    }

    /// 当前已落库的关系图。
    pub async fn current_graph(&self) -> Result<ConfigGraph, DeployError> {
        self.bounded("load_graph", self.graph.load_graph()).await
    }

    /// 基于最近快照构建 IO 层级树。
    pub async fn io_tree(&self, options: &TreeOptions) -> Result<Vec<PortNode>, DeployError> {
        let snapshot = self.current_config().await?;
        let (document, _) = parse_document(&snapshot.raw)?;
        Ok(build_tree(&document, options))
    }

    async fn bounded<T, F>(&self, operation: &'static str, future: F) -> Result<T, DeployError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.store_timeout, future).await {
            Ok(result) => result.map_err(DeployError::from),
            Err(_) => Err(DeployError::Timeout {
                operation,
                timeout_ms: self.store_timeout.as_millis() as u64,
            }),
        }
    }
}
