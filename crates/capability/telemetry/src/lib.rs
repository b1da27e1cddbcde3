//! 追踪、请求 ID 生成与部署指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 部署指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub deploy_success: u64,
    pub deploy_failure: u64,
    pub snapshots_written: u64,
    pub rows_written: u64,
    pub unresolved_references: u64,
    pub dropped_stats_tags: u64,
    pub deploy_latency_ms_total: u64,
    pub deploy_latency_ms_count: u64,
}

/// 部署指标（进程内计数器）。
pub struct TelemetryMetrics {
    deploy_success: AtomicU64,
    deploy_failure: AtomicU64,
    snapshots_written: AtomicU64,
    rows_written: AtomicU64,
    unresolved_references: AtomicU64,
    dropped_stats_tags: AtomicU64,
    deploy_latency_ms_total: AtomicU64,
    deploy_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            deploy_success: AtomicU64::new(0),
            deploy_failure: AtomicU64::new(0),
            snapshots_written: AtomicU64::new(0),
            rows_written: AtomicU64::new(0),
            unresolved_references: AtomicU64::new(0),
            dropped_stats_tags: AtomicU64::new(0),
            deploy_latency_ms_total: AtomicU64::new(0),
            deploy_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            deploy_success: self.deploy_success.load(Ordering::Relaxed),
            deploy_failure: self.deploy_failure.load(Ordering::Relaxed),
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            unresolved_references: self.unresolved_references.load(Ordering::Relaxed),
            dropped_stats_tags: self.dropped_stats_tags.load(Ordering::Relaxed),
            deploy_latency_ms_total: self.deploy_latency_ms_total.load(Ordering::Relaxed),
            deploy_latency_ms_count: self.deploy_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录部署成功次数。
pub fn record_deploy_success() {
    metrics().deploy_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录部署失败次数（含校验失败）。
pub fn record_deploy_failure() {
    metrics().deploy_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录快照写入次数。
pub fn record_snapshot_written() {
    metrics().snapshots_written.fetch_add(1, Ordering::Relaxed);
}

/// 记录关系图写入行数。
pub fn record_rows_written(rows: u64) {
    metrics().rows_written.fetch_add(rows, Ordering::Relaxed);
}

/// 记录未解析的引用数（计算标签变量 / 统计标签）。
pub fn record_unresolved_references(count: u64) {
    metrics()
        .unresolved_references
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录被丢弃的统计标签数。
pub fn record_dropped_stats_tags(count: u64) {
    metrics()
        .dropped_stats_tags
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录部署耗时（毫秒，含快照与关系图写入）。
pub fn record_deploy_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .deploy_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .deploy_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
