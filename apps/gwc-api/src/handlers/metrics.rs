//! 部署指标快照
//!
//! - GET /metrics

use api_contract::MetricsSnapshotDto;
use axum::{Json, response::IntoResponse};
use gwc_telemetry::metrics;

pub async fn get_metrics() -> impl IntoResponse {
    let snapshot = metrics().snapshot();
    Json(MetricsSnapshotDto {
        deploy_success: snapshot.deploy_success,
        deploy_failure: snapshot.deploy_failure,
        snapshots_written: snapshot.snapshots_written,
        rows_written: snapshot.rows_written,
        unresolved_references: snapshot.unresolved_references,
        dropped_stats_tags: snapshot.dropped_stats_tags,
        deploy_latency_ms_total: snapshot.deploy_latency_ms_total,
        deploy_latency_ms_count: snapshot.deploy_latency_ms_count,
    })
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{get, post, send, test_app};
    use axum::http::StatusCode;

    const DOCUMENT: &str = "io_setup:\n  ports:\n    - id: p1\n      name: P1\n      hardwareInterface: eth0\n";

    #[tokio::test]
    async fn metrics_count_deploys() {
        let app = test_app();
        let (status, before) = send(&app, get("/api/metrics")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, post("/deploy", "text/yaml", DOCUMENT)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, post("/deploy", "text/yaml", "{ broken: [")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // 计数器为进程级，只断言增量下限
        let (_, after) = send(&app, get("/metrics")).await;
        let counter = |body: &serde_json::Value, key: &str| body[key].as_u64().expect(key);
        assert!(counter(&after, "deploySuccess") >= counter(&before, "deploySuccess") + 1);
        assert!(counter(&after, "deployFailure") >= counter(&before, "deployFailure") + 1);
        assert!(counter(&after, "snapshotsWritten") >= counter(&before, "snapshotsWritten") + 1);
        assert!(counter(&after, "deployLatencyMsCount") >= counter(&before, "deployLatencyMsCount") + 2);
    }
}
