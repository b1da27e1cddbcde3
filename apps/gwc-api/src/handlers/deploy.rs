//! 配置部署接口
//!
//! - POST /deploy：请求体为原始配置文本（YAML 或 JSON）
//! - GET /deploy：返回最近一次部署的原始文本

use api_contract::{CurrentConfigResponse, DeployResponse};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gwc_deploy::DeploySummary;

use crate::AppState;
use crate::utils::response::{bad_request_error, deploy_error};

pub async fn deploy_config(State(state): State<AppState>, body: Bytes) -> Response {
    let raw = match std::str::from_utf8(&body) {
        Ok(raw) => raw,
        Err(_) => return bad_request_error("body is not valid UTF-8"),
    };
    if raw.trim().is_empty() {
        return bad_request_error("empty body");
    }
    match state.deploy.deploy(raw).await {
        Ok(summary) => (StatusCode::OK, Json(summary_to_dto(summary))).into_response(),
        Err(err) => deploy_error(err),
    }
}

pub async fn current_config(State(state): State<AppState>) -> Response {
    match state.deploy.current_config().await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(CurrentConfigResponse {
                raw: snapshot.raw,
                snapshot_id: snapshot.snapshot_id,
                created_at_ms: snapshot.created_at_ms,
            }),
        )
            .into_response(),
        Err(err) => deploy_error(err),
    }
}

fn summary_to_dto(summary: DeploySummary) -> DeployResponse {
    let counts = summary.counts;
    DeployResponse {
        success: true,
        snapshot_id: summary.snapshot_id,
        format: summary.format.as_str().to_string(),
        hardware_mappings: counts.hardware_mappings,
        io_ports: counts.io_ports,
        devices: counts.devices,
        tags: counts.tags,
        calculation_tags: counts.calculation_tags,
        stats_tags: counts.stats_tags,
        bridges: counts.bridges,
        blocks: counts.blocks,
        destinations: counts.destinations,
        virtual_memory_maps: counts.virtual_memory_maps,
        unresolved_references: summary.report.unresolved_references.len(),
        dropped_stats_tags: summary.report.dropped_stats_tags.len(),
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{MAX_BODY_BYTES, get, post, send, test_app};
    use axum::http::StatusCode;

    const CONFIG_YAML: &str = r#"
io_setup:
  ports:
    - id: p1
      name: Port1
      hardwareInterface: eth0
      devices:
        - id: d1
          name: Meter
          tags:
            - id: t1
              name: Voltage
calculation_tags:
  - id: c1
    name: Double
    formula: "A*2"
    a: "Meter:Voltage"
stats_tags:
  - id: s1
    name: Ghost
    referTag: "Meter:Missing"
destinations:
  - id: d1
    name: VMM
    type: virtual-memory-map
    memory:
      address: "0x1000"
      dataType: int16
"#;

    #[tokio::test]
    async fn deploy_returns_counts_and_get_returns_raw() {
        let app = test_app();
        let (status, body) = send(&app, post("/deploy", "text/yaml", CONFIG_YAML)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["snapshotId"], 1);
        assert_eq!(body["ioPorts"], 1);
        assert_eq!(body["devices"], 1);
        assert_eq!(body["tags"], 1);
        assert_eq!(body["calculationTags"], 1);
        assert_eq!(body["statsTags"], 0);
        assert_eq!(body["droppedStatsTags"], 1);
        assert_eq!(body["virtualMemoryMaps"], 1);

        let (status, body) = send(&app, get("/api/deploy")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw"], CONFIG_YAML);
    }

    #[tokio::test]
    async fn get_without_snapshot_is_not_found() {
        let (status, body) = send(&test_app(), get("/deploy")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");
        assert_eq!(body["error"]["message"], "No config snapshot found");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_without_snapshot() {
        let app = test_app();
        let (status, body) = send(&app, post("/deploy", "text/yaml", "{ broken: [")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID.FORMAT");

        let (status, _) = send(&app, get("/deploy")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn neither_yaml_nor_json_is_bad_request_without_snapshot() {
        let app = test_app();
        let (status, body) =
            send(&app, post("/deploy", "text/yaml", "not: valid: yaml: : :")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_object());
        assert_eq!(body["error"]["code"], "INVALID.FORMAT");

        let (status, body) = send(&app, get("/deploy")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "No config snapshot found");
    }

    #[tokio::test]
    async fn empty_body_is_bad_request() {
        let (status, body) = send(&test_app(), post("/deploy", "text/yaml", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID.REQUEST");
    }

    #[tokio::test]
    async fn invalid_document_is_bad_request() {
        let raw = "io_setup:\n  ports:\n    - id: p1\n      name: Port1\n";
        let (status, body) = send(&test_app(), post("/deploy", "text/yaml", raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID.DOCUMENT");
    }

    #[tokio::test]
    async fn invalid_formula_is_pipeline_failure() {
        let raw = CONFIG_YAML.replace("\"A*2\"", "\"A*zzz\"");
        let app = test_app();
        let (status, body) = send(&app, post("/deploy", "text/yaml", raw)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DEPLOY.FAILED");

        // 快照先于物化写入
        let (status, _) = send(&app, get("/deploy")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn json_body_is_accepted() {
        let raw = r#"{"ioSetup":{"ports":[{"id":"p1","name":"Tcp","hardwareInterface":"eth0"}]}}"#;
        let (status, body) = send(&test_app(), post("/api/deploy", "application/json", raw)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ioPorts"], 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let raw = format!("# {}\n", "x".repeat(MAX_BODY_BYTES + 1));
        let app = test_app();
        let (status, _) = send(&app, post("/deploy", "text/yaml", raw)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
