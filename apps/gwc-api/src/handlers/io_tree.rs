//! IO 层级树接口
//!
//! - GET /io-tree?excludeCalculationTagId=&excludeCalculationTags=
//!
//! 基于最近一次部署的快照构建，供计算标签 / 统计标签的引用选择器使用。

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gwc_topology::TreeOptions;

use crate::AppState;
use crate::utils::response::{bad_request_error, deploy_error};

pub async fn io_tree(
    State(state): State<AppState>,
    query: Result<Query<TreeOptions>, QueryRejection>,
) -> Response {
    let Query(options) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    match state.deploy.io_tree(&options).await {
        Ok(ports) => (StatusCode::OK, Json(ports)).into_response(),
        Err(err) => deploy_error(err),
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{get, post, send, test_app};
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
  - id: c2
    name: Triple
    formula: "A*3"
    a: "Meter:Voltage"
"#;

    #[tokio::test]
    async fn tree_requires_a_snapshot() {
        let (status, body) = send(&test_app(), get("/io-tree")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");
    }

    #[tokio::test]
    async fn tree_lists_ports_and_calculation_group() {
        let app = test_app();
        let (status, _) = send(&app, post("/deploy", "text/yaml", CONFIG_YAML)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, get("/io-tree")).await;
        assert_eq!(status, StatusCode::OK);
        let ports = body.as_array().expect("ports");
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0]["devices"][0]["tags"][0]["reference"], "Meter:Voltage");
        assert_eq!(ports[1]["isVirtual"], true);
        assert_eq!(
            ports[1]["devices"][0]["tags"].as_array().map(Vec::len),
            Some(2)
        );
    }

    #[tokio::test]
    async fn tree_filters_calculation_tags() {
        let app = test_app();
        send(&app, post("/deploy", "text/yaml", CONFIG_YAML)).await;

        let (_, body) = send(&app, get("/api/io-tree?excludeCalculationTagId=c1")).await;
        let tags = body[1]["devices"][0]["tags"].as_array().expect("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0]["id"], "c2");

        let (_, body) = send(&app, get("/io-tree?excludeCalculationTags=true")).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn invalid_query_is_bad_request() {
        let app = test_app();
        send(&app, post("/deploy", "text/yaml", CONFIG_YAML)).await;
        let (status, body) = send(&app, get("/io-tree?excludeCalculationTags=maybe")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID.REQUEST");
    }
}
