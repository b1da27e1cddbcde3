//! 稳定的 DTO 与 API 响应契约。
//!
//! 成功响应直接返回 DTO；失败响应统一使用 [`ApiResponse`] 封装，
//! 保证每个错误体都带 `error` 字段。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 健康检查响应体。
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// 部署成功响应体：各实体写入行数。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub success: bool,
    pub snapshot_id: i64,
    pub format: String,
    pub hardware_mappings: usize,
    pub io_ports: usize,
    pub devices: usize,
    pub tags: usize,
    pub calculation_tags: usize,
    pub stats_tags: usize,
    pub bridges: usize,
    pub blocks: usize,
    pub destinations: usize,
    pub virtual_memory_maps: usize,
    pub unresolved_references: usize,
    pub dropped_stats_tags: usize,
}

/// 当前配置响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConfigResponse {
    pub raw: String,
    pub snapshot_id: i64,
    pub created_at_ms: i64,
}

/// 公式校验请求体。
#[derive(Debug, Deserialize)]
pub struct FormulaValidateRequest {
    pub formula: String,
}

/// 公式校验响应体。
///
/// `valid` 为部署时使用的宽松校验结果，`submit_valid` 为提交时的严格校验结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaValidateResponse {
    pub formula: String,
    pub valid: bool,
    pub submit_valid: bool,
    pub submit_error: Option<String>,
}

/// 部署指标快照响应体（进程启动以来的累计值）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub deploy_success: u64,
    pub deploy_failure: u64,
    pub snapshots_written: u64,
    pub rows_written: u64,
    pub unresolved_references: u64,
    pub dropped_stats_tags: u64,
    pub deploy_latency_ms_total: u64,
    pub deploy_latency_ms_count: u64,
}
