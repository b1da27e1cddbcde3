//! 配置部署流水线。
//!
//! 解析 → 快照 → 物化 → 原子替换：
//! - [`materialize`]：纯函数，把文档展开为按依赖顺序排列的关系图
//! - [`service`]：`DeployService`，串行化部署并为每次存储调用加超时
//! - [`error`]：`DeployError`

pub mod error;
pub mod materialize;
pub mod service;

pub use error::DeployError;
pub use materialize::{
    DroppedStatsTag, MaterializeReport, Materialized, UnresolvedReference, materialize,
};
pub use service::{DEFAULT_STORE_TIMEOUT, DeploySummary, DeployService};
