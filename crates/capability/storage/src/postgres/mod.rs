//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用。表结构见仓库根目录 `migrations/0001_gateway_config.sql`。
//!
//! ## 包含的实现
//!
//! - **SnapshotStore** (`snapshot.rs`)：`config_snapshots` 只追加
//! - **ConfigGraphStore** (`graph.rs`)：配置关系图整图替换
//!
//! ## 事务
//!
//! 整图替换在单个事务内完成：先按子 → 父顺序删除十张表，
//! 再按父 → 子顺序逐行写入。任一语句失败事务回滚，旧图保持不变；
//! 快照写入不在该事务内（先于关系图落库，失败的部署也会留下快照）。
//!
//! ## 行顺序
//!
//! 各表带 `row_seq bigserial`，读回时按写入顺序排序。

pub mod graph;
pub mod snapshot;

pub use graph::*;
pub use snapshot::*;
