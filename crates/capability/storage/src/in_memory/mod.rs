//! 内存存储实现模块
//!
//! 用于测试和未配置数据库时的本地运行。
//!
//! 包含以下实现：
//! - SnapshotStore: InMemorySnapshotStore
//! - ConfigGraphStore: InMemoryConfigGraphStore

pub mod graph;
pub mod snapshot;

pub use graph::*;
pub use snapshot::*;
