//! 配置关系图内存存储实现
//!
//! 功能：
//! - 整图原子替换（校验通过后一次性换入）
//! - 模拟关系库外键约束，校验失败时旧图保持不变

use crate::error::StorageError;
use crate::models::{ConfigGraph, GraphCounts};
use crate::traits::ConfigGraphStore;
use crate::validation::ensure_graph_references;
use std::sync::RwLock;

/// 配置关系图内存存储
pub struct InMemoryConfigGraphStore {
    graph: RwLock<ConfigGraph>,
}

impl InMemoryConfigGraphStore {
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(ConfigGraph::default()),
        }
    }
}

impl Default for InMemoryConfigGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigGraphStore for InMemoryConfigGraphStore {
    async fn replace_graph(&self, graph: &ConfigGraph) -> Result<GraphCounts, StorageError> {
        ensure_graph_references(graph)?;
        let mut current = self.graph.write().map_err(|_| StorageError::lock())?;
        *current = graph.clone();
        Ok(graph.counts())
    }

    async fn load_graph(&self) -> Result<ConfigGraph, StorageError> {
        let current = self.graph.read().map_err(|_| StorageError::lock())?;
        Ok(current.clone())
    }
}
