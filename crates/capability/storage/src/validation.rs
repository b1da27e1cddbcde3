//! 关系图引用校验
//!
//! 在写入前检查关系图自洽，等价于关系库的主键 + 外键约束：
//! - 各表主键唯一
//! - 端口 → 硬件映射、设备 → 端口、标签 → 设备
//! - 计算标签 *TagId → IO 标签，统计标签 referTagId → 任意标签
//! - 桥接块 → 桥接、虚拟寄存器映射 → 目的地
//!
//! 内存实现靠它模拟外键；PostgreSQL 实现在开事务前先做一遍，
//! 保证两种后端给出一致的错误信息。

use crate::error::StorageError;
use crate::models::ConfigGraph;
use std::collections::HashSet;

fn unique_ids<'a>(
    table: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, StorageError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StorageError::new(format!(
                "duplicate primary key in {table}: {id}"
            )));
        }
    }
    Ok(seen)
}

fn ensure_reference(
    table: &str,
    column: &str,
    value: &str,
    targets: &HashSet<&str>,
) -> Result<(), StorageError> {
    if targets.contains(value) {
        return Ok(());
    }
    Err(StorageError::new(format!(
        "foreign key violation: {table}.{column} = {value}"
    )))
}

/// 校验关系图的主键唯一性与外键完整性。
pub fn ensure_graph_references(graph: &ConfigGraph) -> Result<(), StorageError> {
    let mappings = unique_ids(
        "hardware_mappings",
        graph
            .hardware_mappings
            .iter()
            .map(|row| row.hardware_mapping_id.as_str()),
    )?;
    let ports = unique_ids(
        "io_ports",
        graph.io_ports.iter().map(|row| row.io_port_id.as_str()),
    )?;
    let devices = unique_ids(
        "devices",
        graph.devices.iter().map(|row| row.device_id.as_str()),
    )?;
    let io_tags = unique_ids("io_tags", graph.io_tags.iter().map(|row| row.tag_id.as_str()))?;
    let calculation_tags = unique_ids(
        "calculation_tags",
        graph
            .calculation_tags
            .iter()
            .map(|row| row.calculation_tag_id.as_str()),
    )?;
    unique_ids(
        "stats_tags",
        graph.stats_tags.iter().map(|row| row.stats_tag_id.as_str()),
    )?;
    let bridges = unique_ids(
        "communication_bridges",
        graph.bridges.iter().map(|row| row.bridge_id.as_str()),
    )?;
    unique_ids(
        "bridge_blocks",
        graph.bridge_blocks.iter().map(|row| row.block_id.as_str()),
    )?;
    let destinations = unique_ids(
        "destinations",
        graph
            .destinations
            .iter()
            .map(|row| row.destination_id.as_str()),
    )?;

    for port in &graph.io_ports {
        match (&port.hardware_mapping_id, &port.hardware_interface) {
            (Some(mapping_id), None) => {
                ensure_reference("io_ports", "hardware_mapping_id", mapping_id, &mappings)?
            }
            (None, Some(_)) => {}
            _ => {
                return Err(StorageError::new(format!(
                    "io_ports.{}: exactly one of hardware_mapping_id / hardware_interface required",
                    port.io_port_id
                )));
            }
        }
    }
    for device in &graph.devices {
        ensure_reference("devices", "io_port_id", &device.io_port_id, &ports)?;
    }
    for tag in &graph.io_tags {
        ensure_reference("io_tags", "device_id", &tag.device_id, &devices)?;
    }
    for tag in &graph.calculation_tags {
        for tag_id in tag.variable_tag_ids.iter().flatten() {
            ensure_reference("calculation_tags", "variable_tag_id", tag_id, &io_tags)?;
        }
    }
    for tag in &graph.stats_tags {
        if !io_tags.contains(tag.refer_tag_id.as_str())
            && !calculation_tags.contains(tag.refer_tag_id.as_str())
        {
            return Err(StorageError::new(format!(
                "foreign key violation: stats_tags.refer_tag_id = {}",
                tag.refer_tag_id
            )));
        }
    }
    for block in &graph.bridge_blocks {
        ensure_reference("bridge_blocks", "bridge_id", &block.bridge_id, &bridges)?;
    }
    for map in &graph.virtual_memory_maps {
        ensure_reference(
            "virtual_memory_maps",
            "destination_id",
            &map.destination_id,
            &destinations,
        )?;
    }
    Ok(())
}
