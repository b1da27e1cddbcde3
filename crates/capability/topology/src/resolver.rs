//! 标签引用解析表
//!
//! 每次部署新建一张表，显式传给计算标签 / 统计标签的物化步骤，
//! 不存在进程级共享状态。查不到引用不是错误，返回 `None`，
//! 由调用方决定是写空外键（计算标签）还是丢弃整行（统计标签）。

use crate::CALCULATION_GROUP;
use domain::{IoPort, tag_key};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Clone, Default)]
pub struct TagResolver {
    ids: HashMap<String, String>,
}

impl TagResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单次遍历全部端口/设备/标签建表。
    pub fn from_ports(ports: &[IoPort]) -> Self {
        let mut resolver = Self::new();
        for port in ports {
            for device in &port.devices {
                for tag in &device.tags {
                    resolver.register(&device.name, &tag.name, &tag.id);
                }
            }
        }
        resolver
    }

    /// 登记 `设备:标签` → ID，返回同键下被覆盖的旧 ID。
    pub fn register(&mut self, device_name: &str, tag_name: &str, tag_id: &str) -> Option<String> {
        self.ids
            .insert(tag_key(device_name, tag_name), tag_id.to_string())
    }

    /// 以虚拟设备 `Calculation` 登记计算标签。
    ///
    /// 不覆盖已有条目：键已被占用时保持原 ID 并返回 `false`。
    pub fn register_calculation(&mut self, tag_name: &str, tag_id: &str) -> bool {
        match self.ids.entry(tag_key(CALCULATION_GROUP, tag_name)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(tag_id.to_string());
                true
            }
        }
    }

    /// 解析 `Device:Tag` 引用（大小写不敏感）。空输入或无匹配返回 `None`。
    pub fn resolve(&self, reference: Option<&str>) -> Option<&str> {
        let reference = reference?.trim();
        if reference.is_empty() {
            return None;
        }
        if let Some(id) = self.ids.get(&reference.to_lowercase()) {
            return Some(id.as_str());
        }
        let (device_name, tag_name) = reference.split_once(':')?;
        self.ids
            .get(&tag_key(device_name, tag_name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
