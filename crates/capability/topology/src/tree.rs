//! IO 层级树
//!
//! 纯投影：端口 → 设备 → 标签，末尾追加虚拟的 `Calculation` 分组承载计算标签。
//! 编辑计算标签时可排除自身或排除全部计算标签，避免自引用。
//! 不落库，同一份文档多次调用结果一致。

use crate::CALCULATION_GROUP;
use domain::ConfigDocument;
use serde::{Deserialize, Serialize};

/// 标签来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Io,
    Calculation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNode {
    pub id: String,
    pub name: String,
    pub kind: TagKind,
    pub data_type: Option<String>,
    /// 选择器提交的引用串：`Device:Tag`
    pub reference: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNode {
    pub id: String,
    pub name: String,
    pub tags: Vec<TagNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_virtual: bool,
    pub devices: Vec<DeviceNode>,
}

/// 过滤选项（也用作查询参数）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeOptions {
    #[serde(default)]
    pub exclude_calculation_tag_id: Option<String>,
    #[serde(default)]
    pub exclude_calculation_tags: bool,
}

pub fn build_tree(document: &ConfigDocument, options: &TreeOptions) -> Vec<PortNode> {
    let mut ports: Vec<PortNode> = document
        .io_setup
        .ports
        .iter()
        .map(|port| PortNode {
            id: port.id.clone(),
            name: port.name.clone(),
            kind: port.kind.clone(),
            is_virtual: false,
            devices: port
                .devices
                .iter()
                .map(|device| DeviceNode {
                    id: device.id.clone(),
                    name: device.name.clone(),
                    tags: device
                        .tags
                        .iter()
                        .map(|tag| TagNode {
                            id: tag.id.clone(),
                            name: tag.name.clone(),
                            kind: TagKind::Io,
                            data_type: tag.data_type.clone(),
                            reference: format!("{}:{}", device.name, tag.name),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    if options.exclude_calculation_tags {
        return ports;
    }
    let excluded = options.exclude_calculation_tag_id.as_deref();
    let calculation_tags: Vec<TagNode> = document
        .calculation_tags
        .iter()
        .filter(|tag| Some(tag.id.as_str()) != excluded)
        .map(|tag| TagNode {
            id: tag.id.clone(),
            name: tag.name.clone(),
            kind: TagKind::Calculation,
            data_type: None,
            reference: format!("{CALCULATION_GROUP}:{}", tag.name),
        })
        .collect();
    if !calculation_tags.is_empty() {
        let group_id = CALCULATION_GROUP.to_lowercase();
        ports.push(PortNode {
            id: group_id.clone(),
            name: CALCULATION_GROUP.to_string(),
            kind: None,
            is_virtual: true,
            devices: vec![DeviceNode {
                id: group_id,
                name: CALCULATION_GROUP.to_string(),
                tags: calculation_tags,
            }],
        });
    }
    ports
}
