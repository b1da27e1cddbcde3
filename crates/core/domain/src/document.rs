//! 配置文档模型
//!
//! 运维人员在表单里编辑、以 YAML/JSON 提交的整份网关配置：
//! - 硬件映射：HardwareMapping
//! - IO 层级：IoPort → Device → IoTag
//! - 派生标签：CalculationTag（A..H 八个变量）、StatsTag（单一引用）
//! - 转发拓扑：CommunicationBridge → BridgeBlock、Destination（含虚拟寄存器映射）
//!
//! 所有缺省值在反序列化边界（`de` 模块 + `normalize`）统一处理，
//! 部署流水线拿到的是已经补全 ID、已通过结构校验的文档。

use crate::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// 计算标签的变量槽位（A..H）。
pub const VARIABLE_SLOTS: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// 虚拟寄存器映射缺省站号。
pub const DEFAULT_UNIT_ID: u8 = 1;

/// 计算标签在引用表中的虚拟设备名。
pub const CALCULATION_DEVICE: &str = "Calculation";

/// 标签引用查找键：`<设备名>:<标签名>`，统一小写。
pub fn tag_key(device_name: &str, tag_name: &str) -> String {
    format!(
        "{}:{}",
        device_name.trim().to_lowercase(),
        tag_name.trim().to_lowercase()
    )
}

/// 文档校验错误。
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document is neither valid YAML ({yaml}) nor valid JSON ({json})")]
    InvalidFormat { yaml: String, json: String },
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// 整份配置文档。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    #[serde(default, alias = "hardwareMappings", deserialize_with = "de::nullable")]
    pub hardware_mappings: Vec<HardwareMapping>,
    #[serde(default, alias = "ioSetup", deserialize_with = "de::nullable")]
    pub io_setup: IoSetup,
    #[serde(default, alias = "calculationTags", deserialize_with = "de::nullable")]
    pub calculation_tags: Vec<CalculationTag>,
    #[serde(default, alias = "statsTags", deserialize_with = "de::nullable")]
    pub stats_tags: Vec<StatsTag>,
    #[serde(
        default,
        alias = "communicationBridges",
        deserialize_with = "de::nullable"
    )]
    pub communication_bridges: Vec<CommunicationBridge>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub destinations: Vec<Destination>,
}

/// 硬件映射（串口设备路径等）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareMapping {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "de::opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
}

/// IO 配置段。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IoSetup {
    #[serde(default, deserialize_with = "de::nullable")]
    pub ports: Vec<IoPort>,
}

/// IO 端口（串口 / TCP）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoPort {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "de::opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub scan_time: Option<i64>,
    #[serde(default, alias = "timeout", deserialize_with = "de::opt_i64")]
    pub time_out: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub retry_count: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub auto_recover_time: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub scan_mode: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_object")]
    pub serial_settings: Option<SerialSettings>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub hardware_mapping_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub hardware_interface: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub devices: Vec<Device>,
}

/// 串口参数，原样以 JSON 保存。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialSettings {
    #[serde(
        default,
        deserialize_with = "de::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub baud_rate: Option<i64>,
    #[serde(
        default,
        deserialize_with = "de::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_bit: Option<i64>,
    #[serde(
        default,
        deserialize_with = "de::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_bit: Option<f64>,
    #[serde(
        default,
        deserialize_with = "de::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub parity: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub rts: Option<bool>,
    #[serde(
        default,
        deserialize_with = "de::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub dtr: Option<bool>,
    #[serde(
        default,
        deserialize_with = "de::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<bool>,
}

/// 端口下的设备。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub unit_number: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub tag_write_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub add_device_name_as_prefix: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub use_ascii_protocol: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub packet_delay: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub digital_block_size: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub analog_block_size: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub tags: Vec<IoTag>,
}

/// 设备寄存器上的 IO 标签。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IoTag {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub data_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub register_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub scale_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub conversion_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub span_low: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub span_high: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub default_value: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub read_write: Option<String>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub clamp_to_low: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub clamp_to_high: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub clamp_to_zero: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub scan_rate: Option<i64>,
}

/// 计算标签：公式 + 最多八个变量引用（A..H）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTag {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub formula: String,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub a: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub b: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub c: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub d: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub e: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub f: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub g: Option<String>,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub h: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub default_value: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub period: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub read_write: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub span_low: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub span_high: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_bool")]
    pub is_parent: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
}

impl CalculationTag {
    /// 按 A..H 顺序返回八个变量槽位的引用。
    pub fn variables(&self) -> [Option<&str>; 8] {
        [
            self.a.as_deref(),
            self.b.as_deref(),
            self.c.as_deref(),
            self.d.as_deref(),
            self.e.as_deref(),
            self.f.as_deref(),
            self.g.as_deref(),
            self.h.as_deref(),
        ]
    }
}

/// 统计标签聚合方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsAggregation {
    Average,
    Max,
    Min,
    Sum,
    #[default]
    Unknown,
}

impl StatsAggregation {
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "average" | "avg" => Self::Average,
            "max" | "maximum" => Self::Max,
            "min" | "minimum" => Self::Min,
            "sum" | "total" => Self::Sum,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for StatsAggregation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(de::opt_text(deserializer)?
            .map(|text| Self::from_text(&text))
            .unwrap_or_default())
    }
}

/// 统计标签：对单一引用标签做窗口聚合。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsTag {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_reference")]
    pub refer_tag: Option<String>,
    #[serde(rename = "type", default)]
    pub aggregation: StatsAggregation,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub update_cycle_value: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub update_cycle_unit: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
}

/// 通信桥接（块流水线）。没有 id 的桥接在部署时跳过。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunicationBridge {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::nullable")]
    pub blocks: Vec<BridgeBlock>,
}

/// 桥接块。`config` 作为不透明 JSON 保存。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeBlock {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "de::opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub sub_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub label: Option<String>,
    #[serde(default, alias = "configJson", deserialize_with = "de::opt_value")]
    pub config: Option<Value>,
}

/// 目的地类型。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DestinationKind {
    MqttBroker,
    AwsIot,
    AwsMqtt,
    RestApi,
    VirtualMemoryMap,
    #[default]
    Unknown,
}

impl DestinationKind {
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "mqtt-broker" => Self::MqttBroker,
            "aws-iot" => Self::AwsIot,
            "aws-mqtt" => Self::AwsMqtt,
            "rest-api" => Self::RestApi,
            "virtual-memory-map" => Self::VirtualMemoryMap,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MqttBroker => "mqtt-broker",
            Self::AwsIot => "aws-iot",
            Self::AwsMqtt => "aws-mqtt",
            Self::RestApi => "rest-api",
            Self::VirtualMemoryMap => "virtual-memory-map",
            Self::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for DestinationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(de::opt_text(deserializer)?
            .map(|text| Self::from_text(&text))
            .unwrap_or_default())
    }
}

/// 数据转发目的地。除固定字段外的所有键保存在 `settings` 中。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Destination {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: DestinationKind,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_object")]
    pub memory: Option<MemoryBlock>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// 虚拟寄存器映射的内存块声明。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryBlock {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub data_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub length: Option<i64>,
    #[serde(default = "default_unit_id", deserialize_with = "unit_id")]
    pub unit_id: u8,
}

impl Default for MemoryBlock {
    fn default() -> Self {
        Self {
            address: None,
            data_type: None,
            length: None,
            unit_id: DEFAULT_UNIT_ID,
        }
    }
}

fn default_unit_id() -> u8 {
    DEFAULT_UNIT_ID
}

/// 站号缺失或非法（非 0..=255 整数）时回落为 1。
fn unit_id<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de::opt_i64(deserializer)?
        .and_then(|value| u8::try_from(value).ok())
        .unwrap_or(DEFAULT_UNIT_ID))
}

/// 按数据类型推断占用的寄存器数量（16 位寄存器）。
pub fn register_width(data_type: &str) -> Option<i64> {
    match data_type.trim().to_ascii_lowercase().as_str() {
        "int16" | "uint16" | "bool" | "boolean" => Some(1),
        "int32" | "uint32" | "float32" | "float" => Some(2),
        "int64" | "uint64" | "float64" | "double" => Some(4),
        _ => None,
    }
}

impl ConfigDocument {
    /// 边界补全：缺失的 ID 按文档内位置生成 UUID v5，内存块长度按数据类型推断。
    ///
    /// 同一份文本每次解析得到相同的 ID，部署落库与之后的 IO 树投影保持一致。
    /// 桥接与桥接块不补 ID（没有 id 的会在部署时跳过）。
    pub fn normalize(&mut self) {
        for (index, mapping) in self.hardware_mappings.iter_mut().enumerate() {
            fill_id(&mut mapping.id, &format!("hardware_mapping/{index}"));
        }
        for (port_index, port) in self.io_setup.ports.iter_mut().enumerate() {
            let port_path = format!("io_port/{port_index}");
            fill_id(&mut port.id, &port_path);
            for (device_index, device) in port.devices.iter_mut().enumerate() {
                let device_path = format!("{port_path}/device/{device_index}");
                fill_id(&mut device.id, &device_path);
                for (tag_index, tag) in device.tags.iter_mut().enumerate() {
                    fill_id(&mut tag.id, &format!("{device_path}/tag/{tag_index}"));
                }
            }
        }
        for (index, tag) in self.calculation_tags.iter_mut().enumerate() {
            fill_id(&mut tag.id, &format!("calculation_tag/{index}"));
        }
        for (index, tag) in self.stats_tags.iter_mut().enumerate() {
            fill_id(&mut tag.id, &format!("stats_tag/{index}"));
        }
        for (index, destination) in self.destinations.iter_mut().enumerate() {
            fill_id(&mut destination.id, &format!("destination/{index}"));
            if let Some(memory) = destination.memory.as_mut() {
                if memory.length.is_none() {
                    memory.length = memory.data_type.as_deref().and_then(register_width);
                }
            }
        }
    }

    /// 结构校验：
    /// - 端口硬件绑定二选一，且引用的硬件映射存在
    /// - `设备:标签` 全局唯一
    /// - 设备名不得占用计算标签分组名 `Calculation`
    /// - 计算标签名唯一（大小写不敏感）
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mapping_ids: HashSet<&str> = self
            .hardware_mappings
            .iter()
            .map(|mapping| mapping.id.as_str())
            .collect();
        let mut keys: HashMap<String, &str> = HashMap::new();
        for port in &self.io_setup.ports {
            match (&port.hardware_mapping_id, &port.hardware_interface) {
                (Some(mapping_id), None) => {
                    if !mapping_ids.contains(mapping_id.as_str()) {
                        return Err(DocumentError::Invalid(format!(
                            "port '{}' references unknown hardware mapping '{}'",
                            port.name, mapping_id
                        )));
                    }
                }
                (None, Some(_)) => {}
                (Some(_), Some(_)) => {
                    return Err(DocumentError::Invalid(format!(
                        "port '{}' sets both hardwareMappingId and hardwareInterface",
                        port.name
                    )));
                }
                (None, None) => {
                    return Err(DocumentError::Invalid(format!(
                        "port '{}' sets neither hardwareMappingId nor hardwareInterface",
                        port.name
                    )));
                }
            }
            for device in &port.devices {
                if device.name.trim().eq_ignore_ascii_case(CALCULATION_DEVICE) {
                    return Err(DocumentError::Invalid(format!(
                        "device name '{}' is reserved for calculation tags",
                        device.name
                    )));
                }
                for tag in &device.tags {
                    let key = tag_key(&device.name, &tag.name);
                    if let Some(previous) = keys.insert(key.clone(), tag.id.as_str()) {
                        return Err(DocumentError::Invalid(format!(
                            "duplicate tag reference '{key}' (tags '{previous}' and '{}')",
                            tag.id
                        )));
                    }
                }
            }
        }
        let mut calculation_names: HashMap<String, &str> = HashMap::new();
        for tag in self.calculation_tags.iter().filter(|tag| !tag.name.trim().is_empty()) {
            let key = tag_key(CALCULATION_DEVICE, &tag.name);
            if let Some(previous) = calculation_names.insert(key, tag.id.as_str()) {
                return Err(DocumentError::Invalid(format!(
                    "duplicate calculation tag name '{}' (tags '{previous}' and '{}')",
                    tag.name, tag.id
                )));
            }
        }
        Ok(())
    }

    /// IO 标签总数。
    pub fn io_tag_count(&self) -> usize {
        self.io_setup
            .ports
            .iter()
            .flat_map(|port| port.devices.iter())
            .map(|device| device.tags.len())
            .sum()
    }
}

fn fill_id(id: &mut String, path: &str) {
    if id.trim().is_empty() {
        *id = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, path.as_bytes()).to_string();
    }
}
