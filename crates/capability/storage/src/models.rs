//! 数据模型
//!
//! 关系存储中的行结构，与配置文档一一对应但携带外键：
//! - 快照：SnapshotRecord（只追加）
//! - 硬件：HardwareMappingRecord
//! - IO 层级：IoPortRecord → DeviceRecord → IoTagRecord
//! - 派生标签：CalculationTagRecord（A..H 解析后的标签 ID）、StatsTagRecord
//! - 转发拓扑：BridgeRecord → BridgeBlockRecord、DestinationRecord → VirtualMemoryMapRecord
//!
//! 除快照外的所有行在每次部署时整体删除并重建，由 [`ConfigGraph`] 一次性承载。

/// 原始配置快照（审计 / 回滚 / 当前配置查询）。
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRecord {
    pub snapshot_id: i64,
    pub raw: String,
    pub created_at_ms: i64,
}

/// 硬件映射记录。
#[derive(Debug, Clone, PartialEq)]
pub struct HardwareMappingRecord {
    pub hardware_mapping_id: String,
    pub name: String,
    pub kind: Option<String>,
    pub path: Option<String>,
    pub description: Option<String>,
}

/// IO 端口记录。`hardware_mapping_id` 与 `hardware_interface` 恰好其一有值。
#[derive(Debug, Clone, PartialEq)]
pub struct IoPortRecord {
    pub io_port_id: String,
    pub kind: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub scan_time: Option<i64>,
    pub time_out: Option<i64>,
    pub retry_count: Option<i64>,
    pub auto_recover_time: Option<i64>,
    pub scan_mode: Option<String>,
    pub enabled: bool,
    /// 串口参数 JSON
    pub serial_settings: Option<String>,
    pub hardware_mapping_id: Option<String>,
    pub hardware_interface: Option<String>,
}

/// 设备记录。
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub device_id: String,
    pub io_port_id: String,
    pub name: String,
    pub device_type: Option<String>,
    pub unit_number: Option<i64>,
    pub tag_write_type: Option<String>,
    pub description: Option<String>,
    pub add_device_name_as_prefix: bool,
    pub use_ascii_protocol: bool,
    pub packet_delay: Option<i64>,
    pub digital_block_size: Option<i64>,
    pub analog_block_size: Option<i64>,
    pub enabled: bool,
}

/// IO 标签记录。
#[derive(Debug, Clone, PartialEq)]
pub struct IoTagRecord {
    pub tag_id: String,
    pub device_id: String,
    pub name: String,
    pub data_type: Option<String>,
    pub register_type: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub scale_type: Option<String>,
    pub conversion_type: Option<String>,
    pub span_low: Option<f64>,
    pub span_high: Option<f64>,
    pub default_value: Option<f64>,
    pub read_write: Option<String>,
    pub clamp_to_low: bool,
    pub clamp_to_high: bool,
    pub clamp_to_zero: bool,
    pub scan_rate: Option<i64>,
}

/// 计算标签记录。
///
/// `variables[i]` 为槽位（A..H）原始引用串，`variable_tag_ids[i]` 为解析出的 IO 标签 ID，
/// 解析失败时为 `None`（不是错误）。
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationTagRecord {
    pub calculation_tag_id: String,
    pub name: String,
    pub formula: String,
    pub variables: [Option<String>; 8],
    pub variable_tag_ids: [Option<String>; 8],
    pub default_value: Option<f64>,
    pub period: Option<i64>,
    pub read_write: Option<String>,
    pub span_low: Option<f64>,
    pub span_high: Option<f64>,
    pub is_parent: bool,
    pub description: Option<String>,
}

impl CalculationTagRecord {
    /// 按槽位字母（大小写不敏感）取解析出的标签 ID。
    pub fn tag_id(&self, slot: char) -> Option<&str> {
        let index = (slot.to_ascii_lowercase() as usize).checked_sub('a' as usize)?;
        self.variable_tag_ids.get(index)?.as_deref()
    }
}

/// 统计标签记录。`refer_tag_id` 必填（解析不到的统计标签不会落库）。
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTagRecord {
    pub stats_tag_id: String,
    pub name: String,
    pub refer_tag: String,
    pub refer_tag_id: String,
    pub aggregation: String,
    pub update_cycle_value: Option<i64>,
    pub update_cycle_unit: Option<String>,
    pub description: Option<String>,
}

/// 通信桥接记录。
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRecord {
    pub bridge_id: String,
}

/// 桥接块记录。`config_json` 为不透明 JSON。
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeBlockRecord {
    pub block_id: String,
    pub bridge_id: String,
    pub kind: Option<String>,
    pub sub_type: Option<String>,
    pub label: Option<String>,
    pub config_json: Option<String>,
}

/// 目的地记录。
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRecord {
    pub destination_id: String,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub config_json: String,
}

/// 虚拟寄存器映射记录。`value` / `buffer` 由运行时回填，部署时为空。
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualMemoryMapRecord {
    pub destination_id: String,
    pub address: Option<String>,
    pub data_type: Option<String>,
    pub length: Option<i64>,
    pub unit_id: i32,
    pub value: Option<String>,
    pub buffer: Option<String>,
}

/// 一次部署产出的完整关系图（按依赖顺序排列）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigGraph {
    pub hardware_mappings: Vec<HardwareMappingRecord>,
    pub io_ports: Vec<IoPortRecord>,
    pub devices: Vec<DeviceRecord>,
    pub io_tags: Vec<IoTagRecord>,
    pub calculation_tags: Vec<CalculationTagRecord>,
    pub stats_tags: Vec<StatsTagRecord>,
    pub bridges: Vec<BridgeRecord>,
    pub bridge_blocks: Vec<BridgeBlockRecord>,
    pub destinations: Vec<DestinationRecord>,
    pub virtual_memory_maps: Vec<VirtualMemoryMapRecord>,
}

impl ConfigGraph {
    pub fn counts(&self) -> GraphCounts {
        GraphCounts {
            hardware_mappings: self.hardware_mappings.len(),
            io_ports: self.io_ports.len(),
            devices: self.devices.len(),
            tags: self.io_tags.len(),
            calculation_tags: self.calculation_tags.len(),
            stats_tags: self.stats_tags.len(),
            bridges: self.bridges.len(),
            blocks: self.bridge_blocks.len(),
            destinations: self.destinations.len(),
            virtual_memory_maps: self.virtual_memory_maps.len(),
        }
    }
}

/// 各实体写入行数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphCounts {
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
}

impl GraphCounts {
    pub fn total(&self) -> usize {
        self.hardware_mappings
            + self.io_ports
            + self.devices
            + self.tags
            + self.calculation_tags
            + self.stats_tags
            + self.bridges
            + self.blocks
            + self.destinations
            + self.virtual_memory_maps
    }
}
