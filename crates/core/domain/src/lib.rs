//! 网关配置文档领域模型。
//!
//! - [`document`]：端口/设备/标签/派生标签/桥接/目的地的显式 schema
//! - [`parse`]：YAML → JSON 回退解析，补全与校验
//! - [`de`]：宽松标量反序列化辅助

pub mod de;
pub mod document;
pub mod parse;

pub use document::{
    BridgeBlock, CALCULATION_DEVICE, CalculationTag, CommunicationBridge, ConfigDocument, DEFAULT_UNIT_ID,
    Destination, DestinationKind, Device, DocumentError, HardwareMapping, IoPort, IoSetup, IoTag,
    MemoryBlock, SerialSettings, StatsAggregation, StatsTag, VARIABLE_SLOTS, register_width,
    tag_key,
};
pub use parse::{SourceFormat, parse_document, parse_raw};
