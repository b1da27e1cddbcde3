//! IO 层级遍历：标签引用解析表与层级树投影。
//!
//! - [`resolver`]：`设备名:标签名`（小写）→ 标签 ID，单次部署内有效
//! - [`tree`]：端口 → 设备 → 标签的过滤树，供引用选择器使用

pub mod resolver;
pub mod tree;

pub use resolver::TagResolver;
pub use tree::{DeviceNode, PortNode, TagKind, TagNode, TreeOptions, build_tree};

/// 计算标签在引用表与层级树中使用的虚拟设备名。
pub const CALCULATION_GROUP: &str = domain::CALCULATION_DEVICE;
