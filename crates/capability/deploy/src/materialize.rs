//! 文档 → 关系图物化
//!
//! 纯函数，不触碰存储。产出的各表行按父 → 子顺序排列，
//! 由 `ConfigGraphStore::replace_graph` 一次性落库。
//!
//! 引用解析顺序：
//! 1. 遍历全部 IO 标签建表（引用可以指向任意位置声明的标签）
//! 2. 计算标签变量只解析到 IO 标签，解析不到写空外键
//! 3. 计算标签以 `Calculation:<name>` 登记进表
//! 4. 统计标签可引用 IO 标签或计算标签，解析不到整行丢弃

use crate::error::DeployError;
use domain::{ConfigDocument, DestinationKind, VARIABLE_SLOTS};
use gwc_formula::is_valid_formula;
use gwc_storage::{
    BridgeBlockRecord, BridgeRecord, CalculationTagRecord, ConfigGraph, DestinationRecord,
    DeviceRecord, HardwareMappingRecord, IoPortRecord, IoTagRecord, StatsTagRecord,
    VirtualMemoryMapRecord,
};
use gwc_topology::TagResolver;
use serde_json::Value;
use tracing::warn;

/// 计算标签中解析不到的变量引用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub calculation_tag: String,
    pub slot: char,
    pub reference: String,
}

/// 因引用解析失败而未落库的统计标签。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedStatsTag {
    pub name: String,
    pub refer_tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterializeReport {
    pub unresolved_references: Vec<UnresolvedReference>,
    pub dropped_stats_tags: Vec<DroppedStatsTag>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Materialized {
    pub graph: ConfigGraph,
    pub report: MaterializeReport,
}

/// 把已补全、已校验的文档展开为关系图。
///
/// 计算标签公式未通过宽松校验时返回 `InvalidFormula`。
pub fn materialize(document: &ConfigDocument) -> Result<Materialized, DeployError> {
    let mut graph = ConfigGraph::default();
    let mut report = MaterializeReport::default();

    for mapping in &document.hardware_mappings {
        graph.hardware_mappings.push(HardwareMappingRecord {
            hardware_mapping_id: mapping.id.clone(),
            name: mapping.name.clone(),
            kind: mapping.kind.clone(),
            path: mapping.path.clone(),
            description: mapping.description.clone(),
        });
    }

    for port in &document.io_setup.ports {
        let serial_settings = port
            .serial_settings
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| DeployError::InvalidDocument(err.to_string()))?;
        graph.io_ports.push(IoPortRecord {
            io_port_id: port.id.clone(),
            kind: port.kind.clone(),
            name: port.name.clone(),
            description: port.description.clone(),
            scan_time: port.scan_time,
            time_out: port.time_out,
            retry_count: port.retry_count,
            auto_recover_time: port.auto_recover_time,
            scan_mode: port.scan_mode.clone(),
            enabled: port.enabled.unwrap_or(true),
            serial_settings,
            hardware_mapping_id: port.hardware_mapping_id.clone(),
            hardware_interface: port.hardware_interface.clone(),
        });
        for device in &port.devices {
            graph.devices.push(DeviceRecord {
                device_id: device.id.clone(),
                io_port_id: port.id.clone(),
                name: device.name.clone(),
                device_type: device.device_type.clone(),
                unit_number: device.unit_number,
                tag_write_type: device.tag_write_type.clone(),
                description: device.description.clone(),
                add_device_name_as_prefix: device.add_device_name_as_prefix.unwrap_or(false),
                use_ascii_protocol: device.use_ascii_protocol.unwrap_or(false),
                packet_delay: device.packet_delay,
                digital_block_size: device.digital_block_size,
                analog_block_size: device.analog_block_size,
                enabled: device.enabled.unwrap_or(true),
            });
            for tag in &device.tags {
                graph.io_tags.push(IoTagRecord {
                    tag_id: tag.id.clone(),
                    device_id: device.id.clone(),
                    name: tag.name.clone(),
                    data_type: tag.data_type.clone(),
                    register_type: tag.register_type.clone(),
                    address: tag.address.clone(),
                    description: tag.description.clone(),
                    scale_type: tag.scale_type.clone(),
                    conversion_type: tag.conversion_type.clone(),
                    span_low: tag.span_low,
                    span_high: tag.span_high,
                    default_value: tag.default_value,
                    read_write: tag.read_write.clone(),
                    clamp_to_low: tag.clamp_to_low.unwrap_or(false),
                    clamp_to_high: tag.clamp_to_high.unwrap_or(false),
                    clamp_to_zero: tag.clamp_to_zero.unwrap_or(false),
                    scan_rate: tag.scan_rate,
                });
            }
        }
    }

    let mut resolver = TagResolver::from_ports(&document.io_setup.ports);

    for tag in &document.calculation_tags {
        if !is_valid_formula(&tag.formula) {
            return Err(DeployError::InvalidFormula {
                tag: tag.name.clone(),
                formula: tag.formula.clone(),
            });
        }
        let mut variables: [Option<String>; 8] = Default::default();
        let mut variable_tag_ids: [Option<String>; 8] = Default::default();
        for (index, reference) in tag.variables().into_iter().enumerate() {
            let Some(reference) = reference else {
                continue;
            };
            variables[index] = Some(reference.to_string());
            match resolver.resolve(Some(reference)) {
                Some(tag_id) => variable_tag_ids[index] = Some(tag_id.to_string()),
                None => {
                    let slot = VARIABLE_SLOTS[index].to_ascii_uppercase();
                    warn!(
                        target: "gwc.deploy",
                        calculation_tag = %tag.name,
                        slot = %slot,
                        reference = %reference,
                        "calculation_variable_unresolved"
                    );
                    report.unresolved_references.push(UnresolvedReference {
                        calculation_tag: tag.name.clone(),
                        slot,
                        reference: reference.to_string(),
                    });
                }
            }
        }
        graph.calculation_tags.push(CalculationTagRecord {
            calculation_tag_id: tag.id.clone(),
            name: tag.name.clone(),
            formula: tag.formula.clone(),
            variables,
            variable_tag_ids,
            default_value: tag.default_value,
            period: tag.period,
            read_write: tag.read_write.clone(),
            span_low: tag.span_low,
            span_high: tag.span_high,
            is_parent: tag.is_parent.unwrap_or(false),
            description: tag.description.clone(),
        });
    }
    for tag in &document.calculation_tags {
        if !resolver.register_calculation(&tag.name, &tag.id) {
            warn!(
                target: "gwc.deploy",
                calculation_tag = %tag.name,
                "calculation_tag_key_taken"
            );
        }
    }

    for tag in &document.stats_tags {
        let resolved = tag
            .refer_tag
            .as_deref()
            .and_then(|reference| resolver.resolve(Some(reference)).map(|id| (reference, id)));
        let Some((refer_tag, refer_tag_id)) = resolved else {
            warn!(
                target: "gwc.deploy",
                stats_tag = %tag.name,
                refer_tag = tag.refer_tag.as_deref().unwrap_or(""),
                "stats_tag_dropped"
            );
            report.dropped_stats_tags.push(DroppedStatsTag {
                name: tag.name.clone(),
                refer_tag: tag.refer_tag.clone(),
            });
            continue;
        };
        graph.stats_tags.push(StatsTagRecord {
            stats_tag_id: tag.id.clone(),
            name: tag.name.clone(),
            refer_tag: refer_tag.to_string(),
            refer_tag_id: refer_tag_id.to_string(),
            aggregation: tag.aggregation.as_str().to_string(),
            update_cycle_value: tag.update_cycle_value,
            update_cycle_unit: tag.update_cycle_unit.clone(),
            description: tag.description.clone(),
        });
    }

    for bridge in &document.communication_bridges {
        let Some(bridge_id) = bridge.id.as_deref() else {
            continue;
        };
        graph.bridges.push(BridgeRecord {
            bridge_id: bridge_id.to_string(),
        });
        for block in &bridge.blocks {
            let Some(block_id) = block.id.as_deref() else {
                continue;
            };
            graph.bridge_blocks.push(BridgeBlockRecord {
                block_id: block_id.to_string(),
                bridge_id: bridge_id.to_string(),
                kind: block.kind.clone(),
                sub_type: block.sub_type.clone(),
                label: block.label.clone(),
                config_json: block.config.as_ref().map(Value::to_string),
            });
        }
    }

    for destination in &document.destinations {
        graph.destinations.push(DestinationRecord {
            destination_id: destination.id.clone(),
            name: destination.name.clone(),
            kind: destination.kind.as_str().to_string(),
            description: destination.description.clone(),
            config_json: Value::Object(destination.settings.clone()).to_string(),
        });
    }
    for destination in &document.destinations {
        if destination.kind != DestinationKind::VirtualMemoryMap {
            continue;
        }
        let Some(memory) = destination.memory.as_ref() else {
            continue;
        };
        graph.virtual_memory_maps.push(VirtualMemoryMapRecord {
            destination_id: destination.id.clone(),
            address: memory.address.clone(),
            data_type: memory.data_type.clone(),
            length: memory.length,
            unit_id: i32::from(memory.unit_id),
            value: None,
            buffer: None,
        });
    }

    Ok(Materialized { graph, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::parse_document;

    fn document(raw: &str) -> ConfigDocument {
        parse_document(raw).expect("parse").0
    }

    const PORTS: &str = r#"
io_setup:
  ports:
    - id: p1
      name: Port1
      hardwareInterface: eth0
      devices:
        - id: d1
          name: Meter
          tags:
            - id: t1
              name: Voltage
"#;

    #[test]
    fn calculation_variables_resolve_case_insensitively() {
        let raw = format!(
            "{PORTS}calculation_tags:\n  - id: c1\n    name: Power\n    formula: \"A*2\"\n    a: \"METER:voltage\"\n"
        );
        let materialized = materialize(&document(&raw)).expect("materialize");
        let tag = &materialized.graph.calculation_tags[0];
        assert_eq!(tag.tag_id('a'), Some("t1"));
        assert_eq!(tag.variables[0].as_deref(), Some("METER:voltage"));
        assert!(materialized.report.unresolved_references.is_empty());
    }

    #[test]
    fn unresolved_variable_keeps_raw_reference_with_null_id() {
        let raw = format!(
            "{PORTS}calculation_tags:\n  - id: c1\n    name: Power\n    formula: \"A+B\"\n    a: \"Meter:Voltage\"\n    b: \"Meter:Missing\"\n"
        );
        let materialized = materialize(&document(&raw)).expect("materialize");
        let tag = &materialized.graph.calculation_tags[0];
        assert_eq!(tag.tag_id('B'), None);
        assert_eq!(tag.variables[1].as_deref(), Some("Meter:Missing"));
        assert_eq!(
            materialized.report.unresolved_references,
            vec![UnresolvedReference {
                calculation_tag: "Power".to_string(),
                slot: 'B',
                reference: "Meter:Missing".to_string(),
            }]
        );
    }

    #[test]
    fn calculation_variables_do_not_see_other_calculation_tags() {
        let raw = format!(
            "{PORTS}calculation_tags:\n  - id: c1\n    name: Base\n    formula: \"A\"\n    a: \"Meter:Voltage\"\n  - id: c2\n    name: Derived\n    formula: \"A\"\n    a: \"Calculation:Base\"\n"
        );
        let materialized = materialize(&document(&raw)).expect("materialize");
        assert_eq!(materialized.graph.calculation_tags[1].tag_id('a'), None);
    }

    #[test]
    fn invalid_formula_aborts() {
        let raw = format!("{PORTS}calculation_tags:\n  - name: Bad\n    formula: \"A + foo(B)\"\n");
        let err = materialize(&document(&raw)).expect_err("invalid");
        assert!(matches!(err, DeployError::InvalidFormula { tag, .. } if tag == "Bad"));
    }

    #[test]
    fn stats_tags_resolve_against_calculation_group() {
        let raw = format!(
            "{PORTS}calculation_tags:\n  - id: c1\n    name: Power\n    formula: \"A\"\nstats_tags:\n  - id: s1\n    name: AvgPower\n    referTag: \"calculation:power\"\n    type: avg\n  - id: s2\n    name: Ghost\n    referTag: \"Meter:Nothing\"\n"
        );
        let materialized = materialize(&document(&raw)).expect("materialize");
        assert_eq!(materialized.graph.stats_tags.len(), 1);
        assert_eq!(materialized.graph.stats_tags[0].refer_tag_id, "c1");
        assert_eq!(materialized.graph.stats_tags[0].aggregation, "average");
        assert_eq!(materialized.report.dropped_stats_tags.len(), 1);
        assert_eq!(materialized.report.dropped_stats_tags[0].name, "Ghost");
    }

    #[test]
    fn bridges_and_blocks_without_id_are_skipped() {
        let raw = r#"
communication_bridges:
  - id: b1
    blocks:
      - id: blk1
        type: source
        config: {tag: "Meter:Voltage"}
      - type: sink
  - blocks:
      - id: orphan
"#;
        let graph = materialize(&document(raw)).expect("materialize").graph;
        assert_eq!(graph.bridges.len(), 1);
        assert_eq!(graph.bridge_blocks.len(), 1);
        let config: Value =
            serde_json::from_str(graph.bridge_blocks[0].config_json.as_deref().expect("config"))
                .expect("json");
        assert_eq!(config["tag"], "Meter:Voltage");
    }

    #[test]
    fn only_virtual_memory_map_destinations_get_memory_rows() {
        let raw = r#"
destinations:
  - id: d1
    name: VMM
    type: virtual-memory-map
    memory:
      address: "0x1000"
      dataType: float32
  - id: d2
    name: Broker
    type: mqtt-broker
    host: broker.local
    memory:
      address: "0x2000"
"#;
        let graph = materialize(&document(raw)).expect("materialize").graph;
        assert_eq!(graph.destinations.len(), 2);
        assert_eq!(graph.virtual_memory_maps.len(), 1);
        let map = &graph.virtual_memory_maps[0];
        assert_eq!(map.destination_id, "d1");
        assert_eq!(map.length, Some(2));
        assert_eq!(map.unit_id, 1);
        assert!(map.value.is_none());

        let settings: Value = serde_json::from_str(&graph.destinations[1].config_json).expect("json");
        assert_eq!(settings["host"], "broker.local");
        assert_eq!(graph.destinations[1].kind, "mqtt-broker");
    }
}
