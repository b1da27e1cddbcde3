//! Postgres 配置关系图实现

use crate::error::StorageError;
use crate::models::{
    BridgeBlockRecord, BridgeRecord, CalculationTagRecord, ConfigGraph, DestinationRecord,
    DeviceRecord, GraphCounts, HardwareMappingRecord, IoPortRecord, IoTagRecord, StatsTagRecord,
    VirtualMemoryMapRecord,
};
use crate::traits::ConfigGraphStore;
use crate::validation::ensure_graph_references;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

/// 子 → 父删除顺序
const DELETE_STATEMENTS: [&str; 10] = [
    "delete from virtual_memory_maps",
    "delete from stats_tags",
    "delete from calculation_tags",
    "delete from io_tags",
    "delete from devices",
    "delete from io_ports",
    "delete from bridge_blocks",
    "delete from communication_bridges",
    "delete from destinations",
    "delete from hardware_mappings",
];

const VARIABLE_COLUMNS: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];
const VARIABLE_TAG_ID_COLUMNS: [&str; 8] = [
    "a_tag_id", "b_tag_id", "c_tag_id", "d_tag_id", "e_tag_id", "f_tag_id", "g_tag_id",
    "h_tag_id",
];

pub struct PgConfigGraphStore {
    pub pool: PgPool,
}

impl PgConfigGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url, max_connections).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ConfigGraphStore for PgConfigGraphStore {
    async fn replace_graph(&self, graph: &ConfigGraph) -> Result<GraphCounts, StorageError> {
        ensure_graph_references(graph)?;
        let mut tx = self.pool.begin().await?;
        for statement in DELETE_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        insert_io_hierarchy(&mut tx, graph).await?;
        insert_derived_tags(&mut tx, graph).await?;
        insert_forwarding(&mut tx, graph).await?;
        tx.commit().await?;
        Ok(graph.counts())
    }

    async fn load_graph(&self) -> Result<ConfigGraph, StorageError> {
        let mut graph = ConfigGraph::default();

        let rows = sqlx::query(
            "select hardware_mapping_id, name, kind, path, description \
             from hardware_mappings order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.hardware_mappings.push(HardwareMappingRecord {
                hardware_mapping_id: row.try_get("hardware_mapping_id")?,
                name: row.try_get("name")?,
                kind: row.try_get("kind")?,
                path: row.try_get("path")?,
                description: row.try_get("description")?,
            });
        }

        let rows = sqlx::query(
            "select io_port_id, kind, name, description, scan_time, time_out, retry_count, \
             auto_recover_time, scan_mode, enabled, serial_settings, hardware_mapping_id, \
             hardware_interface \
             from io_ports order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.io_ports.push(IoPortRecord {
                io_port_id: row.try_get("io_port_id")?,
                kind: row.try_get("kind")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                scan_time: row.try_get("scan_time")?,
                time_out: row.try_get("time_out")?,
                retry_count: row.try_get("retry_count")?,
                auto_recover_time: row.try_get("auto_recover_time")?,
                scan_mode: row.try_get("scan_mode")?,
                enabled: row.try_get("enabled")?,
                serial_settings: row.try_get("serial_settings")?,
                hardware_mapping_id: row.try_get("hardware_mapping_id")?,
                hardware_interface: row.try_get("hardware_interface")?,
            });
        }

        let rows = sqlx::query(
            "select device_id, io_port_id, name, device_type, unit_number, tag_write_type, \
             description, add_device_name_as_prefix, use_ascii_protocol, packet_delay, \
             digital_block_size, analog_block_size, enabled \
             from devices order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.devices.push(DeviceRecord {
                device_id: row.try_get("device_id")?,
                io_port_id: row.try_get("io_port_id")?,
                name: row.try_get("name")?,
                device_type: row.try_get("device_type")?,
                unit_number: row.try_get("unit_number")?,
                tag_write_type: row.try_get("tag_write_type")?,
                description: row.try_get("description")?,
                add_device_name_as_prefix: row.try_get("add_device_name_as_prefix")?,
                use_ascii_protocol: row.try_get("use_ascii_protocol")?,
                packet_delay: row.try_get("packet_delay")?,
                digital_block_size: row.try_get("digital_block_size")?,
                analog_block_size: row.try_get("analog_block_size")?,
                enabled: row.try_get("enabled")?,
            });
        }

        let rows = sqlx::query(
            "select tag_id, device_id, name, data_type, register_type, address, description, \
             scale_type, conversion_type, span_low, span_high, default_value, read_write, \
             clamp_to_low, clamp_to_high, clamp_to_zero, scan_rate \
             from io_tags order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.io_tags.push(IoTagRecord {
                tag_id: row.try_get("tag_id")?,
                device_id: row.try_get("device_id")?,
                name: row.try_get("name")?,
                data_type: row.try_get("data_type")?,
                register_type: row.try_get("register_type")?,
                address: row.try_get("address")?,
                description: row.try_get("description")?,
                scale_type: row.try_get("scale_type")?,
                conversion_type: row.try_get("conversion_type")?,
                span_low: row.try_get("span_low")?,
                span_high: row.try_get("span_high")?,
                default_value: row.try_get("default_value")?,
                read_write: row.try_get("read_write")?,
                clamp_to_low: row.try_get("clamp_to_low")?,
                clamp_to_high: row.try_get("clamp_to_high")?,
                clamp_to_zero: row.try_get("clamp_to_zero")?,
                scan_rate: row.try_get("scan_rate")?,
            });
        }

        let rows = sqlx::query(
            "select calculation_tag_id, name, formula, a, b, c, d, e, f, g, h, \
             a_tag_id, b_tag_id, c_tag_id, d_tag_id, e_tag_id, f_tag_id, g_tag_id, h_tag_id, \
             default_value, period, read_write, span_low, span_high, is_parent, description \
             from calculation_tags order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.calculation_tags.push(calculation_tag_from_row(&row)?);
        }

        let rows = sqlx::query(
            "select stats_tag_id, name, refer_tag, refer_tag_id, aggregation, \
             update_cycle_value, update_cycle_unit, description \
             from stats_tags order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.stats_tags.push(StatsTagRecord {
                stats_tag_id: row.try_get("stats_tag_id")?,
                name: row.try_get("name")?,
                refer_tag: row.try_get("refer_tag")?,
                refer_tag_id: row.try_get("refer_tag_id")?,
                aggregation: row.try_get("aggregation")?,
                update_cycle_value: row.try_get("update_cycle_value")?,
                update_cycle_unit: row.try_get("update_cycle_unit")?,
                description: row.try_get("description")?,
            });
        }

        let rows = sqlx::query("select bridge_id from communication_bridges order by row_seq")
            .fetch_all(&self.pool)
            .await?;
        for row in rows {
            graph.bridges.push(BridgeRecord {
                bridge_id: row.try_get("bridge_id")?,
            });
        }

        let rows = sqlx::query(
            "select block_id, bridge_id, kind, sub_type, label, config_json \
             from bridge_blocks order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.bridge_blocks.push(BridgeBlockRecord {
                block_id: row.try_get("block_id")?,
                bridge_id: row.try_get("bridge_id")?,
                kind: row.try_get("kind")?,
                sub_type: row.try_get("sub_type")?,
                label: row.try_get("label")?,
                config_json: row.try_get("config_json")?,
            });
        }

        let rows = sqlx::query(
            "select destination_id, name, kind, description, config_json \
             from destinations order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.destinations.push(DestinationRecord {
                destination_id: row.try_get("destination_id")?,
                name: row.try_get("name")?,
                kind: row.try_get("kind")?,
                description: row.try_get("description")?,
                config_json: row.try_get("config_json")?,
            });
        }

        let rows = sqlx::query(
            "select destination_id, address, data_type, length, unit_id, value, buffer \
             from virtual_memory_maps order by row_seq",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            graph.virtual_memory_maps.push(VirtualMemoryMapRecord {
                destination_id: row.try_get("destination_id")?,
                address: row.try_get("address")?,
                data_type: row.try_get("data_type")?,
                length: row.try_get("length")?,
                unit_id: row.try_get("unit_id")?,
                value: row.try_get("value")?,
                buffer: row.try_get("buffer")?,
            });
        }

        Ok(graph)
    }
}

fn calculation_tag_from_row(row: &PgRow) -> Result<CalculationTagRecord, StorageError> {
    let mut variables: [Option<String>; 8] = Default::default();
    let mut variable_tag_ids: [Option<String>; 8] = Default::default();
    for (index, column) in VARIABLE_COLUMNS.iter().enumerate() {
        variables[index] = row.try_get(*column)?;
    }
    for (index, column) in VARIABLE_TAG_ID_COLUMNS.iter().enumerate() {
        variable_tag_ids[index] = row.try_get(*column)?;
    }
    Ok(CalculationTagRecord {
        calculation_tag_id: row.try_get("calculation_tag_id")?,
        name: row.try_get("name")?,
        formula: row.try_get("formula")?,
        variables,
        variable_tag_ids,
        default_value: row.try_get("default_value")?,
        period: row.try_get("period")?,
        read_write: row.try_get("read_write")?,
        span_low: row.try_get("span_low")?,
        span_high: row.try_get("span_high")?,
        is_parent: row.try_get("is_parent")?,
        description: row.try_get("description")?,
    })
}

/// 硬件映射 → 端口 → 设备 → IO 标签
async fn insert_io_hierarchy(
    tx: &mut Transaction<'_, Postgres>,
    graph: &ConfigGraph,
) -> Result<(), StorageError> {
    for row in &graph.hardware_mappings {
        sqlx::query(
            "insert into hardware_mappings (hardware_mapping_id, name, kind, path, description) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&row.hardware_mapping_id)
        .bind(&row.name)
        .bind(&row.kind)
        .bind(&row.path)
        .bind(&row.description)
        .execute(&mut **tx)
        .await?;
    }
    for row in &graph.io_ports {
        sqlx::query(
            "insert into io_ports \
             (io_port_id, kind, name, description, scan_time, time_out, retry_count, \
             auto_recover_time, scan_mode, enabled, serial_settings, hardware_mapping_id, \
             hardware_interface) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&row.io_port_id)
        .bind(&row.kind)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.scan_time)
        .bind(row.time_out)
        .bind(row.retry_count)
        .bind(row.auto_recover_time)
        .bind(&row.scan_mode)
        .bind(row.enabled)
        .bind(&row.serial_settings)
        .bind(&row.hardware_mapping_id)
        .bind(&row.hardware_interface)
        .execute(&mut **tx)
        .await?;
    }
    for row in &graph.devices {
        sqlx::query(
            "insert into devices \
             (device_id, io_port_id, name, device_type, unit_number, tag_write_type, \
             description, add_device_name_as_prefix, use_ascii_protocol, packet_delay, \
             digital_block_size, analog_block_size, enabled) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&row.device_id)
        .bind(&row.io_port_id)
        .bind(&row.name)
        .bind(&row.device_type)
        .bind(row.unit_number)
        .bind(&row.tag_write_type)
        .bind(&row.description)
        .bind(row.add_device_name_as_prefix)
        .bind(row.use_ascii_protocol)
        .bind(row.packet_delay)
        .bind(row.digital_block_size)
        .bind(row.analog_block_size)
        .bind(row.enabled)
        .execute(&mut **tx)
        .await?;
    }
    for row in &graph.io_tags {
        sqlx::query(
            "insert into io_tags \
             (tag_id, device_id, name, data_type, register_type, address, description, \
             scale_type, conversion_type, span_low, span_high, default_value, read_write, \
             clamp_to_low, clamp_to_high, clamp_to_zero, scan_rate) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(&row.tag_id)
        .bind(&row.device_id)
        .bind(&row.name)
        .bind(&row.data_type)
        .bind(&row.register_type)
        .bind(&row.address)
        .bind(&row.description)
        .bind(&row.scale_type)
        .bind(&row.conversion_type)
        .bind(row.span_low)
        .bind(row.span_high)
        .bind(row.default_value)
        .bind(&row.read_write)
        .bind(row.clamp_to_low)
        .bind(row.clamp_to_high)
        .bind(row.clamp_to_zero)
        .bind(row.scan_rate)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// 计算标签 → 统计标签
async fn insert_derived_tags(
    tx: &mut Transaction<'_, Postgres>,
    graph: &ConfigGraph,
) -> Result<(), StorageError> {
    for row in &graph.calculation_tags {
        let mut query = sqlx::query(
            "insert into calculation_tags \
             (calculation_tag_id, name, formula, a, b, c, d, e, f, g, h, \
             a_tag_id, b_tag_id, c_tag_id, d_tag_id, e_tag_id, f_tag_id, g_tag_id, h_tag_id, \
             default_value, period, read_write, span_low, span_high, is_parent, description) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)",
        )
        .bind(&row.calculation_tag_id)
        .bind(&row.name)
        .bind(&row.formula);
        for variable in &row.variables {
            query = query.bind(variable);
        }
        for tag_id in &row.variable_tag_ids {
            query = query.bind(tag_id);
        }
        query
            .bind(row.default_value)
            .bind(row.period)
            .bind(&row.read_write)
            .bind(row.span_low)
            .bind(row.span_high)
            .bind(row.is_parent)
            .bind(&row.description)
            .execute(&mut **tx)
            .await?;
    }
    for row in &graph.stats_tags {
        sqlx::query(
            "insert into stats_tags \
             (stats_tag_id, name, refer_tag, refer_tag_id, aggregation, update_cycle_value, \
             update_cycle_unit, description) \
             values ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&row.stats_tag_id)
        .bind(&row.name)
        .bind(&row.refer_tag)
        .bind(&row.refer_tag_id)
        .bind(&row.aggregation)
        .bind(row.update_cycle_value)
        .bind(&row.update_cycle_unit)
        .bind(&row.description)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// 桥接 → 桥接块，目的地 → 虚拟寄存器映射
async fn insert_forwarding(
    tx: &mut Transaction<'_, Postgres>,
    graph: &ConfigGraph,
) -> Result<(), StorageError> {
    for row in &graph.bridges {
        sqlx::query("insert into communication_bridges (bridge_id) values ($1)")
            .bind(&row.bridge_id)
            .execute(&mut **tx)
            .await?;
    }
    for row in &graph.bridge_blocks {
        sqlx::query(
            "insert into bridge_blocks (block_id, bridge_id, kind, sub_type, label, config_json) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&row.block_id)
        .bind(&row.bridge_id)
        .bind(&row.kind)
        .bind(&row.sub_type)
        .bind(&row.label)
        .bind(&row.config_json)
        .execute(&mut **tx)
        .await?;
    }
    for row in &graph.destinations {
        sqlx::query(
            "insert into destinations (destination_id, name, kind, description, config_json) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&row.destination_id)
        .bind(&row.name)
        .bind(&row.kind)
        .bind(&row.description)
        .bind(&row.config_json)
        .execute(&mut **tx)
        .await?;
    }
    for row in &graph.virtual_memory_maps {
        sqlx::query(
            "insert into virtual_memory_maps \
             (destination_id, address, data_type, length, unit_id, value, buffer) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&row.destination_id)
        .bind(&row.address)
        .bind(&row.data_type)
        .bind(row.length)
        .bind(row.unit_id)
        .bind(&row.value)
        .bind(&row.buffer)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
