//! Remembered portgroup membership, persisted across sessions.

use serde_json::{Value, json};

use crate::types::{PortMode, PortType};

/// A user's manual port grouping for one group/type/mode, keyed by the
/// ports' short names so it survives server restarts and id changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortgroupMem {
    pub group_name: String,
    pub port_type: Option<PortType>,
    pub port_mode: Option<PortMode>,
    /// Ordered short names of the member ports.
    pub port_names: Vec<String>,
    /// When true this grouping wins over server-supplied portgroup
    /// metadata; when false, metadata groupings may replace it.
    pub above_metadatas: bool,
}

impl PortgroupMem {
    /// True when this record targets the given group/type/mode triple.
    pub fn matches(&self, group_name: &str, port_type: PortType, port_mode: PortMode) -> bool {
        self.group_name == group_name
            && self.port_type == Some(port_type)
            && self.port_mode == Some(port_mode)
    }

    /// Two remembered groupings conflict when they target the same
    /// group/type/mode and share at least one port name.
    pub fn has_a_common_port_with(&self, other: &PortgroupMem) -> bool {
        if self.port_type != other.port_type
            || self.port_mode != other.port_mode
            || self.group_name != other.group_name
        {
            return false;
        }

        self.port_names
            .iter()
            .any(|name| other.port_names.contains(name))
    }

    /// Permissive parse: any malformed field keeps its default.
    pub fn from_serialized_dict(src: &Value) -> PortgroupMem {
        let mut mem = PortgroupMem::default();

        let Some(map) = src.as_object() else {
            log::warn!("portgroup_mem: serialized record is not an object, using defaults");
            return mem;
        };

        if let Some(name) = map.get("group_name").and_then(Value::as_str) {
            mem.group_name = name.to_string();
        }
        // 0 is the serialized form of "unset" for both fields
        if let Some(port_type) = map.get("port_type").and_then(Value::as_u64) {
            mem.port_type =
                PortType::from_u32(port_type as u32).filter(|&t| t != PortType::Null);
        }
        if let Some(port_mode) = map.get("port_mode").and_then(Value::as_u64) {
            mem.port_mode =
                PortMode::from_u32(port_mode as u32).filter(|&m| m != PortMode::Null);
        }
        if let Some(names) = map.get("port_names").and_then(Value::as_array) {
            mem.port_names = names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
        if let Some(above) = map.get("above_metadatas").and_then(Value::as_bool) {
            mem.above_metadatas = above;
        }

        mem
    }

    pub fn as_serializable_dict(&self) -> Value {
        json!({
            "group_name": self.group_name,
            "port_type": self.port_type.map(PortType::as_u32).unwrap_or(0),
            "port_mode": self.port_mode.map(PortMode::as_u32).unwrap_or(0),
            "port_names": self.port_names,
            "above_metadatas": self.above_metadatas,
        })
    }
}
