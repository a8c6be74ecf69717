//! Persisted layout record for one group box.

use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::types::{BoxLayoutMode, GroupPosFlags, PortMode, PortTypesViewFlag};

/// Box positions, split/wrap flags and per-mode layout modes for one group,
/// scoped to one port-types view.
///
/// The serialized shape is shared with older releases, so parsing is
/// permissive: a malformed or missing field falls back to its default
/// instead of failing the whole load.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPos {
    pub port_types_view: PortTypesViewFlag,
    pub group_name: String,
    pub null_zone: String,
    pub in_zone: String,
    pub out_zone: String,
    pub null_xy: (i32, i32),
    pub in_xy: (i32, i32),
    pub out_xy: (i32, i32),
    pub flags: GroupPosFlags,
    pub layout_modes: BTreeMap<PortMode, BoxLayoutMode>,
    /// False for a record freshly created for a never-seen group; becomes
    /// true once the group has filled in its defaults. Not serialized.
    pub fully_set: bool,
}

impl Default for GroupPos {
    fn default() -> GroupPos {
        GroupPos {
            port_types_view: PortTypesViewFlag::NONE,
            group_name: String::new(),
            null_zone: String::new(),
            in_zone: String::new(),
            out_zone: String::new(),
            null_xy: (0, 0),
            in_xy: (0, 0),
            out_xy: (0, 0),
            flags: GroupPosFlags::default(),
            layout_modes: BTreeMap::new(),
            fully_set: true,
        }
    }
}

fn as_point(value: Option<&Value>) -> Option<(i32, i32)> {
    let arr = value?.as_array()?;
    if arr.len() != 2 {
        return None;
    }
    let x = arr[0].as_i64()?;
    let y = arr[1].as_i64()?;
    Some((x as i32, y as i32))
}

impl GroupPos {
    /// A record for a group the manager has never seen in this view.
    pub fn new_for(port_types_view: PortTypesViewFlag, group_name: &str) -> GroupPos {
        GroupPos {
            port_types_view,
            group_name: group_name.to_string(),
            fully_set: false,
            ..GroupPos::default()
        }
    }

    /// Rebuild from a serialized dictionary, field by field.
    ///
    /// Unknown flag bits are masked off and unknown layout-mode entries
    /// dropped; nothing here ever fails.
    pub fn from_serialized_dict(src: &Value) -> GroupPos {
        let mut gpos = GroupPos::default();

        let Some(map) = src.as_object() else {
            log::warn!("group_pos: serialized record is not an object, using defaults");
            return gpos;
        };

        if let Some(view) = map.get("port_types_view").and_then(Value::as_u64) {
            gpos.port_types_view = PortTypesViewFlag(view as u32) & PortTypesViewFlag::ALL;
        }
        if let Some(name) = map.get("group_name").and_then(Value::as_str) {
            gpos.group_name = name.to_string();
        }
        if let Some(zone) = map.get("null_zone").and_then(Value::as_str) {
            gpos.null_zone = zone.to_string();
        }
        if let Some(zone) = map.get("in_zone").and_then(Value::as_str) {
            gpos.in_zone = zone.to_string();
        }
        if let Some(zone) = map.get("out_zone").and_then(Value::as_str) {
            gpos.out_zone = zone.to_string();
        }
        if let Some(xy) = as_point(map.get("null_xy")) {
            gpos.null_xy = xy;
        }
        if let Some(xy) = as_point(map.get("in_xy")) {
            gpos.in_xy = xy;
        }
        if let Some(xy) = as_point(map.get("out_xy")) {
            gpos.out_xy = xy;
        }
        if let Some(flags) = map.get("flags").and_then(Value::as_u64) {
            gpos.flags = GroupPosFlags(flags as u32) & GroupPosFlags::ALL;
        }
        if let Some(modes) = map.get("layout_modes").and_then(Value::as_object) {
            for (key, value) in modes {
                let mode = key.parse::<u32>().ok().and_then(PortMode::from_u32);
                let layout = value.as_u64().and_then(|v| BoxLayoutMode::from_u32(v as u32));
                match (mode, layout) {
                    (Some(mode), Some(layout)) => {
                        gpos.layout_modes.insert(mode, layout);
                    }
                    _ => {
                        log::warn!("group_pos: dropping unknown layout mode entry {key}={value}");
                    }
                }
            }
        }

        gpos
    }

    pub fn as_serializable_dict(&self) -> Value {
        let layout_modes: serde_json::Map<String, Value> = self
            .layout_modes
            .iter()
            .map(|(mode, layout)| (mode.as_u32().to_string(), json!(layout.as_u32())))
            .collect();

        json!({
            "port_types_view": self.port_types_view.0,
            "group_name": self.group_name,
            "null_zone": self.null_zone,
            "in_zone": self.in_zone,
            "out_zone": self.out_zone,
            "null_xy": [self.null_xy.0, self.null_xy.1],
            "in_xy": [self.in_xy.0, self.in_xy.1],
            "out_xy": [self.out_xy.0, self.out_xy.1],
            "flags": self.flags.0,
            "layout_modes": layout_modes,
        })
    }

    pub fn set_layout_mode(&mut self, port_mode: PortMode, layout_mode: BoxLayoutMode) {
        self.layout_modes.insert(port_mode, layout_mode);
    }

    pub fn get_layout_mode(&self, port_mode: PortMode) -> BoxLayoutMode {
        self.layout_modes
            .get(&port_mode)
            .copied()
            .unwrap_or(BoxLayoutMode::Auto)
    }
}
