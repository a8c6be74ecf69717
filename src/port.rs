//! One signal endpoint and its canvas mirroring.

use crate::canvas::CanvasContext;
use crate::types::{GroupId, JackPortFlags, PortId, PortMode, PortSubType, PortType, PortgroupId};

/// One named port of a group.
///
/// Identity is `(full_name, port_id)`; the `group_id` back-reference is
/// stamped by the owning group before the port is used anywhere.
#[derive(Debug, Clone)]
pub struct Port {
    pub port_id: PortId,
    pub group_id: GroupId,
    pub full_name: String,
    pub port_type: PortType,
    pub subtype: PortSubType,
    pub flags: JackPortFlags,
    pub uuid: u64,
    /// 0 while the port is not in any portgroup.
    pub portgroup_id: PortgroupId,
    /// Set by the user to opt this port out of stereo detection.
    pub prevent_stereo: bool,
    /// External sort hint (server metadata); absent hints sort last.
    pub order: Option<u32>,
    /// Graceful name shown on the canvas; derived, mutable.
    pub display_name: String,
    /// Digit held back by a naming rule until a sibling port justifies it.
    pub last_digit_to_add: Option<char>,
    /// Pretty-name metadata supplied by the server; overrides everything.
    pub pretty_name: String,
    /// Server-supplied portgroup tag.
    pub mdata_portgroup: String,
    pub in_canvas: bool,
}

impl Port {
    pub fn new(
        port_id: PortId,
        full_name: &str,
        port_type: PortType,
        flags: JackPortFlags,
        uuid: u64,
    ) -> Port {
        let subtype = if port_type == PortType::Audio
            && flags.contains(JackPortFlags::IS_CONTROL_VOLTAGE)
        {
            PortSubType::Cv
        } else if port_type == PortType::Midi
            && (full_name.starts_with("a2j:") || full_name.starts_with("Midi-Bridge:"))
        {
            PortSubType::A2j
        } else {
            PortSubType::Regular
        };

        Port {
            port_id,
            group_id: 0,
            full_name: full_name.to_string(),
            port_type,
            subtype,
            flags,
            uuid,
            portgroup_id: 0,
            prevent_stereo: false,
            order: None,
            display_name: String::new(),
            last_digit_to_add: None,
            pretty_name: String::new(),
            mdata_portgroup: String::new(),
            in_canvas: false,
        }
    }

    pub fn mode(&self) -> PortMode {
        if self.flags.contains(JackPortFlags::IS_OUTPUT) {
            PortMode::Output
        } else if self.flags.contains(JackPortFlags::IS_INPUT) {
            PortMode::Input
        } else {
            PortMode::Null
        }
    }

    pub fn full_type(&self) -> (PortType, PortSubType) {
        (self.port_type, self.subtype)
    }

    /// Strip the client prefix, including the MIDI bridge conventions:
    /// `a2j:<client>: <name>`, `Midi-Bridge:<client>) <name>` and the
    /// PipeWire `jack.filter_name` variant `Midi-Bridge:<client>: <name>`.
    pub fn short_name(&self) -> &str {
        if let Some(long_name) = self.full_name.strip_prefix("a2j:") {
            if let Some((_, name)) = long_name.split_once(": ") {
                return name;
            }
        }

        if let Some(long_name) = self.full_name.strip_prefix("Midi-Bridge:") {
            if let Some((_, name)) = long_name.split_once(") ") {
                return name;
            }
            if let Some((_, name)) = long_name.split_once(": ") {
                return name;
            }
        }

        self.full_name
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or("")
    }

    /// Sort key for the canonical port order: type, then subtype, then the
    /// external order hint (hinted ports first), then creation id. Strict
    /// and total, so sorting is deterministic and idempotent.
    pub fn sort_key(&self) -> (PortType, PortSubType, bool, u32, PortId) {
        (
            self.port_type,
            self.subtype,
            self.order.is_none(),
            self.order.unwrap_or(0),
            self.port_id,
        )
    }

    /// The label the canvas should show right now. With graceful names
    /// disabled the raw short name wins over everything, pretty-name
    /// metadata included.
    pub fn display_label(&self, use_graceful_names: bool) -> &str {
        if !use_graceful_names {
            return self.short_name();
        }
        if !self.pretty_name.is_empty() {
            return &self.pretty_name;
        }
        &self.display_name
    }

    /// Append the deferred digit ("Launchpad" becomes "Launchpad 1") once
    /// a numbered sibling port made it unambiguous.
    pub fn add_the_last_digit(&mut self, ctx: &mut CanvasContext) {
        if let Some(digit) = self.last_digit_to_add.take() {
            self.display_name.push(' ');
            self.display_name.push(digit);
            self.rename_in_canvas(ctx);
        }
    }

    pub fn add_to_canvas(&mut self, ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if self.in_canvas {
            return;
        }
        if !ctx.port_type_shown(self.port_type, self.subtype) {
            return;
        }

        let display_name = self.display_label(ctx.use_graceful_names).to_string();
        self.in_canvas = true;

        ctx.canvas.add_port(
            self.group_id,
            self.port_id,
            &display_name,
            self.mode(),
            self.port_type,
            self.subtype,
        );
    }

    pub fn remove_from_canvas(&mut self, ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if !self.in_canvas {
            return;
        }

        ctx.canvas.remove_port(self.group_id, self.port_id);
        self.in_canvas = false;
    }

    pub fn rename_in_canvas(&mut self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        let display_name = self.display_label(ctx.use_graceful_names).to_string();
        ctx.canvas
            .rename_port(self.group_id, self.port_id, &display_name);
    }

    pub fn select_in_canvas(&self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.select_port(self.group_id, self.port_id);
    }
}
