//! A cable between one output port and one input port.

use crate::canvas::CanvasContext;
use crate::port::Port;
use crate::types::{ConnectionId, GroupId, PortId, PortSubType, PortType, PortTypesViewFlag};

/// Non-owning snapshot of one connection endpoint.
///
/// A port's type and subtype never change after creation, so the snapshot
/// stays valid for as long as the connection exists; the manager removes
/// connections before destroying either referenced port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnEnd {
    pub group_id: GroupId,
    pub port_id: PortId,
    pub port_type: PortType,
    pub subtype: PortSubType,
}

impl ConnEnd {
    pub fn of(port: &Port) -> ConnEnd {
        ConnEnd {
            group_id: port.group_id,
            port_id: port.port_id,
            port_type: port.port_type,
            subtype: port.subtype,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub connection_id: ConnectionId,
    pub port_out: ConnEnd,
    pub port_in: ConnEnd,
    pub in_canvas: bool,
}

impl Connection {
    pub fn new(connection_id: ConnectionId, port_out: ConnEnd, port_in: ConnEnd) -> Connection {
        Connection {
            connection_id,
            port_out,
            port_in,
            in_canvas: false,
        }
    }

    /// True when this connection touches any port of the given group.
    pub fn concerns_group(&self, group_id: GroupId) -> bool {
        self.port_out.group_id == group_id || self.port_in.group_id == group_id
    }

    pub fn concerns_port(&self, group_id: GroupId, port_id: PortId) -> bool {
        (self.port_out.group_id == group_id && self.port_out.port_id == port_id)
            || (self.port_in.group_id == group_id && self.port_in.port_id == port_id)
    }

    /// Visibility under the active type-view filter, re-evaluated on every
    /// sync pass. Only MIDI, regular-audio and CV-audio cables can ever be
    /// shown; mixed or video combinations are not drawn through this path.
    pub fn shown_in_port_types_view(&self, view: PortTypesViewFlag) -> bool {
        if self.port_out.port_type == PortType::Midi {
            return view.contains(PortTypesViewFlag::MIDI);
        }

        if self.port_out.port_type == PortType::Audio
            && self.port_in.port_type == PortType::Audio
        {
            if self.port_out.subtype == PortSubType::Cv && self.port_in.subtype == PortSubType::Cv {
                return view.contains(PortTypesViewFlag::CV);
            }
            if self.port_out.subtype == PortSubType::Regular
                && self.port_in.subtype == PortSubType::Regular
            {
                return view.contains(PortTypesViewFlag::AUDIO);
            }
        }

        false
    }

    pub fn add_to_canvas(&mut self, ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if self.in_canvas {
            return;
        }
        if !self.shown_in_port_types_view(ctx.port_types_view) {
            return;
        }

        self.in_canvas = true;

        ctx.canvas.connect_ports(
            self.connection_id,
            self.port_out.group_id,
            self.port_out.port_id,
            self.port_in.group_id,
            self.port_in.port_id,
        );
    }

    pub fn remove_from_canvas(&mut self, ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if !self.in_canvas {
            return;
        }

        ctx.canvas.disconnect_ports(self.connection_id);
        self.in_canvas = false;
    }

    pub fn semi_hide(&self, hidden: bool, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.semi_hide_connection(self.connection_id, hidden);
    }

    pub fn set_in_front(&self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.set_connection_in_front(self.connection_id);
    }
}
