//! A bundle of ports (usually a stereo pair) shown as one canvas unit.

use crate::canvas::CanvasContext;
use crate::port::Port;
use crate::types::{GroupId, PortId, PortMode, PortSubType, PortType, PortgroupId};

/// An ordered tuple of two or more ports of identical type and mode,
/// owned by one group. Built and torn down only by the detection
/// algorithm, never directly by user action.
#[derive(Debug, Clone)]
pub struct Portgroup {
    pub group_id: GroupId,
    pub portgroup_id: PortgroupId,
    pub port_mode: PortMode,
    pub port_type: PortType,
    pub subtype: PortSubType,
    /// Member ports, in display order. Immutable once built.
    pub port_ids: Vec<PortId>,
    /// Server metadata tag this portgroup was built from, if any.
    pub mdata_portgroup: String,
    /// True when built from a remembered grouping that outranks metadata.
    pub above_metadatas: bool,
    pub in_canvas: bool,
}

impl Portgroup {
    pub fn new(
        group_id: GroupId,
        portgroup_id: PortgroupId,
        port_mode: PortMode,
        port_type: PortType,
        subtype: PortSubType,
        port_ids: Vec<PortId>,
    ) -> Portgroup {
        Portgroup {
            group_id,
            portgroup_id,
            port_mode,
            port_type,
            subtype,
            port_ids,
            mdata_portgroup: String::new(),
            above_metadatas: false,
            in_canvas: false,
        }
    }

    pub fn full_type(&self) -> (PortType, PortSubType) {
        (self.port_type, self.subtype)
    }

    /// Mirror into the canvas. Requires every member port to already be
    /// there; a portgroup with fewer than two visible members is never
    /// drawn.
    pub fn add_to_canvas(&mut self, ports: &[Port], ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if self.in_canvas {
            return;
        }
        if !ctx.port_type_shown(self.port_type, self.subtype) {
            return;
        }
        if self.port_ids.len() < 2 {
            return;
        }

        for &port_id in &self.port_ids {
            let in_canvas = ports
                .iter()
                .find(|p| p.port_id == port_id)
                .is_some_and(|p| p.in_canvas);
            if !in_canvas {
                return;
            }
        }

        self.in_canvas = true;

        ctx.canvas.add_portgroup(
            self.group_id,
            self.portgroup_id,
            self.port_mode,
            self.port_type,
            self.subtype,
            &self.port_ids,
        );
    }

    pub fn remove_from_canvas(&mut self, ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if !self.in_canvas {
            return;
        }

        ctx.canvas.remove_portgroup(self.group_id, self.portgroup_id);
        self.in_canvas = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasEvent, RecordingCanvas};
    use crate::types::{JackPortFlags, PortTypesViewFlag};

    fn port_in_canvas(port_id: PortId, in_canvas: bool) -> Port {
        let mut port = Port::new(
            port_id,
            &format!("app:out_{port_id}"),
            PortType::Audio,
            JackPortFlags::IS_OUTPUT,
            0,
        );
        port.in_canvas = in_canvas;
        port
    }

    #[test]
    fn test_needs_all_members_in_canvas() {
        let mut canvas = RecordingCanvas::new();
        let events = canvas.events();
        let mut ctx = CanvasContext {
            canvas: &mut canvas,
            very_fast_operation: false,
            use_graceful_names: true,
            port_types_view: PortTypesViewFlag::ALL,
        };

        let ports = vec![port_in_canvas(1, true), port_in_canvas(2, false)];
        let mut pg = Portgroup::new(
            7,
            1,
            PortMode::Output,
            PortType::Audio,
            PortSubType::Regular,
            vec![1, 2],
        );

        pg.add_to_canvas(&ports, &mut ctx);
        assert!(!pg.in_canvas);
        assert!(events.borrow().is_empty());

        let ports = vec![port_in_canvas(1, true), port_in_canvas(2, true)];
        pg.add_to_canvas(&ports, &mut ctx);
        pg.add_to_canvas(&ports, &mut ctx);
        assert!(pg.in_canvas);
        assert_eq!(
            *events.borrow(),
            vec![CanvasEvent::PortgroupAdded(7, 1, vec![1, 2])]
        );
    }
}
