//! Canvas call contract
//!
//! The canvas is the rendering surface the graph model mirrors itself
//! into. The model never reads back from it (except the box count), so
//! every method is fire-and-forget. Implementations are expected to be
//! tolerant: the model guarantees idempotence on its side via the
//! `in_canvas` flags, not by asking the canvas what it contains.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{
    BoxLayoutMode, BoxSplitMode, BoxType, ConnectionId, GroupId, PortId, PortMode, PortSubType,
    PortType, PortTypesViewFlag,
};

/// Box coordinates: (x, y) canvas position.
pub type Xy = (i32, i32);

/// One-way rendering contract between the graph model and the drawing
/// engine.
pub trait Canvas {
    #[allow(clippy::too_many_arguments)]
    fn add_group(
        &mut self,
        group_id: GroupId,
        name: &str,
        split: BoxSplitMode,
        box_type: BoxType,
        icon_name: &str,
        layout_modes: &[(PortMode, BoxLayoutMode)],
        null_xy: Xy,
        in_xy: Xy,
        out_xy: Xy,
    );
    fn remove_group(&mut self, group_id: GroupId);
    fn rename_group(&mut self, group_id: GroupId, name: &str);
    fn redraw_group(&mut self, group_id: GroupId);
    fn move_group_boxes(&mut self, group_id: GroupId, null_xy: Xy, in_xy: Xy, out_xy: Xy);
    fn split_group(&mut self, group_id: GroupId);
    fn animate_before_join(&mut self, group_id: GroupId);
    fn wrap_group_box(
        &mut self,
        group_id: GroupId,
        port_mode: PortMode,
        wrap: bool,
        animate: bool,
        prevent_overlap: bool,
    );
    fn set_group_layout_mode(
        &mut self,
        group_id: GroupId,
        port_mode: PortMode,
        layout_mode: BoxLayoutMode,
    );
    fn set_group_icon(&mut self, group_id: GroupId, box_type: BoxType, icon_name: &str);
    fn set_optional_gui_state(&mut self, group_id: GroupId, visible: bool);
    fn semi_hide_group(&mut self, group_id: GroupId, hidden: bool);
    fn set_group_in_front(&mut self, group_id: GroupId);
    fn select_filtered_group_box(&mut self, group_id: GroupId, n_select: u32);
    /// The only call whose return value the model consumes.
    fn get_number_of_boxes(&mut self, group_id: GroupId) -> u32;

    fn add_port(
        &mut self,
        group_id: GroupId,
        port_id: PortId,
        display_name: &str,
        port_mode: PortMode,
        port_type: PortType,
        subtype: PortSubType,
    );
    fn remove_port(&mut self, group_id: GroupId, port_id: PortId);
    fn rename_port(&mut self, group_id: GroupId, port_id: PortId, display_name: &str);
    fn select_port(&mut self, group_id: GroupId, port_id: PortId);

    #[allow(clippy::too_many_arguments)]
    fn add_portgroup(
        &mut self,
        group_id: GroupId,
        portgroup_id: crate::types::PortgroupId,
        port_mode: PortMode,
        port_type: PortType,
        subtype: PortSubType,
        port_ids: &[PortId],
    );
    fn remove_portgroup(&mut self, group_id: GroupId, portgroup_id: crate::types::PortgroupId);

    fn connect_ports(
        &mut self,
        connection_id: ConnectionId,
        out_group_id: GroupId,
        out_port_id: PortId,
        in_group_id: GroupId,
        in_port_id: PortId,
    );
    fn disconnect_ports(&mut self, connection_id: ConnectionId);
    fn semi_hide_connection(&mut self, connection_id: ConnectionId, hidden: bool);
    fn set_connection_in_front(&mut self, connection_id: ConnectionId);
}

/// View and batching state threaded through every canvas-sync call.
///
/// Built by the manager right before descending into entity methods, so
/// the flags are a consistent snapshot for the whole sync pass.
pub struct CanvasContext<'a> {
    pub canvas: &'a mut dyn Canvas,
    /// Bulk-change batching: while set, mirroring calls are suppressed and
    /// `in_canvas` stays false until the full rebuild at guard release.
    pub very_fast_operation: bool,
    /// Whether graceful display names are preferred over raw short names.
    pub use_graceful_names: bool,
    /// Active type-view filter.
    pub port_types_view: PortTypesViewFlag,
}

impl CanvasContext<'_> {
    pub fn port_type_shown(&self, port_type: PortType, subtype: PortSubType) -> bool {
        self.port_types_view.shows(port_type, subtype)
    }
}

// ─── Recording canvas ────────────────────────────────────────────────────────

/// Everything a [`RecordingCanvas`] remembers about one call.
///
/// Variants only keep the arguments that matter for asserting on sync
/// behavior; pure cosmetics (icons, coordinates) are collapsed.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    GroupAdded(GroupId, String),
    GroupRemoved(GroupId),
    GroupRenamed(GroupId, String),
    GroupRedrawn(GroupId),
    GroupBoxesMoved(GroupId),
    GroupSplit(GroupId),
    GroupJoinAnimated(GroupId),
    GroupBoxWrapped(GroupId, PortMode, bool),
    GroupLayoutModeSet(GroupId, PortMode, BoxLayoutMode),
    GroupIconSet(GroupId, String),
    GroupGuiStateSet(GroupId, bool),
    GroupSemiHidden(GroupId, bool),
    GroupInFront(GroupId),
    GroupFilteredBoxSelected(GroupId, u32),
    PortAdded(GroupId, PortId, String),
    PortRemoved(GroupId, PortId),
    PortRenamed(GroupId, PortId, String),
    PortSelected(GroupId, PortId),
    PortgroupAdded(GroupId, crate::types::PortgroupId, Vec<PortId>),
    PortgroupRemoved(GroupId, crate::types::PortgroupId),
    Connected(ConnectionId, PortId, PortId),
    Disconnected(ConnectionId),
    ConnectionSemiHidden(ConnectionId, bool),
    ConnectionInFront(ConnectionId),
}

/// A canvas that records every call it receives.
///
/// Useful both for tests and for running the model headless. The event
/// log is shared through an `Rc` handle so callers can keep inspecting
/// it after handing the canvas to the manager.
#[derive(Default)]
pub struct RecordingCanvas {
    events: Rc<RefCell<Vec<CanvasEvent>>>,
    split_groups: RefCell<Vec<GroupId>>,
}

impl RecordingCanvas {
    pub fn new() -> RecordingCanvas {
        RecordingCanvas::default()
    }

    /// Shared handle onto the event log.
    pub fn events(&self) -> Rc<RefCell<Vec<CanvasEvent>>> {
        Rc::clone(&self.events)
    }

    fn push(&self, event: CanvasEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Canvas for RecordingCanvas {
    fn add_group(
        &mut self,
        group_id: GroupId,
        name: &str,
        split: BoxSplitMode,
        _box_type: BoxType,
        _icon_name: &str,
        _layout_modes: &[(PortMode, BoxLayoutMode)],
        _null_xy: Xy,
        _in_xy: Xy,
        _out_xy: Xy,
    ) {
        if split == BoxSplitMode::Yes {
            self.split_groups.borrow_mut().push(group_id);
        }
        self.push(CanvasEvent::GroupAdded(group_id, name.to_string()));
    }

    fn remove_group(&mut self, group_id: GroupId) {
        self.split_groups.borrow_mut().retain(|&id| id != group_id);
        self.push(CanvasEvent::GroupRemoved(group_id));
    }

    fn rename_group(&mut self, group_id: GroupId, name: &str) {
        self.push(CanvasEvent::GroupRenamed(group_id, name.to_string()));
    }

    fn redraw_group(&mut self, group_id: GroupId) {
        self.push(CanvasEvent::GroupRedrawn(group_id));
    }

    fn move_group_boxes(&mut self, group_id: GroupId, _null_xy: Xy, _in_xy: Xy, _out_xy: Xy) {
        self.push(CanvasEvent::GroupBoxesMoved(group_id));
    }

    fn split_group(&mut self, group_id: GroupId) {
        self.split_groups.borrow_mut().push(group_id);
        self.push(CanvasEvent::GroupSplit(group_id));
    }

    fn animate_before_join(&mut self, group_id: GroupId) {
        self.split_groups.borrow_mut().retain(|&id| id != group_id);
        self.push(CanvasEvent::GroupJoinAnimated(group_id));
    }

    fn wrap_group_box(
        &mut self,
        group_id: GroupId,
        port_mode: PortMode,
        wrap: bool,
        _animate: bool,
        _prevent_overlap: bool,
    ) {
        self.push(CanvasEvent::GroupBoxWrapped(group_id, port_mode, wrap));
    }

    fn set_group_layout_mode(
        &mut self,
        group_id: GroupId,
        port_mode: PortMode,
        layout_mode: BoxLayoutMode,
    ) {
        self.push(CanvasEvent::GroupLayoutModeSet(group_id, port_mode, layout_mode));
    }

    fn set_group_icon(&mut self, group_id: GroupId, _box_type: BoxType, icon_name: &str) {
        self.push(CanvasEvent::GroupIconSet(group_id, icon_name.to_string()));
    }

    fn set_optional_gui_state(&mut self, group_id: GroupId, visible: bool) {
        self.push(CanvasEvent::GroupGuiStateSet(group_id, visible));
    }

    fn semi_hide_group(&mut self, group_id: GroupId, hidden: bool) {
        self.push(CanvasEvent::GroupSemiHidden(group_id, hidden));
    }

    fn set_group_in_front(&mut self, group_id: GroupId) {
        self.push(CanvasEvent::GroupInFront(group_id));
    }

    fn select_filtered_group_box(&mut self, group_id: GroupId, n_select: u32) {
        self.push(CanvasEvent::GroupFilteredBoxSelected(group_id, n_select));
    }

    fn get_number_of_boxes(&mut self, group_id: GroupId) -> u32 {
        if self.split_groups.borrow().contains(&group_id) {
            2
        } else {
            1
        }
    }

    fn add_port(
        &mut self,
        group_id: GroupId,
        port_id: PortId,
        display_name: &str,
        _port_mode: PortMode,
        _port_type: PortType,
        _subtype: PortSubType,
    ) {
        self.push(CanvasEvent::PortAdded(group_id, port_id, display_name.to_string()));
    }

    fn remove_port(&mut self, group_id: GroupId, port_id: PortId) {
        self.push(CanvasEvent::PortRemoved(group_id, port_id));
    }

    fn rename_port(&mut self, group_id: GroupId, port_id: PortId, display_name: &str) {
        self.push(CanvasEvent::PortRenamed(group_id, port_id, display_name.to_string()));
    }

    fn select_port(&mut self, group_id: GroupId, port_id: PortId) {
        self.push(CanvasEvent::PortSelected(group_id, port_id));
    }

    fn add_portgroup(
        &mut self,
        group_id: GroupId,
        portgroup_id: crate::types::PortgroupId,
        _port_mode: PortMode,
        _port_type: PortType,
        _subtype: PortSubType,
        port_ids: &[PortId],
    ) {
        self.push(CanvasEvent::PortgroupAdded(group_id, portgroup_id, port_ids.to_vec()));
    }

    fn remove_portgroup(&mut self, group_id: GroupId, portgroup_id: crate::types::PortgroupId) {
        self.push(CanvasEvent::PortgroupRemoved(group_id, portgroup_id));
    }

    fn connect_ports(
        &mut self,
        connection_id: ConnectionId,
        _out_group_id: GroupId,
        out_port_id: PortId,
        _in_group_id: GroupId,
        in_port_id: PortId,
    ) {
        self.push(CanvasEvent::Connected(connection_id, out_port_id, in_port_id));
    }

    fn disconnect_ports(&mut self, connection_id: ConnectionId) {
        self.push(CanvasEvent::Disconnected(connection_id));
    }

    fn semi_hide_connection(&mut self, connection_id: ConnectionId, hidden: bool) {
        self.push(CanvasEvent::ConnectionSemiHidden(connection_id, hidden));
    }

    fn set_connection_in_front(&mut self, connection_id: ConnectionId) {
        self.push(CanvasEvent::ConnectionInFront(connection_id));
    }
}
