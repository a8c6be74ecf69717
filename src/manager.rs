//! The owning seam of the graph model.
//!
//! `PatchbayManager` owns the canvas handle, the groups, the connection
//! list and the persisted-layout tables, allocates every id, and exposes
//! the entry points a sound-server backend calls when the graph changes.
//! All mutation goes through here; entities never reach the canvas except
//! through a [`CanvasContext`] built by the manager.

use std::collections::HashMap;

use serde_json::Value;

use crate::canvas::{Canvas, CanvasContext};
use crate::connection::{ConnEnd, Connection};
use crate::group::Group;
use crate::group_pos::GroupPos;
use crate::port::Port;
use crate::portgroup_mem::PortgroupMem;
use crate::types::{
    BoxLayoutMode, ConnectionId, GroupId, JackPortFlags, PortId, PortMode, PortType,
    PortTypesViewFlag, PortgroupId,
};

pub struct PatchbayManager {
    canvas: Box<dyn Canvas>,
    pub groups: Vec<Group>,
    pub connections: Vec<Connection>,
    /// Remembered portgroups, user-made or learned; checked on every new
    /// port before the stereo heuristic runs.
    portgroups_memory: Vec<PortgroupMem>,
    /// Every layout record ever seen, one per (group name, view).
    group_positions: Vec<GroupPos>,
    /// Records changed since the last drain, for the persistence layer.
    positions_to_save: Vec<GroupPos>,
    ports_by_name: HashMap<String, (GroupId, PortId)>,
    pub port_types_view: PortTypesViewFlag,
    use_graceful_names: bool,
    very_fast_depth: u32,
    optimized_depth: u32,
    next_group_id: GroupId,
    next_port_id: PortId,
    next_portgroup_id: PortgroupId,
    next_connection_id: ConnectionId,
}

impl PatchbayManager {
    pub fn new(canvas: Box<dyn Canvas>) -> PatchbayManager {
        PatchbayManager {
            canvas,
            groups: Vec::new(),
            connections: Vec::new(),
            portgroups_memory: Vec::new(),
            group_positions: Vec::new(),
            positions_to_save: Vec::new(),
            ports_by_name: HashMap::new(),
            port_types_view: PortTypesViewFlag::AUDIO
                | PortTypesViewFlag::MIDI
                | PortTypesViewFlag::CV,
            use_graceful_names: true,
            very_fast_depth: 0,
            optimized_depth: 0,
            next_group_id: 1,
            next_port_id: 1,
            // 0 on a port means "not in any portgroup"
            next_portgroup_id: 1,
            next_connection_id: 1,
        }
    }

    /// Split the borrow: a canvas context plus the tables the entity
    /// methods need, all alive at once.
    fn parts(
        &mut self,
    ) -> (
        CanvasContext<'_>,
        &mut Vec<Group>,
        &mut Vec<Connection>,
        &mut Vec<PortgroupMem>,
        &mut PortgroupId,
    ) {
        let PatchbayManager {
            canvas,
            groups,
            connections,
            portgroups_memory,
            next_portgroup_id,
            very_fast_depth,
            use_graceful_names,
            port_types_view,
            ..
        } = self;

        (
            CanvasContext {
                canvas: canvas.as_mut(),
                very_fast_operation: *very_fast_depth > 0,
                use_graceful_names: *use_graceful_names,
                port_types_view: *port_types_view,
            },
            groups,
            connections,
            portgroups_memory,
            next_portgroup_id,
        )
    }

    // ─── Lookups ───────────────────────────────────────────────────────────

    pub fn get_group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    pub fn get_group_from_name(&self, group_name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == group_name)
    }

    pub fn get_port_from_name(&self, full_name: &str) -> Option<&Port> {
        let &(group_id, port_id) = self.ports_by_name.get(full_name)?;
        self.get_group(group_id)?.port(port_id)
    }

    fn group_index(&self, group_id: GroupId) -> Option<usize> {
        self.groups.iter().position(|g| g.group_id == group_id)
    }

    fn port_location(&self, full_name: &str) -> Option<(usize, PortId)> {
        let &(group_id, port_id) = self.ports_by_name.get(full_name)?;
        Some((self.group_index(group_id)?, port_id))
    }

    // ─── Layout records ────────────────────────────────────────────────────

    /// The stored record for this group in the active view, or a fresh
    /// incomplete one (which is also stored).
    fn group_position_for(&mut self, group_name: &str) -> GroupPos {
        let view = self.port_types_view;
        if let Some(gpos) = self
            .group_positions
            .iter()
            .find(|g| g.group_name == group_name && g.port_types_view == view)
        {
            return gpos.clone();
        }

        let gpos = GroupPos::new_for(view, group_name);
        self.group_positions.push(gpos.clone());
        gpos
    }

    fn store_position(&mut self, gpos: GroupPos) {
        match self.group_positions.iter_mut().find(|g| {
            g.group_name == gpos.group_name && g.port_types_view == gpos.port_types_view
        }) {
            Some(stored) => *stored = gpos,
            None => self.group_positions.push(gpos),
        }
    }

    /// Record the group's current position and queue it for persistence.
    fn save_group_position(&mut self, group_index: usize) {
        let gpos = self.groups[group_index].current_position.clone();
        self.store_position(gpos.clone());
        self.positions_to_save.retain(|g| {
            !(g.group_name == gpos.group_name && g.port_types_view == gpos.port_types_view)
        });
        self.positions_to_save.push(gpos);
    }

    /// Drain the queue of layout records awaiting persistence.
    pub fn take_positions_to_save(&mut self) -> Vec<GroupPos> {
        std::mem::take(&mut self.positions_to_save)
    }

    /// Take a position record from outside (a session file, another
    /// instance) and apply it to the live group if it targets the active
    /// view.
    pub fn apply_group_position(&mut self, gpos: GroupPos, view_change: bool) {
        self.store_position(gpos.clone());

        if gpos.port_types_view != self.port_types_view {
            return;
        }
        let Some(index) = self.groups.iter().position(|g| g.name == gpos.group_name) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        groups[index].set_group_position(gpos, view_change, &mut ctx);
    }

    /// Load persisted layout records (a JSON array of dicts). Malformed
    /// entries degrade to defaults; nothing fails.
    pub fn load_positions(&mut self, serialized: &Value) {
        let Some(entries) = serialized.as_array() else {
            log::warn!("manager: positions payload is not an array, ignoring");
            return;
        };

        for entry in entries {
            self.store_position(GroupPos::from_serialized_dict(entry));
        }
    }

    pub fn serialized_positions(&self) -> Value {
        Value::Array(
            self.group_positions
                .iter()
                .map(GroupPos::as_serializable_dict)
                .collect(),
        )
    }

    pub fn load_portgroups_memory(&mut self, serialized: &Value) {
        let Some(entries) = serialized.as_array() else {
            log::warn!("manager: portgroups payload is not an array, ignoring");
            return;
        };

        for entry in entries {
            self.portgroups_memory
                .push(PortgroupMem::from_serialized_dict(entry));
        }
    }

    pub fn serialized_portgroups_memory(&self) -> Value {
        Value::Array(
            self.portgroups_memory
                .iter()
                .map(PortgroupMem::as_serializable_dict)
                .collect(),
        )
    }

    // ─── Batching guards ───────────────────────────────────────────────────

    /// Counted bulk-change guard. While held, entity mirroring calls are
    /// suppressed; releasing the outermost guard rebuilds the whole
    /// canvas in one pass.
    pub fn set_very_fast_operation(&mut self, yesno: bool) {
        if yesno {
            self.very_fast_depth += 1;
            return;
        }

        if self.very_fast_depth == 0 {
            return;
        }
        self.very_fast_depth -= 1;
        if self.very_fast_depth == 0 {
            self.finish_very_fast_operation();
        }
    }

    /// Re-add every group, port, portgroup and connection to the canvas.
    /// Idempotent: entities already there are skipped.
    pub fn finish_very_fast_operation(&mut self) {
        let (mut ctx, groups, connections, ..) = self.parts();

        for group in groups.iter_mut() {
            group.add_to_canvas(&mut ctx);
            group.add_all_ports_to_canvas(&mut ctx);
        }
        for connection in connections.iter_mut() {
            connection.add_to_canvas(&mut ctx);
        }
    }

    /// Counted redraw-coalescing guard, held across multi-step canvas
    /// changes like the sort pass.
    pub fn optimize_operation(&mut self, yesno: bool) {
        if yesno {
            self.optimized_depth += 1;
        } else {
            self.optimized_depth = self.optimized_depth.saturating_sub(1);
        }
    }

    // ─── Ports ─────────────────────────────────────────────────────────────

    /// A new port announced by the server. Creates the owning group on
    /// first sight of its name prefix, derives the graceful name, mirrors
    /// into the canvas and runs the portgroup detection.
    pub fn add_port(
        &mut self,
        full_name: &str,
        port_type: PortType,
        flags: JackPortFlags,
        uuid: u64,
    ) -> (GroupId, PortId) {
        let port_id = self.next_port_id;
        self.next_port_id += 1;
        let port = Port::new(port_id, full_name, port_type, flags, uuid);

        let group_name = full_name
            .split(':')
            .next()
            .unwrap_or(full_name)
            .to_string();

        let group_index = match self.groups.iter().position(|g| g.name == group_name) {
            Some(index) => index,
            None => {
                let gpos = self.group_position_for(&group_name);
                let group_id = self.next_group_id;
                self.next_group_id += 1;

                log::debug!("manager: new group '{group_name}' ({group_id})");
                let mut group = Group::new(group_id, &group_name, gpos);
                group.a2j_group = group_name == "a2j";
                self.groups.push(group);
                self.groups.len() - 1
            }
        };
        let group_id = self.groups[group_index].group_id;

        if self.groups[group_index].add_port(port) {
            self.save_group_position(group_index);
        }
        self.ports_by_name
            .insert(full_name.to_string(), (group_id, port_id));

        let port_index = self.groups[group_index].ports.len() - 1;
        self.groups[group_index].graceful_port(port_index);

        {
            let (mut ctx, groups, _, memory, next_portgroup_id) = self.parts();
            let group = &mut groups[group_index];

            group.add_to_canvas(&mut ctx);
            if let Some(port) = group.ports.last_mut() {
                port.add_to_canvas(&mut ctx);
            }
            group.check_for_portgroup_on_last_port(memory, next_portgroup_id, &mut ctx);
            group.check_for_display_name_on_last_port(&mut ctx);
        }

        (group_id, port_id)
    }

    /// A port disappeared. Connections referencing it go first, then its
    /// portgroup, then the port; an emptied group is destroyed.
    pub fn remove_port(&mut self, full_name: &str) {
        let Some((group_id, port_id)) = self.ports_by_name.remove(full_name) else {
            log::warn!("manager: remove_port for unknown port '{full_name}'");
            return;
        };
        let Some(group_index) = self.group_index(group_id) else {
            return;
        };

        {
            let (mut ctx, groups, connections, ..) = self.parts();

            for connection in connections
                .iter_mut()
                .filter(|c| c.concerns_port(group_id, port_id))
            {
                connection.remove_from_canvas(&mut ctx);
            }

            let group = &mut groups[group_index];
            let portgroup_id = group.port(port_id).map(|p| p.portgroup_id).unwrap_or(0);
            if portgroup_id != 0 {
                group.remove_portgroup(portgroup_id, &mut ctx);
            }
            if let Some(mut port) = group.remove_port(port_id) {
                port.remove_from_canvas(&mut ctx);
            }
            if group.ports.is_empty() {
                group.remove_from_canvas(&mut ctx);
            }
        }

        self.connections
            .retain(|c| !c.concerns_port(group_id, port_id));

        if self.groups[group_index].ports.is_empty() {
            log::debug!(
                "manager: dropping empty group '{}'",
                self.groups[group_index].name
            );
            self.groups.remove(group_index);
        }
    }

    pub fn rename_port(&mut self, full_name: &str, pretty_name: &str) {
        self.set_port_pretty_name(full_name, pretty_name);
    }

    pub fn set_port_pretty_name(&mut self, full_name: &str, pretty_name: &str) {
        let Some((group_index, port_id)) = self.port_location(full_name) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        if let Some(port) = groups[group_index].port_mut(port_id) {
            port.pretty_name = pretty_name.to_string();
            port.rename_in_canvas(&mut ctx);
        }
    }

    /// A portgroup metadata tag changed; the whole group is re-sorted so
    /// the tag runs are re-evaluated.
    pub fn set_port_mdata_portgroup(&mut self, full_name: &str, tag: &str) {
        let Some((group_index, port_id)) = self.port_location(full_name) else {
            return;
        };
        let group_id = self.groups[group_index].group_id;

        if let Some(port) = self.groups[group_index].port_mut(port_id) {
            if port.mdata_portgroup == tag {
                return;
            }
            port.mdata_portgroup = tag.to_string();
        }

        self.sort_ports_in_canvas(group_id);
    }

    pub fn set_port_order(&mut self, full_name: &str, order: Option<u32>) {
        let Some((group_index, port_id)) = self.port_location(full_name) else {
            return;
        };
        let group_id = self.groups[group_index].group_id;

        if let Some(port) = self.groups[group_index].port_mut(port_id) {
            if port.order == order {
                return;
            }
            port.order = order;
        }

        self.sort_ports_in_canvas(group_id);
    }

    /// Opt a port out of (or back into) stereo detection. Opting out
    /// tears down the portgroup it is currently part of.
    pub fn set_prevent_stereo(&mut self, full_name: &str, prevent: bool) {
        let Some((group_index, port_id)) = self.port_location(full_name) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        let group = &mut groups[group_index];

        let Some(port) = group.port_mut(port_id) else {
            return;
        };
        if port.prevent_stereo == prevent {
            return;
        }
        port.prevent_stereo = prevent;
        let portgroup_id = port.portgroup_id;

        if prevent && portgroup_id != 0 {
            group.remove_portgroup(portgroup_id, &mut ctx);
        }
    }

    pub fn select_port(&mut self, full_name: &str) {
        let Some((group_index, port_id)) = self.port_location(full_name) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        if let Some(port) = groups[group_index].port(port_id) {
            port.select_in_canvas(&mut ctx);
        }
    }

    // ─── Connections ───────────────────────────────────────────────────────

    pub fn add_connection(
        &mut self,
        port_out_name: &str,
        port_in_name: &str,
    ) -> Option<ConnectionId> {
        let port_out = ConnEnd::of(self.get_port_from_name(port_out_name)?);
        let port_in = ConnEnd::of(self.get_port_from_name(port_in_name)?);

        let connection_id = self.next_connection_id;
        self.next_connection_id += 1;
        let mut connection = Connection::new(connection_id, port_out, port_in);

        {
            let (mut ctx, ..) = self.parts();
            connection.add_to_canvas(&mut ctx);
        }

        self.connections.push(connection);
        Some(connection_id)
    }

    pub fn remove_connection(&mut self, connection_id: ConnectionId) {
        let Some(index) = self
            .connections
            .iter()
            .position(|c| c.connection_id == connection_id)
        else {
            log::warn!("manager: remove_connection for unknown id {connection_id}");
            return;
        };

        let mut connection = self.connections.remove(index);
        let (mut ctx, ..) = self.parts();
        connection.remove_from_canvas(&mut ctx);
    }

    // ─── Sort pass ─────────────────────────────────────────────────────────

    /// Re-sort one group's ports into the canonical order and re-derive
    /// its portgroups. Everything of the group leaves the canvas, the
    /// model is rebuilt, then everything returns; a redraw is issued when
    /// this call owned the coalescing guard.
    pub fn sort_ports_in_canvas(&mut self, group_id: GroupId) {
        let Some(group_index) = self.group_index(group_id) else {
            return;
        };

        let already_optimized = self.optimized_depth > 0;
        self.optimize_operation(true);

        {
            let (mut ctx, groups, connections, memory, next_portgroup_id) = self.parts();
            let group = &mut groups[group_index];

            if !ctx.very_fast_operation {
                for connection in connections
                    .iter_mut()
                    .filter(|c| c.concerns_group(group_id))
                {
                    connection.remove_from_canvas(&mut ctx);
                }
                for portgroup in &mut group.portgroups {
                    portgroup.remove_from_canvas(&mut ctx);
                }
                for port in &mut group.ports {
                    port.remove_from_canvas(&mut ctx);
                }
            }

            group.sort_ports();
            group.rebuild_portgroups(memory.as_slice(), next_portgroup_id, &mut ctx);

            if !ctx.very_fast_operation {
                group.add_all_ports_to_canvas(&mut ctx);
                for connection in connections
                    .iter_mut()
                    .filter(|c| c.concerns_group(group_id))
                {
                    connection.add_to_canvas(&mut ctx);
                }
            }
        }

        self.optimize_operation(false);
        if !already_optimized {
            let (mut ctx, groups, ..) = self.parts();
            groups[group_index].redraw_in_canvas(&mut ctx);
        }
    }

    // ─── Portgroup memory ──────────────────────────────────────────────────

    /// A remembered grouping arrived (user action or persisted state).
    /// Replaces any stored memory sharing a port with it, then re-applies
    /// it to the live group.
    pub fn portgroup_memory_added(&mut self, mem: PortgroupMem) {
        self.portgroups_memory
            .retain(|stored| !stored.has_a_common_port_with(&mem));
        self.portgroups_memory.push(mem.clone());

        let (mut ctx, groups, _, _, next_portgroup_id) = self.parts();
        for group in groups.iter_mut().filter(|g| g.name == mem.group_name) {
            group.portgroup_memory_added(&mem, next_portgroup_id, &mut ctx);
        }
    }

    // ─── View ──────────────────────────────────────────────────────────────

    /// Switch the type-view filter: every group applies its remembered
    /// layout for the new view and re-syncs visibility, then connections
    /// are re-evaluated.
    pub fn change_port_types_view(&mut self, view: PortTypesViewFlag) {
        if view == self.port_types_view {
            return;
        }
        self.port_types_view = view;

        for group_index in 0..self.groups.len() {
            let group_name = self.groups[group_index].name.clone();
            let gpos = self.group_position_for(&group_name);

            let (mut ctx, groups, ..) = self.parts();
            let group = &mut groups[group_index];

            let was_in_canvas = group.in_canvas;
            group.set_group_position(gpos.clone(), true, &mut ctx);
            if !was_in_canvas {
                group.current_position = gpos;
            }
            group.change_port_types_view(&mut ctx);
        }

        let (mut ctx, _, connections, ..) = self.parts();
        for connection in connections.iter_mut() {
            if connection.shown_in_port_types_view(ctx.port_types_view) {
                connection.add_to_canvas(&mut ctx);
            } else {
                connection.remove_from_canvas(&mut ctx);
            }
        }
    }

    pub fn set_use_graceful_names(&mut self, yesno: bool) {
        if self.use_graceful_names == yesno {
            return;
        }
        self.use_graceful_names = yesno;

        let (mut ctx, groups, ..) = self.parts();
        for group in groups.iter_mut() {
            group.update_name_in_canvas(&mut ctx);
            group.update_ports_in_canvas(&mut ctx);
        }
    }

    // ─── Group passthroughs ────────────────────────────────────────────────

    pub fn wrap_group_box(&mut self, group_id: GroupId, port_mode: PortMode, wrap: bool) {
        let Some(group_index) = self.group_index(group_id) else {
            return;
        };

        {
            let (mut ctx, groups, ..) = self.parts();
            groups[group_index].wrap_box(port_mode, wrap, &mut ctx);
        }
        self.save_group_position(group_index);
    }

    pub fn set_group_layout_mode(
        &mut self,
        group_id: GroupId,
        port_mode: PortMode,
        layout_mode: BoxLayoutMode,
    ) {
        let Some(group_index) = self.group_index(group_id) else {
            return;
        };

        {
            let (mut ctx, groups, ..) = self.parts();
            groups[group_index].set_layout_mode(port_mode, layout_mode, &mut ctx);
        }
        self.save_group_position(group_index);
    }

    pub fn set_group_client_icon(&mut self, group_name: &str, icon_name: &str, from_metadata: bool) {
        let Some(group_index) = self.groups.iter().position(|g| g.name == group_name) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        groups[group_index].set_client_icon(icon_name, from_metadata, &mut ctx);
    }

    pub fn set_group_uuid(&mut self, group_name: &str, uuid: u64) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.name == group_name) {
            group.uuid = uuid;
        }
    }

    pub fn set_group_gui_state(&mut self, group_id: GroupId, visible: bool) {
        let Some(group_index) = self.group_index(group_id) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        groups[group_index].set_optional_gui_state(visible, &mut ctx);
    }

    /// Dim every box and cable not related to this group; pass `None` to
    /// restore everything.
    pub fn set_semi_hide_opacity_for(&mut self, group_id: Option<GroupId>) {
        let (mut ctx, groups, connections, ..) = self.parts();

        match group_id {
            Some(group_id) => {
                for group in groups.iter_mut() {
                    group.semi_hide(group.group_id != group_id, &mut ctx);
                    if group.group_id == group_id {
                        group.set_in_front(&mut ctx);
                    }
                }
                for connection in connections.iter_mut() {
                    connection.semi_hide(!connection.concerns_group(group_id), &mut ctx);
                    if connection.concerns_group(group_id) {
                        connection.set_in_front(&mut ctx);
                    }
                }
            }
            None => {
                for group in groups.iter_mut() {
                    group.semi_hide(false, &mut ctx);
                }
                for connection in connections.iter_mut() {
                    connection.semi_hide(false, &mut ctx);
                }
            }
        }
    }

    pub fn get_number_of_boxes(&mut self, group_id: GroupId) -> u32 {
        let Some(group_index) = self.group_index(group_id) else {
            return 0;
        };

        let (mut ctx, groups, ..) = self.parts();
        groups[group_index].get_number_of_boxes(&mut ctx)
    }

    pub fn select_filtered_box(&mut self, group_id: GroupId, n_select: u32) {
        let Some(group_index) = self.group_index(group_id) else {
            return;
        };

        let (mut ctx, groups, ..) = self.parts();
        groups[group_index].select_filtered_box(n_select, &mut ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasEvent, RecordingCanvas};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn manager() -> (PatchbayManager, Rc<RefCell<Vec<CanvasEvent>>>) {
        let canvas = RecordingCanvas::new();
        let events = canvas.events();
        (PatchbayManager::new(Box::new(canvas)), events)
    }

    fn add_audio_out(m: &mut PatchbayManager, full_name: &str) -> (GroupId, PortId) {
        m.add_port(full_name, PortType::Audio, JackPortFlags::IS_OUTPUT, 0)
    }

    fn add_audio_in(m: &mut PatchbayManager, full_name: &str) -> (GroupId, PortId) {
        m.add_port(full_name, PortType::Audio, JackPortFlags::IS_INPUT, 0)
    }

    #[test]
    fn test_add_ports_creates_group_and_stereo_pair() {
        let (mut m, events) = manager();

        let (gid1, pid1) = add_audio_out(&mut m, "MyApp:out_1");
        let (gid2, pid2) = add_audio_out(&mut m, "MyApp:out_2");
        assert_eq!(gid1, gid2);
        assert_ne!(pid1, pid2);

        let group = m.get_group(gid1).unwrap();
        assert_eq!(group.portgroups.len(), 1);
        assert_eq!(group.portgroups[0].port_ids, vec![pid1, pid2]);

        let recorded = events.borrow();
        assert!(recorded.contains(&CanvasEvent::GroupAdded(gid1, "MyApp".to_string())));
        assert!(recorded.contains(&CanvasEvent::PortAdded(gid1, pid1, "out 1".to_string())));
        assert!(recorded.contains(&CanvasEvent::PortAdded(gid1, pid2, "out 2".to_string())));
        assert!(recorded.contains(&CanvasEvent::PortgroupAdded(gid1, 1, vec![pid1, pid2])));
    }

    #[test]
    fn test_remove_port_tears_down_connection_first() {
        let (mut m, events) = manager();

        let (out_gid, out_pid) = add_audio_out(&mut m, "A:out");
        let (_in_gid, _in_pid) = add_audio_in(&mut m, "B:in");
        let conn_id = m.add_connection("A:out", "B:in").unwrap();
        assert_eq!(m.connections.len(), 1);

        m.remove_port("A:out");

        assert!(m.connections.is_empty());
        assert!(m.get_group(out_gid).is_none());
        assert!(m.get_port_from_name("A:out").is_none());

        let recorded = events.borrow();
        let disconnect_at = recorded
            .iter()
            .position(|e| *e == CanvasEvent::Disconnected(conn_id))
            .unwrap();
        let port_removed_at = recorded
            .iter()
            .position(|e| *e == CanvasEvent::PortRemoved(out_gid, out_pid))
            .unwrap();
        assert!(disconnect_at < port_removed_at);
        assert!(recorded.contains(&CanvasEvent::GroupRemoved(out_gid)));
    }

    #[test]
    fn test_removing_one_pair_member_frees_the_other() {
        let (mut m, _) = manager();

        let (gid, pid1) = add_audio_out(&mut m, "MyApp:out_1");
        add_audio_out(&mut m, "MyApp:out_2");
        assert_eq!(m.get_group(gid).unwrap().portgroups.len(), 1);

        m.remove_port("MyApp:out_2");

        let group = m.get_group(gid).unwrap();
        assert!(group.portgroups.is_empty());
        assert_eq!(group.port(pid1).unwrap().portgroup_id, 0);
    }

    #[test]
    fn test_very_fast_operation_batches_canvas_work() {
        let (mut m, events) = manager();

        m.set_very_fast_operation(true);
        let (gid, pid1) = add_audio_out(&mut m, "MyApp:out_1");
        let (_, pid2) = add_audio_out(&mut m, "MyApp:out_2");
        m.add_connection("MyApp:out_1", "MyApp:out_2");
        assert!(events.borrow().is_empty());

        // detection already ran on the model side
        assert_eq!(m.get_group(gid).unwrap().portgroups.len(), 1);

        m.set_very_fast_operation(false);

        let recorded = events.borrow();
        assert!(recorded.contains(&CanvasEvent::GroupAdded(gid, "MyApp".to_string())));
        assert!(recorded.contains(&CanvasEvent::PortAdded(gid, pid1, "out 1".to_string())));
        assert!(recorded.contains(&CanvasEvent::PortAdded(gid, pid2, "out 2".to_string())));
        assert!(recorded.contains(&CanvasEvent::PortgroupAdded(gid, 1, vec![pid1, pid2])));
        assert!(recorded.iter().any(|e| matches!(e, CanvasEvent::Connected(..))));
    }

    #[test]
    fn test_nested_very_fast_guards() {
        let (mut m, events) = manager();

        m.set_very_fast_operation(true);
        m.set_very_fast_operation(true);
        add_audio_out(&mut m, "MyApp:out_1");

        m.set_very_fast_operation(false);
        // inner release: mirroring still suppressed
        assert!(events.borrow().is_empty());
        add_audio_out(&mut m, "MyApp:out_2");
        assert!(events.borrow().is_empty());

        m.set_very_fast_operation(false);
        assert!(!events.borrow().is_empty());
    }

    #[test]
    fn test_set_port_order_resorts_group() {
        let (mut m, _) = manager();

        let (gid, pid1) = add_audio_out(&mut m, "MyApp:out_1");
        let (_, pid2) = add_audio_out(&mut m, "MyApp:out_2");

        m.set_port_order("MyApp:out_2", Some(1));
        m.set_port_order("MyApp:out_1", Some(2));

        let group = m.get_group(gid).unwrap();
        let ids: Vec<PortId> = group.ports.iter().map(|p| p.port_id).collect();
        assert_eq!(ids, vec![pid2, pid1]);
        // reversed members no longer match the pair's order
        assert!(group.portgroups.is_empty());
    }

    #[test]
    fn test_change_port_types_view_hides_audio() {
        let (mut m, events) = manager();

        let (gid, pid1) = add_audio_out(&mut m, "A:out");
        add_audio_in(&mut m, "B:in");
        let conn_id = m.add_connection("A:out", "B:in").unwrap();

        m.change_port_types_view(PortTypesViewFlag::MIDI);

        let recorded = events.borrow();
        assert!(recorded.contains(&CanvasEvent::PortRemoved(gid, pid1)));
        assert!(recorded.contains(&CanvasEvent::GroupRemoved(gid)));
        assert!(recorded.contains(&CanvasEvent::Disconnected(conn_id)));
        drop(recorded);

        // and back
        m.change_port_types_view(PortTypesViewFlag::AUDIO);
        let group = m.get_group(gid).unwrap();
        assert!(group.in_canvas);
        assert!(group.ports.iter().all(|p| p.in_canvas));
        assert!(m.connections[0].in_canvas);
    }

    #[test]
    fn test_portgroup_memory_added_applies_to_live_group() {
        let (mut m, _) = manager();

        let (gid, _) = add_audio_out(&mut m, "MyApp:left");
        add_audio_out(&mut m, "MyApp:right");
        assert_eq!(m.get_group(gid).unwrap().portgroups.len(), 1);
        let first_pgid = m.get_group(gid).unwrap().portgroups[0].portgroup_id;

        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Output),
            port_names: vec!["left".to_string(), "right".to_string()],
            above_metadatas: false,
        };
        m.portgroup_memory_added(mem);

        let group = m.get_group(gid).unwrap();
        assert_eq!(group.portgroups.len(), 1);
        assert_ne!(group.portgroups[0].portgroup_id, first_pgid);
    }

    #[test]
    fn test_set_prevent_stereo_tears_down_pair() {
        let (mut m, _) = manager();

        let (gid, _) = add_audio_out(&mut m, "MyApp:out_1");
        add_audio_out(&mut m, "MyApp:out_2");
        assert_eq!(m.get_group(gid).unwrap().portgroups.len(), 1);

        m.set_prevent_stereo("MyApp:out_1", true);
        assert!(m.get_group(gid).unwrap().portgroups.is_empty());

        // further arrivals will not pair with it either
        add_audio_out(&mut m, "MyApp:out_3");
        assert!(m.get_group(gid).unwrap().portgroups.is_empty());
    }

    #[test]
    fn test_pretty_name_overrides_display() {
        let (mut m, events) = manager();

        let (gid, pid) = add_audio_out(&mut m, "MyApp:out_1");
        m.set_port_pretty_name("MyApp:out_1", "Main Out");

        assert!(events
            .borrow()
            .contains(&CanvasEvent::PortRenamed(gid, pid, "Main Out".to_string())));
    }

    #[test]
    fn test_positions_queue_and_drain() {
        let (mut m, _) = manager();

        // fresh hardware group completes its position record on first port
        m.add_port(
            "system:capture_1",
            PortType::Audio,
            JackPortFlags::IS_OUTPUT | JackPortFlags::IS_PHYSICAL,
            0,
        );

        let saved = m.take_positions_to_save();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].group_name, "system");
        assert!(saved[0].flags.contains(crate::types::GroupPosFlags::SPLITTED));

        assert!(m.take_positions_to_save().is_empty());
    }

    #[test]
    fn test_positions_round_trip_through_json() {
        let (mut m, _) = manager();
        m.add_port(
            "system:capture_1",
            PortType::Audio,
            JackPortFlags::IS_OUTPUT | JackPortFlags::IS_PHYSICAL,
            0,
        );
        m.take_positions_to_save();

        let serialized = m.serialized_positions();

        let (mut fresh, _) = manager();
        fresh.load_positions(&serialized);
        let gpos = fresh.group_position_for("system");
        assert!(gpos.flags.contains(crate::types::GroupPosFlags::SPLITTED));
        assert!(gpos.fully_set);
    }

    #[test]
    fn test_remembered_memory_survives_readd() {
        let (mut m, _) = manager();

        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Output),
            port_names: vec!["aux_1".to_string(), "aux_2".to_string(), "aux_3".to_string()],
            above_metadatas: false,
        };
        m.portgroup_memory_added(mem);

        let (gid, _) = add_audio_out(&mut m, "MyApp:aux_1");
        assert!(m.get_group(gid).unwrap().portgroups.is_empty());
        add_audio_out(&mut m, "MyApp:aux_2");
        // stereo detection is bypassed while the memory is incomplete
        assert!(m.get_group(gid).unwrap().portgroups.is_empty());
        add_audio_out(&mut m, "MyApp:aux_3");

        let group = m.get_group(gid).unwrap();
        assert_eq!(group.portgroups.len(), 1);
        assert_eq!(group.portgroups[0].port_ids.len(), 3);
    }
}
