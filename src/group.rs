//! One client application's box: its ports, portgroups, naming and the
//! portgroup detection algorithm.

use crate::canvas::CanvasContext;
use crate::group_pos::GroupPos;
use crate::naming::{self, ClientRule};
use crate::port::Port;
use crate::portgroup::Portgroup;
use crate::portgroup_mem::PortgroupMem;
use crate::types::{
    BoxLayoutMode, BoxSplitMode, BoxType, GroupId, GroupPosFlags, JackPortFlags, PortId, PortMode,
    PortSubType, PortType, PortgroupId,
};

/// Drop the final character of a name (UTF-8 safe).
fn drop_last_char(s: &str) -> &str {
    s.char_indices()
        .next_back()
        .map(|(i, _)| &s[..i])
        .unwrap_or("")
}

/// A client/application box. Owns its ports and portgroups; destroying a
/// group must release all of them from the canvas first.
#[derive(Debug)]
pub struct Group {
    pub group_id: GroupId,
    pub name: String,
    pub display_name: String,
    pub ports: Vec<Port>,
    pub portgroups: Vec<Portgroup>,
    pub current_position: GroupPos,
    pub uuid: u64,
    pub client_icon: String,
    pub mdata_icon: String,
    pub a2j_group: bool,
    pub has_gui: bool,
    pub gui_visible: bool,
    pub in_canvas: bool,
    is_hardware: bool,
}

impl Group {
    pub fn new(group_id: GroupId, name: &str, group_position: GroupPos) -> Group {
        Group {
            group_id,
            name: name.to_string(),
            display_name: name.to_string(),
            ports: Vec::new(),
            portgroups: Vec::new(),
            current_position: group_position,
            uuid: 0,
            client_icon: String::new(),
            mdata_icon: String::new(),
            a2j_group: false,
            has_gui: false,
            gui_visible: false,
            in_canvas: false,
            is_hardware: false,
        }
    }

    pub fn is_hardware(&self) -> bool {
        self.is_hardware
    }

    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports.iter().find(|p| p.port_id == port_id)
    }

    pub fn port_mut(&mut self, port_id: PortId) -> Option<&mut Port> {
        self.ports.iter_mut().find(|p| p.port_id == port_id)
    }

    pub fn port_by_name(&self, full_name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.full_name == full_name)
    }

    // ─── Canvas lifecycle ──────────────────────────────────────────────────

    pub fn add_to_canvas(&mut self, ctx: &mut CanvasContext) {
        if ctx.very_fast_operation {
            return;
        }
        if self.in_canvas {
            return;
        }

        let (box_type, icon_name) = self.box_type_and_icon();

        let do_split = self.current_position.flags.contains(GroupPosFlags::SPLITTED);
        let split = if do_split { BoxSplitMode::Yes } else { BoxSplitMode::No };

        self.display_name = self.display_name.replace(".0/", "/").replace('_', " ");

        let display_name = if ctx.use_graceful_names {
            self.display_name.clone()
        } else {
            self.name.clone()
        };

        let layout_modes: Vec<(PortMode, BoxLayoutMode)> =
            [PortMode::Input, PortMode::Output, PortMode::Both]
                .iter()
                .map(|&mode| (mode, self.current_position.get_layout_mode(mode)))
                .collect();

        let gpos = &self.current_position;
        ctx.canvas.add_group(
            self.group_id,
            &display_name,
            split,
            box_type,
            &icon_name,
            &layout_modes,
            gpos.null_xy,
            gpos.in_xy,
            gpos.out_xy,
        );

        self.in_canvas = true;

        let flags = self.current_position.flags;
        if do_split {
            self.current_position.flags |= GroupPosFlags::HAS_BEEN_SPLITTED;
            ctx.canvas.wrap_group_box(
                self.group_id,
                PortMode::Input,
                flags.contains(GroupPosFlags::WRAPPED_INPUT),
                false,
                true,
            );
            ctx.canvas.wrap_group_box(
                self.group_id,
                PortMode::Output,
                flags.contains(GroupPosFlags::WRAPPED_OUTPUT),
                false,
                true,
            );
        } else {
            // an unsplit box is wrapped only when both sides were
            ctx.canvas.wrap_group_box(
                self.group_id,
                PortMode::Null,
                flags.contains(GroupPosFlags::WRAPPED_INPUT)
                    && flags.contains(GroupPosFlags::WRAPPED_OUTPUT),
                false,
                true,
            );
        }

        if self.has_gui {
            ctx.canvas
                .set_optional_gui_state(self.group_id, self.gui_visible);
        }
    }

    pub fn remove_from_canvas(&mut self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.remove_group(self.group_id);
        self.in_canvas = false;
    }

    pub fn redraw_in_canvas(&self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.redraw_group(self.group_id);
    }

    pub fn update_name_in_canvas(&self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        let display_name = if ctx.use_graceful_names {
            self.display_name.clone()
        } else {
            self.name.clone()
        };
        ctx.canvas.rename_group(self.group_id, &display_name);
    }

    pub fn update_ports_in_canvas(&mut self, ctx: &mut CanvasContext) {
        for port in &mut self.ports {
            port.rename_in_canvas(ctx);
        }
    }

    /// Box classification priority: metadata icon > client icon > hardware
    /// (MIDI bridges get their own icon) > virtual sink/source patterns >
    /// plain application.
    fn box_type_and_icon(&self) -> (BoxType, String) {
        let mut box_type = BoxType::Application;
        let mut icon_name = self
            .name
            .split('.')
            .next()
            .unwrap_or(&self.name)
            .to_lowercase();

        if self.is_hardware {
            box_type = BoxType::Hardware;
            icon_name = String::new();
            if self.a2j_group || self.display_name == "Midi-Bridge" || self.display_name == "a2j" {
                icon_name = "a2j".to_string();
            }
        }

        if !self.client_icon.is_empty() {
            box_type = BoxType::Client;
            icon_name = self.client_icon.clone();
        }

        if self.name.starts_with("PulseAudio ") && self.client_icon.is_empty() {
            let lower = self.name.to_lowercase();
            if lower.contains("sink") {
                box_type = BoxType::Monitor;
                icon_name = "monitor_playback".to_string();
            } else if lower.contains("source") {
                box_type = BoxType::Monitor;
                icon_name = "monitor_capture".to_string();
            }
        } else if self.name.ends_with(" Monitor") && self.client_icon.is_empty() {
            // probably a pipewire monitor group
            box_type = BoxType::Monitor;
            icon_name = "monitor_playback".to_string();
        }

        if !self.mdata_icon.is_empty() {
            icon_name = self.mdata_icon.clone();
        }

        (box_type, icon_name)
    }

    pub fn semi_hide(&self, hidden: bool, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.semi_hide_group(self.group_id, hidden);
    }

    pub fn set_in_front(&self, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.set_group_in_front(self.group_id);
    }

    pub fn get_number_of_boxes(&self, ctx: &mut CanvasContext) -> u32 {
        if !self.in_canvas {
            return 0;
        }

        ctx.canvas.get_number_of_boxes(self.group_id)
    }

    pub fn select_filtered_box(&self, n_select: u32, ctx: &mut CanvasContext) {
        if !self.in_canvas {
            return;
        }

        ctx.canvas.select_filtered_group_box(self.group_id, n_select);
    }

    pub fn set_optional_gui_state(&mut self, visible: bool, ctx: &mut CanvasContext) {
        self.has_gui = true;
        self.gui_visible = visible;

        if !self.in_canvas {
            return;
        }

        ctx.canvas.set_optional_gui_state(self.group_id, visible);
    }

    pub fn set_client_icon(&mut self, icon_name: &str, from_metadata: bool, ctx: &mut CanvasContext) {
        if from_metadata {
            self.mdata_icon = icon_name.to_string();
        } else {
            self.client_icon = icon_name.to_string();
        }

        let (box_type, _) = self.box_type_and_icon();

        if self.in_canvas {
            ctx.canvas.set_group_icon(self.group_id, box_type, icon_name);
        }
    }

    // ─── Layout ────────────────────────────────────────────────────────────

    /// Apply a new position record, sequencing split/unsplit and
    /// wrap/unwrap transitions against the *previous* flags. A view change
    /// applies a remembered layout, so overlap prevention is suppressed.
    pub fn set_group_position(
        &mut self,
        group_position: GroupPos,
        view_change: bool,
        ctx: &mut CanvasContext,
    ) {
        if !self.in_canvas {
            return;
        }

        let ex_flags = self.current_position.flags;
        self.current_position = group_position;
        let gpos = &self.current_position;

        for (&port_mode, &layout_mode) in &gpos.layout_modes {
            ctx.canvas
                .set_group_layout_mode(self.group_id, port_mode, layout_mode);
        }

        ctx.canvas
            .move_group_boxes(self.group_id, gpos.null_xy, gpos.in_xy, gpos.out_xy);

        let prevent_overlap = !view_change;

        if gpos.flags.contains(GroupPosFlags::SPLITTED) {
            if !ex_flags.contains(GroupPosFlags::SPLITTED) {
                ctx.canvas.split_group(self.group_id);
            }

            ctx.canvas.wrap_group_box(
                self.group_id,
                PortMode::Input,
                gpos.flags.contains(GroupPosFlags::WRAPPED_INPUT),
                true,
                prevent_overlap,
            );
            ctx.canvas.wrap_group_box(
                self.group_id,
                PortMode::Output,
                gpos.flags.contains(GroupPosFlags::WRAPPED_OUTPUT),
                true,
                prevent_overlap,
            );
        } else {
            ctx.canvas.wrap_group_box(
                self.group_id,
                PortMode::Null,
                gpos.flags
                    .intersects(GroupPosFlags::WRAPPED_INPUT | GroupPosFlags::WRAPPED_OUTPUT),
                true,
                prevent_overlap,
            );

            if ex_flags.contains(GroupPosFlags::SPLITTED) {
                ctx.canvas.animate_before_join(self.group_id);
            }
        }
    }

    pub fn set_layout_mode(
        &mut self,
        port_mode: PortMode,
        layout_mode: BoxLayoutMode,
        ctx: &mut CanvasContext,
    ) {
        self.current_position.set_layout_mode(port_mode, layout_mode);

        if !self.in_canvas {
            return;
        }

        ctx.canvas
            .set_group_layout_mode(self.group_id, port_mode, layout_mode);
    }

    pub fn wrap_box(&mut self, port_mode: PortMode, wrap: bool, ctx: &mut CanvasContext) {
        let wrap_flag = match port_mode {
            PortMode::Input => GroupPosFlags::WRAPPED_INPUT,
            PortMode::Output => GroupPosFlags::WRAPPED_OUTPUT,
            _ => GroupPosFlags::WRAPPED_INPUT | GroupPosFlags::WRAPPED_OUTPUT,
        };

        if wrap {
            self.current_position.flags |= wrap_flag;
        } else {
            self.current_position.flags = self.current_position.flags & !wrap_flag;
        }

        if !self.in_canvas {
            return;
        }

        ctx.canvas
            .wrap_group_box(self.group_id, port_mode, wrap, true, true);
    }

    // ─── Port ownership ────────────────────────────────────────────────────

    /// Take ownership of a new port. Returns true when the group position
    /// was completed for the first time and should be persisted.
    pub fn add_port(&mut self, mut port: Port) -> bool {
        port.group_id = self.group_id;

        let mut full_name = port.full_name.as_str();
        if full_name.starts_with("a2j:") && !port.flags.contains(JackPortFlags::IS_PHYSICAL) {
            full_name = &full_name[4..];
        }
        port.display_name = full_name
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or("")
            .to_string();

        let mut save_position = false;

        if self.ports.is_empty() {
            // first port decides whether this is a hardware box
            if port.flags.contains(JackPortFlags::IS_PHYSICAL) {
                self.is_hardware = true;
            }

            if !self.current_position.fully_set {
                if self.is_hardware {
                    self.current_position.flags |= GroupPosFlags::SPLITTED;
                }
                self.current_position.fully_set = true;
                save_position = true;
            }
        }

        self.ports.push(port);
        save_position
    }

    pub fn remove_port(&mut self, port_id: PortId) -> Option<Port> {
        let index = self.ports.iter().position(|p| p.port_id == port_id)?;
        Some(self.ports.remove(index))
    }

    pub fn remove_portgroup(&mut self, portgroup_id: PortgroupId, ctx: &mut CanvasContext) {
        let Some(index) = self
            .portgroups
            .iter()
            .position(|pg| pg.portgroup_id == portgroup_id)
        else {
            return;
        };

        let mut portgroup = self.portgroups.remove(index);
        portgroup.remove_from_canvas(ctx);
        for port_id in portgroup.port_ids {
            if let Some(port) = self.port_mut(port_id) {
                port.portgroup_id = 0;
            }
        }
    }

    pub fn remove_all_ports(&mut self, ctx: &mut CanvasContext) {
        if self.in_canvas {
            for portgroup in &mut self.portgroups {
                portgroup.remove_from_canvas(ctx);
            }
            for port in &mut self.ports {
                port.remove_from_canvas(ctx);
            }
        }

        self.portgroups.clear();
        self.ports.clear();
    }

    pub fn add_all_ports_to_canvas(&mut self, ctx: &mut CanvasContext) {
        let Group {
            ports, portgroups, ..
        } = self;

        for port in ports.iter_mut() {
            port.add_to_canvas(ctx);
        }
        for portgroup in portgroups.iter_mut() {
            portgroup.add_to_canvas(ports, ctx);
        }
    }

    /// Re-sync after the type-view filter changed: hide what fell out of
    /// view, show what came in, and drop the box entirely when nothing of
    /// it remains visible.
    pub fn change_port_types_view(&mut self, ctx: &mut CanvasContext) {
        self.add_to_canvas(ctx);

        for portgroup in &mut self.portgroups {
            if !ctx.port_type_shown(portgroup.port_type, portgroup.subtype) {
                portgroup.remove_from_canvas(ctx);
            }
        }
        for port in &mut self.ports {
            if !ctx.port_type_shown(port.port_type, port.subtype) {
                port.remove_from_canvas(ctx);
            }
        }

        self.add_all_ports_to_canvas(ctx);

        if !self.ports.iter().any(|p| p.in_canvas) {
            self.remove_from_canvas(ctx);
        }
    }

    // ─── Naming ────────────────────────────────────────────────────────────

    /// Derive the graceful display name for the port at `index`.
    ///
    /// Total: every reachable input produces a name; an empty rewrite
    /// falls back to the raw short name.
    pub fn graceful_port(&mut self, index: usize) {
        let mut client = naming::pretty_client(&self.name);

        let Some(port) = self.ports.get_mut(index) else {
            return;
        };

        if client.is_none()
            && (port.full_name.starts_with("a2j:") || port.full_name.starts_with("Midi-Bridge:"))
            && port.flags.contains(JackPortFlags::IS_PHYSICAL)
        {
            client = Some(ClientRule::A2j);
        }

        let short_name = port.short_name().to_string();

        let graceful = match client {
            Some(rule) => naming::apply(rule, &short_name),
            None => naming::generic(&short_name),
        };

        let mut display_name = graceful.name;
        port.last_digit_to_add = graceful.deferred_digit;

        // pipewire Midi-Bridge with jack.filter_name = true
        if port.full_name.starts_with("Midi-Bridge")
            && (display_name.starts_with("capture_") || display_name.starts_with("playback_"))
        {
            display_name = display_name
                .split_once('_')
                .map(|(_, rest)| rest.to_string())
                .unwrap_or(display_name);
        }

        port.display_name = if display_name.is_empty() {
            short_name
        } else {
            display_name
        };
    }

    /// Merge a deferred digit into an earlier port's display name once its
    /// numbered sibling arrives ("out" + "out 2" becomes "out 1" + "out 2").
    pub fn check_for_display_name_on_last_port(&mut self, ctx: &mut CanvasContext) {
        let Some((last, rest)) = self.ports.split_last_mut() else {
            return;
        };
        let Some(last_digit) = last.full_name.chars().last() else {
            return;
        };
        if last_digit != '1' && last_digit != '2' {
            return;
        }

        let last_type = last.port_type;
        let last_mode = last.mode();
        let last_stem = drop_last_char(&last.full_name).to_string();

        for port in rest.iter_mut().rev() {
            if port.port_type == last_type && port.mode() == last_mode {
                // precedence kept as historically shipped: the name-stem
                // check only gates the '0' -> '1' case.
                // TODO: confirm against fixtures whether it should gate
                // the '1' -> '2' case as well.
                if (drop_last_char(&port.full_name) == last_stem
                    && port.last_digit_to_add == Some('0')
                    && last_digit == '1')
                    || (port.last_digit_to_add == Some('1') && last_digit == '2')
                {
                    port.add_the_last_digit(ctx);
                }
                break;
            }
        }
    }

    // ─── Portgroup detection ───────────────────────────────────────────────

    /// Build a portgroup from member ids and register it. Members get
    /// their `portgroup_id` stamped. Refuses groups of fewer than two
    /// ports and returns the index of the new portgroup otherwise.
    fn make_portgroup(
        &mut self,
        next_portgroup_id: &mut PortgroupId,
        port_mode: PortMode,
        member_ids: Vec<PortId>,
    ) -> Option<usize> {
        if member_ids.len() < 2 {
            return None;
        }

        let (port_type, subtype) = self
            .port(*member_ids.first()?)
            .map(Port::full_type)
            .unwrap_or((PortType::Null, PortSubType::Regular));

        let portgroup_id = *next_portgroup_id;
        *next_portgroup_id += 1;

        for &port_id in &member_ids {
            if let Some(port) = self.port_mut(port_id) {
                port.portgroup_id = portgroup_id;
            }
        }

        log::debug!(
            "portgroup: group '{}' new portgroup {} with ports {:?}",
            self.name,
            portgroup_id,
            member_ids
        );

        self.portgroups.push(Portgroup::new(
            self.group_id,
            portgroup_id,
            port_mode,
            port_type,
            subtype,
            member_ids,
        ));
        Some(self.portgroups.len() - 1)
    }

    fn add_portgroup_to_canvas(&mut self, index: usize, ctx: &mut CanvasContext) {
        let Group {
            ports, portgroups, ..
        } = self;
        if let Some(portgroup) = portgroups.get_mut(index) {
            portgroup.add_to_canvas(ports, ctx);
        }
    }

    /// Run the layered detection for the most recently added port:
    /// remembered groupings first, then server metadata, then the stereo
    /// heuristic.
    pub fn check_for_portgroup_on_last_port(
        &mut self,
        memory: &[PortgroupMem],
        next_portgroup_id: &mut PortgroupId,
        ctx: &mut CanvasContext,
    ) {
        let Some(last) = self.ports.last() else {
            return;
        };
        let last_name = last.short_name().to_string();
        let last_type = last.port_type;
        let last_mode = last.mode();

        // 1. remembered groupings: build one, or prevent stereo detection
        for mem in memory {
            if !mem.matches(&self.name, last_type, last_mode) {
                continue;
            }
            if mem.port_names.last().map(String::as_str) != Some(last_name.as_str()) {
                continue;
            }
            if mem.port_names.len() == 1 {
                return;
            }
            if mem.port_names.iter().position(|n| *n == last_name)
                != Some(mem.port_names.len() - 1)
            {
                return;
            }

            let mut member_ids: Vec<PortId> = Vec::new();
            let mut completed = false;
            let mut aborted = false;

            for port in &self.ports {
                if port.port_type != last_type || port.mode() != last_mode {
                    continue;
                }

                if !completed
                    && mem
                        .port_names
                        .get(member_ids.len())
                        .is_some_and(|n| n == port.short_name())
                {
                    member_ids.push(port.port_id);
                    if member_ids.len() == mem.port_names.len() {
                        completed = true;
                    }
                } else if !member_ids.is_empty() {
                    // a port breaking the remembered consecutivity
                    aborted = true;
                    break;
                }
            }

            if completed {
                if let Some(index) = self.make_portgroup(next_portgroup_id, last_mode, member_ids)
                {
                    self.add_portgroup_to_canvas(index, ctx);
                }
            }
            if aborted {
                return;
            }
        }

        // 2. server metadata: group the trailing run of equal tags
        self.check_metadata_on_last_port(memory, next_portgroup_id, ctx);

        // 3. stereo heuristic: detect the left sibling of a right port
        if let Some(other_index) = self.stereo_detection(memory) {
            let other_id = self.ports[other_index].port_id;
            let last_id = match self.ports.last() {
                Some(p) => p.port_id,
                None => return,
            };

            if let Some(index) =
                self.make_portgroup(next_portgroup_id, last_mode, vec![other_id, last_id])
            {
                if self.in_canvas {
                    self.add_portgroup_to_canvas(index, ctx);
                }
            }
        }
    }

    /// Metadata-driven grouping for the newest port: at least two trailing
    /// consecutive ports of equal tag, type and mode form a portgroup,
    /// unless a remembered grouping that outranks metadata claims any of
    /// those ports.
    fn check_metadata_on_last_port(
        &mut self,
        memory: &[PortgroupMem],
        next_portgroup_id: &mut PortgroupId,
        ctx: &mut CanvasContext,
    ) {
        let Some(last) = self.ports.last() else {
            return;
        };
        if last.portgroup_id != 0 || last.mdata_portgroup.is_empty() {
            return;
        }

        let tag = last.mdata_portgroup.clone();
        let last_type = last.port_type;
        let last_mode = last.mode();

        let mut member_ids: Vec<PortId> = Vec::new();
        let mut member_names: Vec<String> = Vec::new();
        for port in self.ports.iter().rev() {
            if port.port_type != last_type || port.mode() != last_mode {
                continue;
            }
            if port.portgroup_id == 0 && port.mdata_portgroup == tag {
                member_ids.push(port.port_id);
                member_names.push(port.short_name().to_string());
            } else {
                break;
            }
        }
        member_ids.reverse();

        if member_ids.len() < 2 {
            return;
        }

        let blocked = memory.iter().any(|mem| {
            mem.above_metadatas
                && mem.matches(&self.name, last_type, last_mode)
                && member_names.iter().any(|n| mem.port_names.contains(n))
        });
        if blocked {
            log::debug!(
                "portgroup: group '{}' metadata tag '{}' outranked by remembered grouping",
                self.name,
                tag
            );
            return;
        }

        if let Some(index) = self.make_portgroup(next_portgroup_id, last_mode, member_ids) {
            self.portgroups[index].mdata_portgroup = tag;
            self.add_portgroup_to_canvas(index, ctx);
        }
    }

    /// Find the left sibling of the newest port, if it reads like the
    /// right channel of a stereo pair. Returns the candidate's index.
    fn stereo_detection(&self, memory: &[PortgroupMem]) -> Option<usize> {
        let port = self.ports.last()?;
        if port.port_type != PortType::Audio || port.subtype != PortSubType::Regular {
            return None;
        }
        if port.portgroup_id != 0 {
            return None;
        }

        // the nearest preceding free port of same type and mode
        let mut found: Option<usize> = None;
        for (index, other) in self.ports.iter().enumerate().rev().skip(1) {
            if other.port_type == port.port_type
                && other.subtype == port.subtype
                && other.mode() == port.mode()
                && other.portgroup_id == 0
                && !other.prevent_stereo
            {
                let other_short = other.short_name();
                for mem in memory {
                    if mem.matches(&self.name, other.port_type, other.mode())
                        && mem.port_names.iter().any(|n| n == other_short)
                    {
                        // the candidate belongs to a remembered grouping
                        // the user set up explicitly; never re-pair it
                        return None;
                    }
                }
                found = Some(index);
                break;
            }
        }
        let other_index = found?;
        let other = &self.ports[other_index];

        let prefix = format!("{}:", self.name);
        let port_name = port.full_name.replacen(&prefix, "", 1);
        let other_name = other.full_name.replacen(&prefix, "", 1);

        let mut may_match: Vec<String> = Vec::new();

        if port.flags.contains(JackPortFlags::IS_PHYSICAL) {
            // hardware names (firewire especially) are too irregular for
            // suffix rules; always pair consecutive physical ports
            may_match.push(other_name.clone());
        } else if port_name
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_digit())
        {
            let digits = port_name
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .count();
            let (base, in_num) = port_name.split_at(port_name.len() - digits);

            if let Some(stripped) = base.strip_suffix('R') {
                may_match.push(format!("{stripped}L{in_num}"));
            } else if let Ok(num) = in_num.parse::<i64>() {
                may_match.push(format!("{base}{}", num - 1));

                if num == 1 || num == 2 {
                    if base.ends_with(' ') || base.ends_with('_') {
                        may_match.push(base[..base.len() - 1].to_string());
                    } else {
                        may_match.push(base.to_string());
                    }
                }
            }
        } else {
            if let Some(stripped) = port_name.strip_suffix('R') {
                may_match.push(format!("{stripped}L"));
                if port_name.len() >= 2 {
                    if port_name.as_bytes()[port_name.len() - 2] == b' ' {
                        may_match.push(port_name[..port_name.len() - 2].to_string());
                    } else {
                        may_match.push(stripped.to_string());
                    }
                }
            } else if let Some(stripped) = port_name.strip_suffix("right") {
                may_match.push(format!("{stripped}left"));
            } else if let Some(stripped) = port_name.strip_suffix("Right") {
                may_match.push(format!("{stripped}Left"));
            } else if let Some(stripped) = port_name.strip_suffix("(Right)") {
                may_match.push(format!("{stripped}(Left)"));
            } else if let Some(stripped) = port_name.strip_suffix(".r") {
                may_match.push(format!("{stripped}.l"));
            } else if let Some(stripped) = port_name.strip_suffix("_r") {
                may_match.push(format!("{stripped}_l"));
            } else if let Some(stripped) = port_name.strip_suffix("_r\n") {
                may_match.push(format!("{stripped}_l\n"));
            }

            for word in [
                "out",
                "Out",
                "output",
                "Output",
                "in",
                "In",
                "input",
                "Input",
                "audio input",
                "audio output",
            ] {
                if port_name.ends_with(&format!("R {word}")) {
                    may_match.push(format!("L {word}"));
                } else if port_name.ends_with(&format!("right {word}")) {
                    may_match.push(format!("left {word}"));
                } else if port_name.ends_with(&format!("Right {word}")) {
                    may_match.push(format!("Left {word}"));
                }
            }
        }

        if may_match.contains(&other_name) {
            Some(other_index)
        } else {
            None
        }
    }

    /// Re-apply a remembered grouping that just arrived: tear down any
    /// portgroup overlapping its names, then rebuild it if all named
    /// ports are present and consecutive.
    pub fn portgroup_memory_added(
        &mut self,
        mem: &PortgroupMem,
        next_portgroup_id: &mut PortgroupId,
        ctx: &mut CanvasContext,
    ) {
        if mem.group_name != self.name {
            return;
        }
        let (Some(mem_type), Some(mem_mode)) = (mem.port_type, mem.port_mode) else {
            return;
        };

        let overlapping: Vec<PortgroupId> = self
            .portgroups
            .iter()
            .filter(|pg| pg.port_mode == mem_mode && pg.port_type == mem_type)
            .filter(|pg| {
                pg.port_ids.iter().any(|&id| {
                    self.port(id)
                        .is_some_and(|p| mem.port_names.iter().any(|n| n == p.short_name()))
                })
            })
            .map(|pg| pg.portgroup_id)
            .collect();

        for portgroup_id in overlapping {
            self.remove_portgroup(portgroup_id, ctx);
        }

        if mem.port_names.is_empty() {
            return;
        }

        let mut member_ids: Vec<PortId> = Vec::new();
        for port in &self.ports {
            if port.mode() != mem_mode || port.port_type != mem_type {
                continue;
            }

            if mem
                .port_names
                .get(member_ids.len())
                .is_some_and(|n| n == port.short_name())
            {
                member_ids.push(port.port_id);
                if member_ids.len() == mem.port_names.len() {
                    break;
                }
            } else if !member_ids.is_empty() {
                // a port breaking the consecutivity of the portgroup
                return;
            }
        }

        if member_ids.len() == mem.port_names.len() {
            if let Some(index) = self.make_portgroup(next_portgroup_id, mem_mode, member_ids) {
                self.portgroups[index].above_metadatas = mem.above_metadatas;
                self.add_portgroup_to_canvas(index, ctx);
            }
        }
    }

    // ─── Sort & re-validation ──────────────────────────────────────────────

    pub fn sort_ports(&mut self) {
        self.ports.sort_by_key(Port::sort_key);
    }

    /// After a re-sort, tear down portgroups whose members are no longer
    /// consecutive or whose metadata constraints broke, then rebuild from
    /// the three sources in priority order.
    pub fn rebuild_portgroups(
        &mut self,
        memory: &[PortgroupMem],
        next_portgroup_id: &mut PortgroupId,
        ctx: &mut CanvasContext,
    ) {
        self.validate_portgroups(ctx);
        self.rebuild_from_memory(memory, true, next_portgroup_id);
        self.rebuild_from_metadata(next_portgroup_id);
        self.rebuild_from_memory(memory, false, next_portgroup_id);
    }

    fn validate_portgroups(&mut self, ctx: &mut CanvasContext) {
        let mut to_remove: Vec<PortgroupId> = Vec::new();

        for portgroup in &self.portgroups {
            let mut search_index = 0usize;
            let mut previous: Option<&Port> = None;
            let mut seems_ok = false;
            let mut broke = false;

            for port in &self.ports {
                if !seems_ok && portgroup.port_ids.get(search_index) == Some(&port.port_id) {
                    if port.mdata_portgroup != portgroup.mdata_portgroup
                        && !portgroup.above_metadatas
                    {
                        to_remove.push(portgroup.portgroup_id);
                        broke = true;
                        break;
                    }

                    if !portgroup.above_metadatas
                        && search_index == 0
                        && previous.is_some_and(|prev| {
                            !prev.mdata_portgroup.is_empty()
                                && prev.mdata_portgroup == port.mdata_portgroup
                        })
                    {
                        // the port before the portgroup carries the same
                        // metadata tag, so the portgroup is now too short
                        to_remove.push(portgroup.portgroup_id);
                        broke = true;
                        break;
                    }

                    search_index += 1;
                    if search_index == portgroup.port_ids.len() {
                        // all members consecutive; metadata may still say
                        // the portgroup should have grown
                        seems_ok = true;
                        if portgroup.above_metadatas || portgroup.mdata_portgroup.is_empty() {
                            broke = true;
                            break;
                        }
                    }
                } else if search_index > 0 {
                    if seems_ok
                        && previous.is_some_and(|prev| {
                            port.mdata_portgroup != prev.mdata_portgroup
                                || port.port_type != portgroup.port_type
                                || port.mode() != portgroup.port_mode
                        })
                    {
                        // the next port does not extend the metadata run,
                        // the portgroup survives as-is
                        broke = true;
                        break;
                    }

                    // a port breaking member consecutivity; ports were
                    // just sorted by type and mode, so this is real
                    to_remove.push(portgroup.portgroup_id);
                    broke = true;
                    break;
                }

                previous = Some(port);
            }

            if !broke && !seems_ok {
                to_remove.push(portgroup.portgroup_id);
            }
        }

        for portgroup_id in to_remove {
            log::debug!(
                "portgroup: group '{}' dropping portgroup {} after sort",
                self.name,
                portgroup_id
            );
            self.remove_portgroup(portgroup_id, ctx);
        }
    }

    fn rebuild_from_memory(
        &mut self,
        memory: &[PortgroupMem],
        above_metadatas: bool,
        next_portgroup_id: &mut PortgroupId,
    ) {
        for mem in memory {
            if mem.above_metadatas != above_metadatas {
                continue;
            }
            if mem.group_name != self.name {
                continue;
            }
            let (Some(mem_type), Some(mem_mode)) = (mem.port_type, mem.port_mode) else {
                continue;
            };
            if mem.port_names.is_empty() {
                continue;
            }

            let mut member_ids: Vec<PortId> = Vec::new();
            for port in &self.ports {
                if port.portgroup_id == 0
                    && port.port_type == mem_type
                    && port.mode() == mem_mode
                    && mem
                        .port_names
                        .get(member_ids.len())
                        .is_some_and(|n| n == port.short_name())
                {
                    member_ids.push(port.port_id);
                    if member_ids.len() == mem.port_names.len() {
                        break;
                    }
                } else if !member_ids.is_empty() {
                    break;
                }
            }

            if member_ids.len() == mem.port_names.len() {
                if let Some(index) = self.make_portgroup(next_portgroup_id, mem_mode, member_ids) {
                    self.portgroups[index].above_metadatas = mem.above_metadatas;
                }
            }
        }
    }

    fn rebuild_from_metadata(&mut self, next_portgroup_id: &mut PortgroupId) {
        let mut runs: Vec<(String, PortType, PortMode, Vec<PortId>)> = Vec::new();

        for port in &self.ports {
            if port.mdata_portgroup.is_empty() || port.portgroup_id != 0 {
                continue;
            }

            match runs.last_mut() {
                Some((tag, port_type, port_mode, ids))
                    if *tag == port.mdata_portgroup
                        && *port_type == port.port_type
                        && *port_mode == port.mode() =>
                {
                    ids.push(port.port_id);
                }
                _ => runs.push((
                    port.mdata_portgroup.clone(),
                    port.port_type,
                    port.mode(),
                    vec![port.port_id],
                )),
            }
        }

        for (tag, _port_type, port_mode, member_ids) in runs {
            if member_ids.len() < 2 {
                continue;
            }
            if let Some(index) = self.make_portgroup(next_portgroup_id, port_mode, member_ids) {
                self.portgroups[index].mdata_portgroup = tag;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::types::PortTypesViewFlag;

    fn ctx<'a>(canvas: &'a mut RecordingCanvas) -> CanvasContext<'a> {
        CanvasContext {
            canvas,
            very_fast_operation: false,
            use_graceful_names: true,
            port_types_view: PortTypesViewFlag::ALL,
        }
    }

    fn group(name: &str) -> Group {
        Group::new(1, name, GroupPos::new_for(PortTypesViewFlag::ALL, name))
    }

    fn audio_port(port_id: PortId, full_name: &str, flags: JackPortFlags) -> Port {
        Port::new(port_id, full_name, PortType::Audio, flags, 0)
    }

    fn add_audio_out(group: &mut Group, port_id: PortId, full_name: &str) {
        group.add_port(audio_port(port_id, full_name, JackPortFlags::IS_OUTPUT));
    }

    fn detect_last(group: &mut Group, memory: &[PortgroupMem], next_pgid: &mut PortgroupId) {
        let mut canvas = RecordingCanvas::new();
        let mut ctx = ctx(&mut canvas);
        group.check_for_portgroup_on_last_port(memory, next_pgid, &mut ctx);
    }

    #[test]
    fn test_stereo_detection_numeric_suffixes() {
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "MyApp:out_1");
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:out_2");
        detect_last(&mut g, &[], &mut next_pgid);

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![1, 2]);
        assert_eq!(g.port(1).unwrap().portgroup_id, 1);
        assert_eq!(g.port(2).unwrap().portgroup_id, 1);
    }

    #[test]
    fn test_stereo_detection_bare_name_fallback() {
        // "audio_out" then "audio_out_2": candidate set of the "2" port
        // contains the bare name with the trailing underscore cut
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "MyApp:audio_out");
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:audio_out_2");
        detect_last(&mut g, &[], &mut next_pgid);

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![1, 2]);
    }

    #[test]
    fn test_stereo_detection_word_suffixes() {
        for (left, right) in [
            ("MyApp:master left", "MyApp:master right"),
            ("MyApp:mono.l", "MyApp:mono.r"),
            ("MyApp:Main (Left)", "MyApp:Main (Right)"),
            ("MyApp:L out", "MyApp:R out"),
        ] {
            let mut g = group("MyApp");
            let mut next_pgid = 1;
            add_audio_out(&mut g, 1, left);
            detect_last(&mut g, &[], &mut next_pgid);
            add_audio_out(&mut g, 2, right);
            detect_last(&mut g, &[], &mut next_pgid);
            assert_eq!(g.portgroups.len(), 1, "pair {left} / {right}");
        }
    }

    #[test]
    fn test_stereo_detection_respects_prevent_stereo() {
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "MyApp:out_1");
        g.port_mut(1).unwrap().prevent_stereo = true;
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:out_2");
        detect_last(&mut g, &[], &mut next_pgid);

        assert!(g.portgroups.is_empty());
    }

    #[test]
    fn test_stereo_detection_skips_cv_and_midi() {
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        let mut cv1 = audio_port(1, "MyApp:cv_1", JackPortFlags::IS_OUTPUT);
        cv1.subtype = PortSubType::Cv;
        let mut cv2 = audio_port(2, "MyApp:cv_2", JackPortFlags::IS_OUTPUT);
        cv2.subtype = PortSubType::Cv;
        g.add_port(cv1);
        detect_last(&mut g, &[], &mut next_pgid);
        g.add_port(cv2);
        detect_last(&mut g, &[], &mut next_pgid);

        assert!(g.portgroups.is_empty());
    }

    #[test]
    fn test_stereo_detection_physical_ports_always_pair() {
        let mut g = group("system");
        let mut next_pgid = 1;
        let flags = JackPortFlags::IS_OUTPUT | JackPortFlags::IS_PHYSICAL;

        g.add_port(audio_port(1, "system:weird fw 0x04af11", flags));
        detect_last(&mut g, &[], &mut next_pgid);
        g.add_port(audio_port(2, "system:weird fw 0x04af12b", flags));
        detect_last(&mut g, &[], &mut next_pgid);

        assert_eq!(g.portgroups.len(), 1);
    }

    #[test]
    fn test_stereo_detection_blocked_by_remembered_left() {
        // "out_1" is remembered in another grouping the user set up, so
        // it must not be silently re-paired
        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Output),
            port_names: vec!["out_1".to_string(), "aux".to_string()],
            above_metadatas: false,
        };

        let mut g = group("MyApp");
        let mut next_pgid = 1;
        add_audio_out(&mut g, 1, "MyApp:out_1");
        detect_last(&mut g, std::slice::from_ref(&mem), &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:out_2");
        detect_last(&mut g, std::slice::from_ref(&mem), &mut next_pgid);

        assert!(g.portgroups.is_empty());
    }

    #[test]
    fn test_remembered_grouping_builds_portgroup() {
        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Input),
            port_names: vec!["in_L".to_string(), "in_R".to_string()],
            above_metadatas: false,
        };

        let mut g = group("MyApp");
        let mut next_pgid = 1;
        g.add_port(audio_port(1, "MyApp:in_L", JackPortFlags::IS_INPUT));
        detect_last(&mut g, std::slice::from_ref(&mem), &mut next_pgid);
        assert!(g.portgroups.is_empty());

        g.add_port(audio_port(2, "MyApp:in_R", JackPortFlags::IS_INPUT));
        detect_last(&mut g, std::slice::from_ref(&mem), &mut next_pgid);

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![1, 2]);
    }

    #[test]
    fn test_remembered_grouping_wins_over_metadata() {
        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Input),
            port_names: vec!["in_L".to_string(), "in_R".to_string()],
            above_metadatas: false,
        };

        let mut g = group("MyApp");
        let mut next_pgid = 1;
        let mut left = audio_port(1, "MyApp:in_L", JackPortFlags::IS_INPUT);
        left.mdata_portgroup = "pair".to_string();
        let mut right = audio_port(2, "MyApp:in_R", JackPortFlags::IS_INPUT);
        right.mdata_portgroup = "pair".to_string();

        g.add_port(left);
        detect_last(&mut g, std::slice::from_ref(&mem), &mut next_pgid);
        g.add_port(right);
        detect_last(&mut g, std::slice::from_ref(&mem), &mut next_pgid);

        // one portgroup, built from the memory (no metadata tag on it)
        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![1, 2]);
        assert!(g.portgroups[0].mdata_portgroup.is_empty());
    }

    #[test]
    fn test_metadata_grouping_consecutive_tags() {
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        for (port_id, name) in [(1, "MyApp:a"), (2, "MyApp:b")] {
            let mut port = audio_port(port_id, name, JackPortFlags::IS_OUTPUT);
            port.mdata_portgroup = "pair".to_string();
            g.add_port(port);
            detect_last(&mut g, &[], &mut next_pgid);
        }

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].mdata_portgroup, "pair");
        assert_eq!(g.portgroups[0].port_ids, vec![1, 2]);
    }

    #[test]
    fn test_one_member_portgroup_never_built() {
        let mut g = group("MyApp");
        let mut next_pgid = 1;
        add_audio_out(&mut g, 1, "MyApp:solo");
        assert!(g.make_portgroup(&mut next_pgid, PortMode::Output, vec![1]).is_none());
        assert!(g.make_portgroup(&mut next_pgid, PortMode::Output, vec![]).is_none());
        assert!(g.portgroups.is_empty());
    }

    #[test]
    fn test_sort_breaks_and_rebuilds_portgroups() {
        let mut canvas = RecordingCanvas::new();
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "MyApp:out_1");
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:out_2");
        detect_last(&mut g, &[], &mut next_pgid);
        assert_eq!(g.portgroups.len(), 1);

        // order hints reverse the pair: members no longer appear in the
        // portgroup's order, so it is torn down, and with no memory or
        // metadata source nothing rebuilds it
        g.port_mut(2).unwrap().order = Some(1);
        g.port_mut(1).unwrap().order = Some(2);
        g.sort_ports();
        {
            let mut c = ctx(&mut canvas);
            g.rebuild_portgroups(&[], &mut next_pgid, &mut c);
        }

        assert!(g.portgroups.is_empty());
        assert_eq!(g.port(1).unwrap().portgroup_id, 0);
        assert_eq!(g.port(2).unwrap().portgroup_id, 0);
    }

    #[test]
    fn test_sort_keeps_consecutive_portgroup() {
        let mut canvas = RecordingCanvas::new();
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "MyApp:out_1");
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:out_2");
        detect_last(&mut g, &[], &mut next_pgid);

        g.sort_ports();
        {
            let mut c = ctx(&mut canvas);
            g.rebuild_portgroups(&[], &mut next_pgid, &mut c);
        }

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![1, 2]);
    }

    #[test]
    fn test_rebuild_from_memory_after_sort() {
        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Output),
            port_names: vec!["out_b".to_string(), "out_a".to_string()],
            above_metadatas: false,
        };

        let mut canvas = RecordingCanvas::new();
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        // arrival order does not match the memory; the order hints do
        add_audio_out(&mut g, 1, "MyApp:out_a");
        add_audio_out(&mut g, 2, "MyApp:out_b");
        g.port_mut(2).unwrap().order = Some(1);
        g.port_mut(1).unwrap().order = Some(2);

        g.sort_ports();
        {
            let mut c = ctx(&mut canvas);
            g.rebuild_portgroups(std::slice::from_ref(&mem), &mut next_pgid, &mut c);
        }

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![2, 1]);
    }

    #[test]
    fn test_portgroup_memory_added_replaces_detected_pair() {
        let mut canvas = RecordingCanvas::new();
        let mut g = group("MyApp");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "MyApp:out_1");
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 2, "MyApp:out_2");
        detect_last(&mut g, &[], &mut next_pgid);
        add_audio_out(&mut g, 3, "MyApp:out_3");
        detect_last(&mut g, &[], &mut next_pgid);
        assert_eq!(g.portgroups.len(), 1);

        // the user regroups out_2 + out_3
        let mem = PortgroupMem {
            group_name: "MyApp".to_string(),
            port_type: Some(PortType::Audio),
            port_mode: Some(PortMode::Output),
            port_names: vec!["out_2".to_string(), "out_3".to_string()],
            above_metadatas: false,
        };

        {
            let mut c = ctx(&mut canvas);
            g.portgroup_memory_added(&mem, &mut next_pgid, &mut c);
        }

        assert_eq!(g.portgroups.len(), 1);
        assert_eq!(g.portgroups[0].port_ids, vec![2, 3]);
        assert_eq!(g.port(1).unwrap().portgroup_id, 0);
    }

    #[test]
    fn test_display_name_merge_on_sibling_arrival() {
        let mut canvas = RecordingCanvas::new();
        let mut g = group("Qtractor");
        let mut next_pgid = 1;

        add_audio_out(&mut g, 1, "Qtractor:Master/out_1");
        g.graceful_port(0);
        detect_last(&mut g, &[], &mut next_pgid);
        assert_eq!(g.port(1).unwrap().display_name, "Master");
        assert_eq!(g.port(1).unwrap().last_digit_to_add, Some('1'));

        add_audio_out(&mut g, 2, "Qtractor:Master/out_2");
        g.graceful_port(1);
        {
            let mut c = ctx(&mut canvas);
            g.check_for_display_name_on_last_port(&mut c);
        }

        assert_eq!(g.port(1).unwrap().display_name, "Master 1");
        assert_eq!(g.port(1).unwrap().last_digit_to_add, None);
        assert_eq!(g.port(2).unwrap().display_name, "Master 2");
    }

    #[test]
    fn test_hardware_group_splits_fresh_position() {
        let mut g = group("system");
        let save = g.add_port(audio_port(
            1,
            "system:capture_1",
            JackPortFlags::IS_INPUT | JackPortFlags::IS_PHYSICAL,
        ));
        assert!(save);
        assert!(g.is_hardware());
        assert!(g.current_position.fully_set);
        assert!(g.current_position.flags.contains(GroupPosFlags::SPLITTED));
    }

    #[test]
    fn test_box_classification() {
        let mut g = group("PulseAudio JACK Sink");
        g.add_port(audio_port(1, "PulseAudio JACK Sink:front-left", JackPortFlags::IS_INPUT));
        let (box_type, icon) = g.box_type_and_icon();
        assert_eq!(box_type, BoxType::Monitor);
        assert_eq!(icon, "monitor_playback");

        let mut hw = group("system");
        hw.add_port(audio_port(
            1,
            "system:capture_1",
            JackPortFlags::IS_INPUT | JackPortFlags::IS_PHYSICAL,
        ));
        assert_eq!(hw.box_type_and_icon(), (BoxType::Hardware, String::new()));

        let mut with_icon = group("Carla");
        with_icon.client_icon = "carla".to_string();
        assert_eq!(with_icon.box_type_and_icon(), (BoxType::Client, "carla".to_string()));

        let mut mdata = group("Carla");
        mdata.client_icon = "carla".to_string();
        mdata.mdata_icon = "other".to_string();
        assert_eq!(mdata.box_type_and_icon(), (BoxType::Client, "other".to_string()));

        let monitor = group("Speakers Monitor");
        assert_eq!(
            monitor.box_type_and_icon(),
            (BoxType::Monitor, "monitor_playback".to_string())
        );
    }
}
