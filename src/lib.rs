//! In-memory patchbay graph model.
//!
//! Mirrors an audio/MIDI connection graph (groups of ports, detected
//! stereo pairs, cables) into any rendering surface implementing the
//! [`Canvas`] trait. The model is authoritative: it decides what exists,
//! what is visible under the active type-view filter, and what the ports
//! are called; the canvas only draws.
//!
//! Drive it through [`PatchbayManager`]: feed it port/connection events
//! from a sound server, and it takes care of group lifecycles, graceful
//! display names, portgroup detection (remembered groupings, server
//! metadata, the stereo heuristic) and layout persistence shapes.

pub mod canvas;
pub mod connection;
pub mod group;
pub mod group_pos;
pub mod manager;
pub mod naming;
pub mod port;
pub mod portgroup;
pub mod portgroup_mem;
pub mod types;

pub use canvas::{Canvas, CanvasContext, CanvasEvent, RecordingCanvas, Xy};
pub use connection::{ConnEnd, Connection};
pub use group::Group;
pub use group_pos::GroupPos;
pub use manager::PatchbayManager;
pub use port::Port;
pub use portgroup::Portgroup;
pub use portgroup_mem::PortgroupMem;
pub use types::{
    BoxLayoutMode, BoxSplitMode, BoxType, ConnectionId, GroupId, GroupPosFlags, JackPortFlags,
    PortId, PortMode, PortSubType, PortType, PortTypesViewFlag, PortgroupId,
};
