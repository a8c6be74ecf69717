//! Shared identifiers, enums and flag sets for the patchbay graph.
//!
//! Several of these types end up in persisted files (`GroupPos`,
//! `PortgroupMem`), so their numeric values are part of the on-disk
//! format and must not be renumbered.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Canvas identifier for a group box. Allocated by the manager, never reused.
pub type GroupId = u32;
/// Canvas identifier for a port.
pub type PortId = u32;
/// Canvas identifier for a portgroup. 0 means "not in any portgroup".
pub type PortgroupId = u32;
/// Canvas identifier for a connection.
pub type ConnectionId = u32;

/// Media family of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortType {
    Null,
    Audio,
    Midi,
    Video,
}

impl PortType {
    /// Numeric value used in persisted records.
    pub fn as_u32(self) -> u32 {
        match self {
            PortType::Null => 0,
            PortType::Audio => 1,
            PortType::Midi => 2,
            PortType::Video => 8,
        }
    }

    /// Unknown values coerce to `Null` at the call site.
    pub fn from_u32(value: u32) -> Option<PortType> {
        match value {
            0 => Some(PortType::Null),
            1 => Some(PortType::Audio),
            2 => Some(PortType::Midi),
            8 => Some(PortType::Video),
            _ => None,
        }
    }
}

/// Refinement of [`PortType`]: regular stream, control voltage, or a port
/// coming from an ALSA MIDI bridge (a2j / Midi-Bridge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortSubType {
    Regular,
    Cv,
    A2j,
}

/// Whether a port consumes or produces signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortMode {
    Null,
    Input,
    Output,
    Both,
}

impl PortMode {
    pub fn as_u32(self) -> u32 {
        match self {
            PortMode::Null => 0,
            PortMode::Input => 1,
            PortMode::Output => 2,
            PortMode::Both => 3,
        }
    }

    pub fn from_u32(value: u32) -> Option<PortMode> {
        match value {
            0 => Some(PortMode::Null),
            1 => Some(PortMode::Input),
            2 => Some(PortMode::Output),
            3 => Some(PortMode::Both),
            _ => None,
        }
    }
}

/// Visual classification of a group box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxType {
    Application,
    Hardware,
    Monitor,
    Client,
}

/// How a group box lays out its port columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxLayoutMode {
    Auto,
    High,
    Large,
}

impl BoxLayoutMode {
    pub fn as_u32(self) -> u32 {
        match self {
            BoxLayoutMode::Auto => 0,
            BoxLayoutMode::High => 1,
            BoxLayoutMode::Large => 2,
        }
    }

    pub fn from_u32(value: u32) -> Option<BoxLayoutMode> {
        match value {
            0 => Some(BoxLayoutMode::Auto),
            1 => Some(BoxLayoutMode::High),
            2 => Some(BoxLayoutMode::Large),
            _ => None,
        }
    }
}

/// Split state requested when a group box is first added to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSplitMode {
    Undef,
    No,
    Yes,
}

/// JACK-style port flags as reported by the sound server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JackPortFlags(pub u32);

impl JackPortFlags {
    pub const IS_INPUT: JackPortFlags = JackPortFlags(0x01);
    pub const IS_OUTPUT: JackPortFlags = JackPortFlags(0x02);
    pub const IS_PHYSICAL: JackPortFlags = JackPortFlags(0x04);
    pub const CAN_MONITOR: JackPortFlags = JackPortFlags(0x08);
    pub const IS_TERMINAL: JackPortFlags = JackPortFlags(0x10);
    pub const IS_CONTROL_VOLTAGE: JackPortFlags = JackPortFlags(0x100);

    pub fn contains(self, other: JackPortFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for JackPortFlags {
    type Output = JackPortFlags;
    fn bitor(self, rhs: JackPortFlags) -> JackPortFlags {
        JackPortFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for JackPortFlags {
    fn bitor_assign(&mut self, rhs: JackPortFlags) {
        self.0 |= rhs.0;
    }
}

/// Layout flags persisted per group box.
///
/// The values come from historical config files where other bits have
/// since been retired, which is why the set is sparse. Keep them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupPosFlags(pub u32);

impl GroupPosFlags {
    pub const SPLITTED: GroupPosFlags = GroupPosFlags(0x04);
    pub const WRAPPED_INPUT: GroupPosFlags = GroupPosFlags(0x10);
    pub const WRAPPED_OUTPUT: GroupPosFlags = GroupPosFlags(0x20);
    pub const HAS_BEEN_SPLITTED: GroupPosFlags = GroupPosFlags(0x40);

    /// Every bit this version understands; unknown bits are dropped on load.
    pub const ALL: GroupPosFlags = GroupPosFlags(0x04 | 0x10 | 0x20 | 0x40);

    pub fn contains(self, other: GroupPosFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: GroupPosFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for GroupPosFlags {
    type Output = GroupPosFlags;
    fn bitor(self, rhs: GroupPosFlags) -> GroupPosFlags {
        GroupPosFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for GroupPosFlags {
    fn bitor_assign(&mut self, rhs: GroupPosFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for GroupPosFlags {
    type Output = GroupPosFlags;
    fn bitand(self, rhs: GroupPosFlags) -> GroupPosFlags {
        GroupPosFlags(self.0 & rhs.0)
    }
}

impl Not for GroupPosFlags {
    type Output = GroupPosFlags;
    fn not(self) -> GroupPosFlags {
        GroupPosFlags(!self.0)
    }
}

/// Which port-type categories the canvas currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortTypesViewFlag(pub u32);

impl PortTypesViewFlag {
    pub const NONE: PortTypesViewFlag = PortTypesViewFlag(0x00);
    pub const AUDIO: PortTypesViewFlag = PortTypesViewFlag(0x01);
    pub const MIDI: PortTypesViewFlag = PortTypesViewFlag(0x02);
    pub const CV: PortTypesViewFlag = PortTypesViewFlag(0x04);
    pub const VIDEO: PortTypesViewFlag = PortTypesViewFlag(0x08);
    pub const ALL: PortTypesViewFlag = PortTypesViewFlag(0x0f);

    pub fn contains(self, other: PortTypesViewFlag) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether a port of the given type/subtype belongs to a currently
    /// visible category.
    pub fn shows(self, port_type: PortType, subtype: PortSubType) -> bool {
        match port_type {
            PortType::Audio => match subtype {
                PortSubType::Cv => self.contains(PortTypesViewFlag::CV),
                _ => self.contains(PortTypesViewFlag::AUDIO),
            },
            PortType::Midi => self.contains(PortTypesViewFlag::MIDI),
            PortType::Video => self.contains(PortTypesViewFlag::VIDEO),
            PortType::Null => false,
        }
    }
}

impl BitOr for PortTypesViewFlag {
    type Output = PortTypesViewFlag;
    fn bitor(self, rhs: PortTypesViewFlag) -> PortTypesViewFlag {
        PortTypesViewFlag(self.0 | rhs.0)
    }
}

impl BitAnd for PortTypesViewFlag {
    type Output = PortTypesViewFlag;
    fn bitand(self, rhs: PortTypesViewFlag) -> PortTypesViewFlag {
        PortTypesViewFlag(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values_are_stable() {
        // These exact values appear in config files written by older versions.
        assert_eq!(GroupPosFlags::SPLITTED.0, 0x04);
        assert_eq!(GroupPosFlags::WRAPPED_INPUT.0, 0x10);
        assert_eq!(GroupPosFlags::WRAPPED_OUTPUT.0, 0x20);
        assert_eq!(GroupPosFlags::HAS_BEEN_SPLITTED.0, 0x40);
        assert_eq!(JackPortFlags::IS_CONTROL_VOLTAGE.0, 0x100);
        assert_eq!(PortTypesViewFlag::ALL.0, 0x0f);
    }

    #[test]
    fn test_view_flag_shows() {
        let view = PortTypesViewFlag::AUDIO | PortTypesViewFlag::MIDI;
        assert!(view.shows(PortType::Audio, PortSubType::Regular));
        assert!(view.shows(PortType::Midi, PortSubType::A2j));
        assert!(!view.shows(PortType::Audio, PortSubType::Cv));
        assert!(!view.shows(PortType::Video, PortSubType::Regular));
        assert!(!view.shows(PortType::Null, PortSubType::Regular));
        assert!(PortTypesViewFlag::ALL.shows(PortType::Audio, PortSubType::Cv));
    }

    #[test]
    fn test_enum_round_trip() {
        for mode in [PortMode::Null, PortMode::Input, PortMode::Output, PortMode::Both] {
            assert_eq!(PortMode::from_u32(mode.as_u32()), Some(mode));
        }
        for pt in [PortType::Null, PortType::Audio, PortType::Midi, PortType::Video] {
            assert_eq!(PortType::from_u32(pt.as_u32()), Some(pt));
        }
        assert_eq!(PortType::from_u32(77), None);
        assert_eq!(BoxLayoutMode::from_u32(99), None);
    }
}
