//! Slot classifications shared by hosts and facades

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of data a named behaviour slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// A single data record
    Data,
    /// An ordered collection of data records
    DataRange,
    /// A single setting record
    Setting,
    /// An ordered collection of setting records
    SettingRange,
    /// A reference to a scene object
    ObjectRef,
    /// An ordered collection of scene object references
    ObjectRefRange,
    /// A reference to another behaviour
    Reference,
    /// An ordered collection of behaviour references
    ReferenceRange,
    /// A plain string stored on the behaviour
    BehaviourString,
    /// None of the host getters accepted the slot
    Unknown,
}

impl PropertyKind {
    /// Probe order. Some slot names answer to more than one getter on the
    /// host, and the first kind in this list that answers wins.
    pub const PROBE_ORDER: [PropertyKind; 9] = [
        PropertyKind::Data,
        PropertyKind::DataRange,
        PropertyKind::Setting,
        PropertyKind::SettingRange,
        PropertyKind::ObjectRef,
        PropertyKind::ObjectRefRange,
        PropertyKind::Reference,
        PropertyKind::ReferenceRange,
        PropertyKind::BehaviourString,
    ];

    /// Whether this kind holds a collection
    pub fn is_range(&self) -> bool {
        self.range_kind().is_some()
    }

    /// The range membership kind, for range slots
    pub fn range_kind(&self) -> Option<RangeKind> {
        match self {
            Self::DataRange => Some(RangeKind::Data),
            Self::SettingRange => Some(RangeKind::Setting),
            Self::ObjectRefRange => Some(RangeKind::Object),
            Self::ReferenceRange => Some(RangeKind::Reference),
            _ => None,
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::DataRange => "data range",
            Self::Setting => "setting",
            Self::SettingRange => "setting range",
            Self::ObjectRef => "object reference",
            Self::ObjectRefRange => "object reference range",
            Self::Reference => "behaviour reference",
            Self::ReferenceRange => "behaviour reference range",
            Self::BehaviourString => "string",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Element kind of a range slot, used by the range editor calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeKind {
    Data,
    Setting,
    Object,
    Reference,
}

impl RangeKind {
    /// The range property kind this element kind belongs to
    pub fn property_kind(&self) -> PropertyKind {
        match self {
            Self::Data => PropertyKind::DataRange,
            Self::Setting => PropertyKind::SettingRange,
            Self::Object => PropertyKind::ObjectRefRange,
            Self::Reference => PropertyKind::ReferenceRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_order_excludes_unknown() {
        assert!(!PropertyKind::PROBE_ORDER.contains(&PropertyKind::Unknown));
        assert_eq!(PropertyKind::PROBE_ORDER[0], PropertyKind::Data);
        assert_eq!(PropertyKind::PROBE_ORDER[8], PropertyKind::BehaviourString);
    }

    #[test]
    fn test_range_kinds_round_trip() {
        for kind in PropertyKind::PROBE_ORDER {
            if let Some(range) = kind.range_kind() {
                assert_eq!(range.property_kind(), kind);
            }
        }
        assert!(!PropertyKind::Setting.is_range());
    }
}
