//! Opaque identifiers issued by the host model
//!
//! A handle is only an identifier. The host owns the node it names and may
//! delete it at any time; a stale handle is answered with
//! [`HostError::InvalidHandle`](crate::HostError::InvalidHandle) by the host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The host-native class of the node a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HostClass {
    /// The open scene itself
    Scene,
    /// A scene object node
    Object,
    /// A behaviour attached to an object
    Behaviour,
    /// A data record (animatable value)
    Data,
    /// A setting record (animatable value, authoring-side)
    Setting,
    /// A layer grouping objects
    Layer,
    /// A generic guid whose concrete class depends on who produced it.
    /// Hosts answer it by raw id.
    Guid,
}

impl HostClass {
    /// Lowercase name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Object => "object",
            Self::Behaviour => "behaviour",
            Self::Data => "data",
            Self::Setting => "setting",
            Self::Layer => "layer",
            Self::Guid => "guid",
        }
    }
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An identifier into the host model
///
/// Equality and hashing follow host identity: two handles are equal when
/// they name the same host node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostHandle {
    class: HostClass,
    raw: u64,
}

impl HostHandle {
    /// Raw value reserved for the null sentinel
    pub const NULL_RAW: u64 = u64::MAX;

    /// Create a handle from its class and raw host id
    #[inline]
    pub const fn new(class: HostClass, raw: u64) -> Self {
        Self { class, raw }
    }

    /// The null sentinel for a class ("field present but empty")
    #[inline]
    pub const fn null(class: HostClass) -> Self {
        Self {
            class,
            raw: Self::NULL_RAW,
        }
    }

    /// Check for the null sentinel
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.raw == Self::NULL_RAW
    }

    /// The host-native class
    #[inline]
    pub const fn class(&self) -> HostClass {
        self.class
    }

    /// The raw host id
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.raw
    }

    /// `None` for the null sentinel, `Some(self)` otherwise
    #[inline]
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "HostHandle({}:null)", self.class)
        } else {
            write!(f, "HostHandle({}:{})", self.class, self.raw)
        }
    }
}

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "{}#null", self.class)
        } else {
            write!(f, "{}#{}", self.class, self.raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_null_sentinel() {
        let null = HostHandle::null(HostClass::Object);
        assert!(null.is_null());
        assert_eq!(null.non_null(), None);

        let handle = HostHandle::new(HostClass::Object, 7);
        assert!(!handle.is_null());
        assert_eq!(handle.non_null(), Some(handle));
    }

    #[test]
    fn test_identity() {
        let a = HostHandle::new(HostClass::Behaviour, 3);
        let b = HostHandle::new(HostClass::Behaviour, 3);
        let c = HostHandle::new(HostClass::Behaviour, 4);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        assert_eq!(HostHandle::new(HostClass::Data, 12).to_string(), "data#12");
        assert_eq!(HostHandle::null(HostClass::Layer).to_string(), "layer#null");
    }
}
