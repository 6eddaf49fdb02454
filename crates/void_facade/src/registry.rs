//! Wrapper registry - which facade wraps which host-native class
//!
//! The registry is built once, before the scene is opened, and handed to
//! [`SceneFacade::open`](crate::SceneFacade::open). Resolution is a pure
//! lookup: the same class and creator always resolve to the same facade.

use std::collections::BTreeMap;
use std::fmt;
use void_host::HostClass;

/// The facade types a host handle can be wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacadeKind {
    Object,
    Behaviour,
    Data,
    Setting,
    Layer,
    /// Fallback for classes nothing is registered for
    Generic,
}

impl FacadeKind {
    /// The facade a generic guid becomes when this facade produced it
    pub fn guid_class(&self) -> Option<FacadeKind> {
        match self {
            Self::Object => Some(Self::Behaviour),
            Self::Behaviour => Some(Self::Data),
            Self::Layer => Some(Self::Object),
            Self::Data | Self::Setting | Self::Generic => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Behaviour => "behaviour",
            Self::Data => "data",
            Self::Setting => "setting",
            Self::Layer => "layer",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for FacadeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping from host-native class to facade kind
#[derive(Debug, Clone)]
pub struct WrapperRegistry {
    by_class: BTreeMap<HostClass, FacadeKind>,
    fallback: FacadeKind,
}

impl WrapperRegistry {
    /// Create an empty registry; everything resolves to the fallback
    pub fn new() -> Self {
        Self {
            by_class: BTreeMap::new(),
            fallback: FacadeKind::Generic,
        }
    }

    /// The standard mapping for the host's built-in classes
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(HostClass::Object, FacadeKind::Object)
            .register(HostClass::Behaviour, FacadeKind::Behaviour)
            .register(HostClass::Data, FacadeKind::Data)
            .register(HostClass::Setting, FacadeKind::Setting)
            .register(HostClass::Layer, FacadeKind::Layer);
        registry
    }

    /// Register the facade for a class, replacing any previous entry
    pub fn register(&mut self, class: HostClass, kind: FacadeKind) -> &mut Self {
        if let Some(previous) = self.by_class.insert(class, kind) {
            if previous != kind {
                log::debug!("Wrapper for {} changed from {} to {}", class, previous, kind);
            }
        }
        self
    }

    /// Set the facade used for unregistered classes
    pub fn with_fallback(mut self, fallback: FacadeKind) -> Self {
        self.fallback = fallback;
        self
    }

    /// Check whether a class has an explicit entry
    pub fn is_registered(&self, class: HostClass) -> bool {
        self.by_class.contains_key(&class)
    }

    /// Resolve the facade kind for a handle of `class`.
    ///
    /// A generic guid takes the creator's declared guid class when it has
    /// one; otherwise the registered mapping applies, then the fallback.
    pub fn resolve(&self, class: HostClass, creator: Option<FacadeKind>) -> FacadeKind {
        if class == HostClass::Guid {
            if let Some(kind) = creator.and_then(|c| c.guid_class()) {
                return kind;
            }
        }
        self.by_class.get(&class).copied().unwrap_or(self.fallback)
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.by_class.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }
}

impl Default for WrapperRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_mapping() {
        let registry = WrapperRegistry::standard();
        assert_eq!(registry.resolve(HostClass::Object, None), FacadeKind::Object);
        assert_eq!(registry.resolve(HostClass::Setting, None), FacadeKind::Setting);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_unregistered_falls_back() {
        let registry = WrapperRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve(HostClass::Object, None), FacadeKind::Generic);
        assert_eq!(registry.resolve(HostClass::Scene, None), FacadeKind::Generic);
    }

    #[test]
    fn test_custom_fallback() {
        let mut registry = WrapperRegistry::new().with_fallback(FacadeKind::Object);
        registry.register(HostClass::Layer, FacadeKind::Layer);

        assert!(registry.is_registered(HostClass::Layer));
        assert!(!registry.is_registered(HostClass::Object));
        assert_eq!(registry.resolve(HostClass::Object, None), FacadeKind::Object);
        assert_eq!(registry.resolve(HostClass::Layer, None), FacadeKind::Layer);
        assert!(WrapperRegistry::standard().is_registered(HostClass::Setting));
    }

    #[test]
    fn test_guid_follows_creator() {
        let registry = WrapperRegistry::standard();
        assert_eq!(registry.resolve(HostClass::Guid, None), FacadeKind::Generic);
        assert_eq!(
            registry.resolve(HostClass::Guid, Some(FacadeKind::Layer)),
            FacadeKind::Object
        );
        assert_eq!(
            registry.resolve(HostClass::Guid, Some(FacadeKind::Behaviour)),
            FacadeKind::Data
        );
        // Creators without a guid class fall through to the mapping
        assert_eq!(
            registry.resolve(HostClass::Guid, Some(FacadeKind::Data)),
            FacadeKind::Generic
        );
    }

    #[test]
    fn test_creator_does_not_affect_concrete_classes() {
        let registry = WrapperRegistry::standard();
        assert_eq!(
            registry.resolve(HostClass::Behaviour, Some(FacadeKind::Layer)),
            FacadeKind::Behaviour
        );
    }
}
