//! Facade base, wrapping and unwrapping of host results
//!
//! Every facade owns one [`FacadeCore`]: the wrapped handle, the kind it
//! was resolved to, the scene it lives in, and a weak link to the facade
//! that produced it. Facades are created on demand and never pooled, so
//! wrapping the same handle twice yields two facades that compare equal.

use crate::behaviour::BehaviourFacade;
use crate::error::FacadeResult;
use crate::layer::LayerFacade;
use crate::object::ObjectFacade;
use crate::record::RecordFacade;
use crate::registry::FacadeKind;
use crate::scene::SceneFacade;
use std::fmt;
use std::rc::{Rc, Weak};
use void_host::{HostHandle, HostResult, HostValue};

/// Shared state behind every facade
pub struct FacadeCore {
    handle: HostHandle,
    kind: FacadeKind,
    scene: SceneFacade,
    creator: Option<Weak<FacadeCore>>,
}

impl FacadeCore {
    pub(crate) fn new(
        scene: &SceneFacade,
        handle: HostHandle,
        kind: FacadeKind,
        creator: Option<&Rc<FacadeCore>>,
    ) -> Rc<Self> {
        debug_assert!(!handle.is_null(), "facades never wrap the null handle");
        Rc::new(Self {
            handle,
            kind,
            scene: scene.clone(),
            creator: creator.map(Rc::downgrade),
        })
    }

    /// The wrapped host handle
    pub fn handle(&self) -> HostHandle {
        self.handle
    }

    /// The facade kind this handle was resolved to
    pub fn kind(&self) -> FacadeKind {
        self.kind
    }

    /// The scene this facade belongs to
    pub fn scene(&self) -> &SceneFacade {
        &self.scene
    }

    /// The facade that produced this one, if it is still alive
    pub fn creator(&self) -> Option<Rc<FacadeCore>> {
        self.creator.as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for FacadeCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacadeCore")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("has_creator", &self.creator().is_some())
            .finish()
    }
}

/// Common behaviour of every facade
pub trait Facade {
    /// The shared core
    fn core(&self) -> &Rc<FacadeCore>;

    /// The wrapped handle; this is what unwrapping a facade yields
    fn handle(&self) -> HostHandle {
        self.core().handle()
    }

    fn kind(&self) -> FacadeKind {
        self.core().kind()
    }

    fn scene(&self) -> &SceneFacade {
        self.core().scene()
    }

    /// The facade that produced this one
    fn creator(&self) -> Option<Rc<FacadeCore>> {
        self.core().creator()
    }

    /// The facade kind generic guids produced by this facade resolve to
    fn guid_class(&self) -> Option<FacadeKind> {
        self.kind().guid_class()
    }

    /// Wrap a raw host result with this facade as its creator
    fn wrap(&self, value: HostValue) -> Option<Wrapped> {
        self.scene().wrap(value, Some(self.core()))
    }

    /// Wrap the result of a host call, propagating host errors
    fn wrap_result(&self, result: HostResult<HostValue>) -> FacadeResult<Option<Wrapped>> {
        Ok(self.wrap(result?))
    }

    /// Whether both facades name the same host node
    fn same_host_node(&self, other: &dyn Facade) -> bool {
        self.handle() == other.handle()
    }
}

/// Anything that stands for a host handle
pub trait AsHostHandle {
    fn as_host_handle(&self) -> HostHandle;
}

impl AsHostHandle for HostHandle {
    fn as_host_handle(&self) -> HostHandle {
        *self
    }
}

impl<F: Facade> AsHostHandle for F {
    fn as_host_handle(&self) -> HostHandle {
        self.handle()
    }
}

/// Equality, hashing and debug output by host identity
macro_rules! facade_identity {
    ($ty:ident) => {
        impl<F: $crate::facade::Facade> PartialEq<F> for $ty {
            fn eq(&self, other: &F) -> bool {
                $crate::facade::Facade::handle(self) == other.handle()
            }
        }

        impl Eq for $ty {}

        impl PartialEq<void_host::HostHandle> for $ty {
            fn eq(&self, other: &void_host::HostHandle) -> bool {
                $crate::facade::Facade::handle(self) == *other
            }
        }

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                $crate::facade::Facade::handle(self).hash(state);
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "{}({})",
                    stringify!($ty),
                    $crate::facade::Facade::handle(self)
                )
            }
        }
    };
}

pub(crate) use facade_identity;

/// Minimal facade for classes with no registered wrapper
#[derive(Clone)]
pub struct GenericFacade {
    core: Rc<FacadeCore>,
}

impl GenericFacade {
    pub(crate) fn from_core(core: Rc<FacadeCore>) -> Self {
        Self { core }
    }
}

impl Facade for GenericFacade {
    fn core(&self) -> &Rc<FacadeCore> {
        &self.core
    }
}

facade_identity!(GenericFacade);

/// A facade of any kind, as produced by [`SceneFacade::wrap`]
#[derive(Clone)]
pub enum AnyFacade {
    Object(ObjectFacade),
    Behaviour(BehaviourFacade),
    Record(RecordFacade),
    Layer(LayerFacade),
    Generic(GenericFacade),
}

impl AnyFacade {
    pub(crate) fn from_core(core: Rc<FacadeCore>) -> Self {
        match core.kind() {
            FacadeKind::Object => Self::Object(ObjectFacade::from_core(core)),
            FacadeKind::Behaviour => Self::Behaviour(BehaviourFacade::from_core(core, None)),
            FacadeKind::Data | FacadeKind::Setting => Self::Record(RecordFacade::from_core(core)),
            FacadeKind::Layer => Self::Layer(LayerFacade::from_core(core)),
            FacadeKind::Generic => Self::Generic(GenericFacade::from_core(core)),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectFacade> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_behaviour(&self) -> Option<&BehaviourFacade> {
        match self {
            Self::Behaviour(behaviour) => Some(behaviour),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordFacade> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_layer(&self) -> Option<&LayerFacade> {
        match self {
            Self::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<ObjectFacade> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn into_behaviour(self) -> Option<BehaviourFacade> {
        match self {
            Self::Behaviour(behaviour) => Some(behaviour),
            _ => None,
        }
    }
}

impl Facade for AnyFacade {
    fn core(&self) -> &Rc<FacadeCore> {
        match self {
            Self::Object(f) => f.core(),
            Self::Behaviour(f) => f.core(),
            Self::Record(f) => f.core(),
            Self::Layer(f) => f.core(),
            Self::Generic(f) => f.core(),
        }
    }
}

facade_identity!(AnyFacade);

/// A host result after wrapping
#[derive(Debug, Clone)]
pub enum Wrapped {
    /// Plain data, passed through unchanged
    Value(HostValue),
    /// A host handle wrapped in its facade
    Facade(AnyFacade),
    List(Vec<Wrapped>),
    Tuple(Vec<Wrapped>),
    Set(Vec<Wrapped>),
}

impl Wrapped {
    pub fn as_facade(&self) -> Option<&AnyFacade> {
        match self {
            Self::Facade(facade) => Some(facade),
            _ => None,
        }
    }

    pub fn into_facade(self) -> Option<AnyFacade> {
        match self {
            Self::Facade(facade) => Some(facade),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&HostValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of a wrapped list, tuple or set
    pub fn elements(&self) -> Option<&[Wrapped]> {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }
}

/// Wrap a raw host value.
///
/// Host-null yields `None`. Containers are wrapped element-wise, dropping
/// null elements and keeping the container kind.
pub(crate) fn wrap_value(
    scene: &SceneFacade,
    value: HostValue,
    creator: Option<&Rc<FacadeCore>>,
) -> Option<Wrapped> {
    match value {
        HostValue::Null => None,
        HostValue::Handle(handle) => {
            let handle = handle.non_null()?;
            let kind = scene
                .registry()
                .resolve(handle.class(), creator.map(|c| c.kind()));
            let core = FacadeCore::new(scene, handle, kind, creator);
            Some(Wrapped::Facade(AnyFacade::from_core(core)))
        }
        HostValue::List(items) => Some(Wrapped::List(wrap_elements(scene, items, creator))),
        HostValue::Tuple(items) => Some(Wrapped::Tuple(wrap_elements(scene, items, creator))),
        HostValue::Set(items) => Some(Wrapped::Set(wrap_elements(scene, items, creator))),
        plain => Some(Wrapped::Value(plain)),
    }
}

fn wrap_elements(
    scene: &SceneFacade,
    items: Vec<HostValue>,
    creator: Option<&Rc<FacadeCore>>,
) -> Vec<Wrapped> {
    items
        .into_iter()
        .filter_map(|item| wrap_value(scene, item, creator))
        .collect()
}

/// Strip facades back down to raw handles and values
pub fn unwrap(value: &Wrapped) -> HostValue {
    match value {
        Wrapped::Value(value) => value.clone(),
        Wrapped::Facade(facade) => HostValue::Handle(facade.handle()),
        Wrapped::List(items) => HostValue::List(items.iter().map(unwrap).collect()),
        Wrapped::Tuple(items) => HostValue::Tuple(items.iter().map(unwrap).collect()),
        Wrapped::Set(items) => HostValue::Set(items.iter().map(unwrap).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FacadeConfig;
    use crate::registry::WrapperRegistry;
    use void_host::{HostClass, MemoryHost};

    fn scene() -> (MemoryHost, SceneFacade) {
        let host = MemoryHost::new();
        let scene = SceneFacade::open(
            Rc::new(host.clone()),
            WrapperRegistry::standard(),
            FacadeConfig::default(),
        );
        (host, scene)
    }

    #[test]
    fn test_null_wraps_to_none() {
        let (_, scene) = scene();
        assert!(scene.wrap(HostValue::Null, None).is_none());
        assert!(scene
            .wrap(HostValue::Handle(HostHandle::null(HostClass::Object)), None)
            .is_none());
    }

    #[test]
    fn test_plain_values_pass_through() {
        let (_, scene) = scene();
        let wrapped = scene.wrap(HostValue::from(4.5), None).unwrap();
        assert_eq!(wrapped.as_value(), Some(&HostValue::Float(4.5)));
    }

    #[test]
    fn test_round_trip() {
        let (host, scene) = scene();
        let object = host.create_object("Arm");

        let wrapped = scene.wrap(HostValue::Handle(object), None).unwrap();
        assert!(matches!(wrapped.as_facade(), Some(AnyFacade::Object(_))));
        assert_eq!(unwrap(&wrapped), HostValue::Handle(object));
    }

    #[test]
    fn test_containers_keep_kind_and_drop_nulls() {
        let (host, scene) = scene();
        let a = host.create_object("A");
        let b = host.create_object("B");

        let raw = HostValue::Tuple(vec![
            HostValue::Handle(a),
            HostValue::Null,
            HostValue::Handle(HostHandle::null(HostClass::Object)),
            HostValue::List(vec![HostValue::Handle(b), HostValue::Int(3)]),
        ]);
        let wrapped = scene.wrap(raw, None).unwrap();

        let Wrapped::Tuple(items) = &wrapped else {
            panic!("expected a tuple, got {:?}", wrapped);
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            unwrap(&wrapped),
            HostValue::Tuple(vec![
                HostValue::Handle(a),
                HostValue::List(vec![HostValue::Handle(b), HostValue::Int(3)]),
            ])
        );
    }

    #[test]
    fn test_guid_resolved_by_creator() {
        let (host, scene) = scene();
        let layer = scene.layer(host.create_layer("Props"));
        let guid = HostHandle::new(HostClass::Guid, 4242);

        let from_layer = layer.wrap(HostValue::Handle(guid)).unwrap();
        assert!(matches!(from_layer.as_facade(), Some(AnyFacade::Object(_))));

        let from_root = scene.wrap(HostValue::Handle(guid), None).unwrap();
        assert!(matches!(from_root.as_facade(), Some(AnyFacade::Generic(_))));

        // Different wrapper types over the same handle still compare equal
        assert_eq!(from_layer.as_facade().unwrap(), from_root.as_facade().unwrap());
    }

    #[test]
    fn test_creator_is_weak() {
        let (host, scene) = scene();
        let object = host.create_object("Root");
        let child = {
            let parent = scene.object(object);
            let child = parent.wrap(HostValue::Handle(object)).unwrap();
            assert!(child.as_facade().unwrap().creator().is_some());
            child
        };
        assert!(child.as_facade().unwrap().creator().is_none());
    }
}
