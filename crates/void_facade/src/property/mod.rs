//! Property facades - typed accessors bound to one behaviour slot
//!
//! Each slot kind has a marker type ([`DataSlot`], [`SettingSlot`],
//! [`ObjectSlot`], [`ReferenceSlot`]) that knows which host getters and
//! setters serve it. The scalar and range facades are generic over the
//! marker, so a data range and an object range share one implementation.

mod range;
mod scalar;

pub use range::{
    DataRangeProperty, ObjectRefRangeProperty, RangeProperty, ReferenceRangeProperty,
    SettingRangeProperty,
};
pub use scalar::{
    DataProperty, ObjectRefProperty, RecordProperty, RefProperty, ReferenceProperty,
    SettingProperty, StringProperty,
};

use crate::behaviour::BehaviourFacade;
use crate::error::{FacadeError, FacadeResult};
use crate::facade::Facade;
use crate::registry::FacadeKind;
use std::fmt;
use void_host::{
    BehaviourEditor, BehaviourViewer, DataEditor, HostClass, HostHandle, HostResult, HostValue,
    PropertyKind, RangeKind,
};

// ============================================================================
// Slot binding
// ============================================================================

/// One named slot on one behaviour, optionally pinned to a resolved element
#[derive(Clone)]
pub struct PropertySlot {
    behaviour: BehaviourFacade,
    name: String,
    /// Set for elements handed out by a range; such facades never re-resolve
    cached_id: Option<HostHandle>,
}

impl PropertySlot {
    pub(crate) fn new(behaviour: &BehaviourFacade, name: &str) -> Self {
        Self {
            behaviour: behaviour.clone(),
            name: name.to_string(),
            cached_id: None,
        }
    }

    pub(crate) fn element(&self, id: HostHandle) -> Self {
        Self {
            behaviour: self.behaviour.clone(),
            name: self.name.clone(),
            cached_id: Some(id),
        }
    }

    /// The behaviour the slot lives on
    pub fn behaviour(&self) -> &BehaviourFacade {
        &self.behaviour
    }

    /// Slot name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id a range resolved for this element
    pub fn cached_id(&self) -> Option<HostHandle> {
        self.cached_id
    }

    /// Whether this facade stands for one element of a range
    pub fn is_range_element(&self) -> bool {
        self.cached_id.is_some()
    }

    pub(crate) fn reject_element(&self) -> FacadeResult<()> {
        if self.is_range_element() {
            return Err(FacadeError::RangeElement {
                slot: self.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn handle(&self) -> HostHandle {
        self.behaviour.handle()
    }
}

impl fmt::Debug for PropertySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.behaviour.handle(), self.name)?;
        if let Some(id) = self.cached_id {
            write!(f, "[{}]", id)?;
        }
        Ok(())
    }
}

// ============================================================================
// Slot kinds
// ============================================================================

/// Host getters and setters for one family of slots
pub trait SlotKind: 'static {
    /// Kind of the scalar slot
    const SCALAR: PropertyKind;
    /// Element kind of the range slot
    const RANGE: RangeKind;
    /// Facade kind of the items the slot points at
    const TARGET: FacadeKind;

    /// The scalar facade a range hands out per element
    type Element;

    fn element(slot: PropertySlot) -> Self::Element;

    fn read(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle>;

    fn read_range(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>>;

    fn write(editor: &dyn BehaviourEditor, behaviour: HostHandle, slot: &str, item: HostHandle) -> HostResult<()>;
}

/// Slot kinds that point at data or setting records
pub trait RecordKind: SlotKind {
    /// Create a fresh record of this kind
    fn create(editor: &dyn DataEditor, value: HostValue) -> HostResult<HostHandle>;
}

/// Slot kinds that point at scene nodes
pub trait RefKind: SlotKind {
    /// Sentinel written to clear the slot
    const NULL: HostHandle;
}

/// Data record slots
pub enum DataSlot {}

/// Setting record slots
pub enum SettingSlot {}

/// Scene object reference slots
pub enum ObjectSlot {}

/// Behaviour reference slots
pub enum ReferenceSlot {}

impl SlotKind for DataSlot {
    const SCALAR: PropertyKind = PropertyKind::Data;
    const RANGE: RangeKind = RangeKind::Data;
    const TARGET: FacadeKind = FacadeKind::Data;
    type Element = RecordProperty<Self>;

    fn element(slot: PropertySlot) -> Self::Element {
        RecordProperty::new(slot)
    }

    fn read(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        viewer.get_behaviour_data(behaviour, slot)
    }

    fn read_range(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        viewer.get_behaviour_data_range(behaviour, slot)
    }

    fn write(editor: &dyn BehaviourEditor, behaviour: HostHandle, slot: &str, item: HostHandle) -> HostResult<()> {
        editor.set_behaviour_data(behaviour, slot, item)
    }
}

impl RecordKind for DataSlot {
    fn create(editor: &dyn DataEditor, value: HostValue) -> HostResult<HostHandle> {
        editor.create_data(value)
    }
}

impl SlotKind for SettingSlot {
    const SCALAR: PropertyKind = PropertyKind::Setting;
    const RANGE: RangeKind = RangeKind::Setting;
    const TARGET: FacadeKind = FacadeKind::Setting;
    type Element = RecordProperty<Self>;

    fn element(slot: PropertySlot) -> Self::Element {
        RecordProperty::new(slot)
    }

    fn read(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        viewer.get_behaviour_setting(behaviour, slot)
    }

    fn read_range(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        viewer.get_behaviour_settings_range(behaviour, slot)
    }

    fn write(editor: &dyn BehaviourEditor, behaviour: HostHandle, slot: &str, item: HostHandle) -> HostResult<()> {
        editor.set_behaviour_setting(behaviour, slot, item)
    }
}

impl RecordKind for SettingSlot {
    fn create(editor: &dyn DataEditor, value: HostValue) -> HostResult<HostHandle> {
        editor.create_setting(value)
    }
}

impl SlotKind for ObjectSlot {
    const SCALAR: PropertyKind = PropertyKind::ObjectRef;
    const RANGE: RangeKind = RangeKind::Object;
    const TARGET: FacadeKind = FacadeKind::Object;
    type Element = RefProperty<Self>;

    fn element(slot: PropertySlot) -> Self::Element {
        RefProperty::new(slot)
    }

    fn read(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        viewer.get_behaviour_object(behaviour, slot)
    }

    fn read_range(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        viewer.get_behaviour_objects_range(behaviour, slot)
    }

    fn write(editor: &dyn BehaviourEditor, behaviour: HostHandle, slot: &str, item: HostHandle) -> HostResult<()> {
        editor.set_behaviour_object(behaviour, slot, item)
    }
}

impl RefKind for ObjectSlot {
    const NULL: HostHandle = HostHandle::null(HostClass::Object);
}

impl SlotKind for ReferenceSlot {
    const SCALAR: PropertyKind = PropertyKind::Reference;
    const RANGE: RangeKind = RangeKind::Reference;
    const TARGET: FacadeKind = FacadeKind::Behaviour;
    type Element = RefProperty<Self>;

    fn element(slot: PropertySlot) -> Self::Element {
        RefProperty::new(slot)
    }

    fn read(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        viewer.get_behaviour_reference(behaviour, slot)
    }

    fn read_range(viewer: &dyn BehaviourViewer, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        viewer.get_behaviour_reference_range(behaviour, slot)
    }

    fn write(editor: &dyn BehaviourEditor, behaviour: HostHandle, slot: &str, item: HostHandle) -> HostResult<()> {
        editor.set_behaviour_reference(behaviour, slot, item)
    }
}

impl RefKind for ReferenceSlot {
    const NULL: HostHandle = HostHandle::null(HostClass::Behaviour);
}

// ============================================================================
// Property
// ============================================================================

/// A property facade of whatever kind the slot was classified as
#[derive(Debug, Clone)]
pub enum Property {
    Data(DataProperty),
    DataRange(DataRangeProperty),
    Setting(SettingProperty),
    SettingRange(SettingRangeProperty),
    ObjectRef(ObjectRefProperty),
    ObjectRefRange(ObjectRefRangeProperty),
    Reference(ReferenceProperty),
    ReferenceRange(ReferenceRangeProperty),
    String(StringProperty),
}

impl Property {
    /// Build the facade for a classified slot; `Unknown` slots have none
    pub(crate) fn for_kind(slot: PropertySlot, kind: PropertyKind) -> Option<Self> {
        let property = match kind {
            PropertyKind::Data => Self::Data(RecordProperty::new(slot)),
            PropertyKind::DataRange => Self::DataRange(RangeProperty::new(slot)),
            PropertyKind::Setting => Self::Setting(RecordProperty::new(slot)),
            PropertyKind::SettingRange => Self::SettingRange(RangeProperty::new(slot)),
            PropertyKind::ObjectRef => Self::ObjectRef(RefProperty::new(slot)),
            PropertyKind::ObjectRefRange => Self::ObjectRefRange(RangeProperty::new(slot)),
            PropertyKind::Reference => Self::Reference(RefProperty::new(slot)),
            PropertyKind::ReferenceRange => Self::ReferenceRange(RangeProperty::new(slot)),
            PropertyKind::BehaviourString => Self::String(StringProperty::new(slot)),
            PropertyKind::Unknown => return None,
        };
        Some(property)
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Data(_) => PropertyKind::Data,
            Self::DataRange(_) => PropertyKind::DataRange,
            Self::Setting(_) => PropertyKind::Setting,
            Self::SettingRange(_) => PropertyKind::SettingRange,
            Self::ObjectRef(_) => PropertyKind::ObjectRef,
            Self::ObjectRefRange(_) => PropertyKind::ObjectRefRange,
            Self::Reference(_) => PropertyKind::Reference,
            Self::ReferenceRange(_) => PropertyKind::ReferenceRange,
            Self::String(_) => PropertyKind::BehaviourString,
        }
    }

    pub fn slot(&self) -> &PropertySlot {
        match self {
            Self::Data(p) => p.slot(),
            Self::DataRange(p) => p.slot(),
            Self::Setting(p) => p.slot(),
            Self::SettingRange(p) => p.slot(),
            Self::ObjectRef(p) => p.slot(),
            Self::ObjectRefRange(p) => p.slot(),
            Self::Reference(p) => p.slot(),
            Self::ReferenceRange(p) => p.slot(),
            Self::String(p) => p.slot(),
        }
    }

    /// Slot name
    pub fn name(&self) -> &str {
        self.slot().name()
    }
}

/// Conversion from a classified [`Property`] into one concrete facade type
pub trait FromProperty: Sized {
    /// The kind this facade type serves
    const KIND: PropertyKind;

    /// Take the facade out, or hand the property back when the kind differs
    fn from_property(property: Property) -> Result<Self, Property>;
}

macro_rules! from_property {
    ($ty:ty, $variant:ident) => {
        impl FromProperty for $ty {
            const KIND: PropertyKind = PropertyKind::$variant;

            fn from_property(property: Property) -> Result<Self, Property> {
                match property {
                    Property::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

from_property!(DataProperty, Data);
from_property!(DataRangeProperty, DataRange);
from_property!(SettingProperty, Setting);
from_property!(SettingRangeProperty, SettingRange);
from_property!(ObjectRefProperty, ObjectRef);
from_property!(ObjectRefRangeProperty, ObjectRefRange);
from_property!(ReferenceProperty, Reference);
from_property!(ReferenceRangeProperty, ReferenceRange);

impl FromProperty for StringProperty {
    const KIND: PropertyKind = PropertyKind::BehaviourString;

    fn from_property(property: Property) -> Result<Self, Property> {
        match property {
            Property::String(inner) => Ok(inner),
            other => Err(other),
        }
    }
}
