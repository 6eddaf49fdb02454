//! Behaviour facades and slot classification
//!
//! A behaviour exposes named slots, but the host does not always say what
//! a slot holds. The property table answers that once per facade: from the
//! host's schema when it publishes one, otherwise by probing each slot with
//! the typed getters in [`PropertyKind::PROBE_ORDER`] and keeping the first
//! one that answers. The table is never rebuilt for the life of the facade.
//!
//! ```text
//! slot "stiffness"
//!   get_behaviour_data          ✗
//!   get_behaviour_data_range    ✗
//!   get_behaviour_setting       ✓  ──► PropertyKind::Setting
//! ```

use crate::error::{FacadeError, FacadeResult};
use crate::facade::{facade_identity, Facade, FacadeCore};
use crate::object::ObjectFacade;
use crate::property::{
    DataProperty, DataRangeProperty, FromProperty, ObjectRefProperty, ObjectRefRangeProperty,
    Property, PropertySlot, ReferenceProperty, ReferenceRangeProperty, SettingProperty,
    SettingRangeProperty, StringProperty,
};
use crate::registry::FacadeKind;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;
use void_host::{BehaviourViewer, HostError, HostHandle, HostResult, PropertyKind};

// ============================================================================
// Property table
// ============================================================================

/// Where a property table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    /// Published by the host
    Schema,
    /// Built by probing the typed getters
    Probed,
}

/// Slot name to kind, in host order
#[derive(Debug, Clone)]
pub struct PropertyTable {
    slots: Vec<(String, PropertyKind)>,
    source: TableSource,
}

impl PropertyTable {
    pub fn source(&self) -> TableSource {
        self.source
    }

    /// Kind of a slot, `None` if the host never reported it
    pub fn kind(&self, slot: &str) -> Option<PropertyKind> {
        self.slots
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, kind)| *kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PropertyKind)> {
        self.slots.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Every getter refused the slot
#[derive(Debug, Clone)]
pub struct ProbeFailure {
    pub slot: String,
    /// The error each getter returned, in probe order
    pub attempts: Vec<(PropertyKind, HostError)>,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slot '{}' answered none of {} getters",
            self.slot,
            self.attempts.len()
        )
    }
}

fn try_getter(
    viewer: &dyn BehaviourViewer,
    behaviour: HostHandle,
    slot: &str,
    kind: PropertyKind,
) -> HostResult<()> {
    match kind {
        PropertyKind::Data => viewer.get_behaviour_data(behaviour, slot).map(drop),
        PropertyKind::DataRange => viewer.get_behaviour_data_range(behaviour, slot).map(drop),
        PropertyKind::Setting => viewer.get_behaviour_setting(behaviour, slot).map(drop),
        PropertyKind::SettingRange => viewer.get_behaviour_settings_range(behaviour, slot).map(drop),
        PropertyKind::ObjectRef => viewer.get_behaviour_object(behaviour, slot).map(drop),
        PropertyKind::ObjectRefRange => viewer.get_behaviour_objects_range(behaviour, slot).map(drop),
        PropertyKind::Reference => viewer.get_behaviour_reference(behaviour, slot).map(drop),
        PropertyKind::ReferenceRange => viewer.get_behaviour_reference_range(behaviour, slot).map(drop),
        PropertyKind::BehaviourString => viewer.get_behaviour_string(behaviour, slot).map(drop),
        PropertyKind::Unknown => Err(HostError::kind_mismatch(behaviour, slot, kind)),
    }
}

/// Classify one slot by trying each getter in probe order
pub fn probe_slot(
    viewer: &dyn BehaviourViewer,
    behaviour: HostHandle,
    slot: &str,
) -> Result<PropertyKind, ProbeFailure> {
    let mut attempts = Vec::new();
    for kind in PropertyKind::PROBE_ORDER {
        match try_getter(viewer, behaviour, slot, kind) {
            Ok(()) => return Ok(kind),
            Err(err) => attempts.push((kind, err)),
        }
    }
    Err(ProbeFailure {
        slot: slot.to_string(),
        attempts,
    })
}

// ============================================================================
// Behaviour facade
// ============================================================================

/// Facade over one behaviour attached to a scene object
#[derive(Clone)]
pub struct BehaviourFacade {
    core: Rc<FacadeCore>,
    owner: Option<HostHandle>,
    table: Rc<OnceCell<PropertyTable>>,
}

impl BehaviourFacade {
    pub(crate) fn from_core(core: Rc<FacadeCore>, owner: Option<HostHandle>) -> Self {
        Self {
            core,
            owner,
            table: Rc::new(OnceCell::new()),
        }
    }

    /// Facade for a behaviour listed on `object`, with its table built up front
    pub(crate) fn attached(object: &ObjectFacade, handle: HostHandle) -> FacadeResult<Self> {
        let core = object
            .scene()
            .core(handle, FacadeKind::Behaviour, Some(object.core()));
        let behaviour = Self::from_core(core, Some(object.handle()));
        behaviour.property_table()?;
        Ok(behaviour)
    }

    /// Type name of the behaviour
    pub fn name(&self) -> FacadeResult<String> {
        Ok(self.scene().behaviour_viewer().get_behaviour_name(self.handle())?)
    }

    /// The object the behaviour is attached to
    pub fn owner(&self) -> FacadeResult<ObjectFacade> {
        let handle = match self.owner {
            Some(owner) => owner,
            None => self
                .scene()
                .behaviour_viewer()
                .get_behaviour_owner(self.handle())?,
        };
        Ok(self.scene().object(handle))
    }

    /// Whether the slot table has been built
    pub fn is_classified(&self) -> bool {
        self.table.get().is_some()
    }

    /// The slot table, built on first use
    pub fn property_table(&self) -> FacadeResult<&PropertyTable> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = self.build_table()?;
        Ok(self.table.get_or_init(|| table))
    }

    fn build_table(&self) -> FacadeResult<PropertyTable> {
        let viewer = self.scene().behaviour_viewer();
        let handle = self.handle();

        if self.scene().config().prefer_schema {
            if let Some(slots) = viewer.get_behaviour_schema(handle)? {
                log::debug!("Classified {} slots of {} from schema", slots.len(), handle);
                return Ok(PropertyTable {
                    slots,
                    source: TableSource::Schema,
                });
            }
        }

        let slots: Vec<_> = viewer
            .get_property_names(handle)?
            .into_iter()
            .map(|slot| match probe_slot(viewer, handle, &slot) {
                Ok(kind) => (slot, kind),
                Err(failure) => {
                    log::debug!("Unknown slot on {}: {}", handle, failure);
                    (slot, PropertyKind::Unknown)
                }
            })
            .collect();
        log::debug!("Classified {} slots of {} by probing", slots.len(), handle);
        Ok(PropertyTable {
            slots,
            source: TableSource::Probed,
        })
    }

    /// Kind of a slot; `None` if the host does not list it
    pub fn property_kind(&self, slot: &str) -> FacadeResult<Option<PropertyKind>> {
        Ok(self.property_table()?.kind(slot))
    }

    /// Slot names, in host order
    pub fn property_names(&self) -> FacadeResult<Vec<String>> {
        Ok(self.property_table()?.names().map(str::to_string).collect())
    }

    /// The property facade for a slot.
    ///
    /// Unknown and unlisted slots yield `None`, or `PropertyNotFound` when
    /// the scene is configured with strict properties.
    pub fn property(&self, slot: &str) -> FacadeResult<Option<Property>> {
        let kind = self.property_kind(slot)?.unwrap_or(PropertyKind::Unknown);
        match Property::for_kind(PropertySlot::new(self, slot), kind) {
            Some(property) => Ok(Some(property)),
            None if self.scene().config().strict_properties => Err(self.not_found(slot)),
            None => Ok(None),
        }
    }

    /// The property facade for a slot, as a specific facade type
    pub fn typed_property<P: FromProperty>(&self, slot: &str) -> FacadeResult<P> {
        let property = self.property(slot)?.ok_or_else(|| self.not_found(slot))?;
        P::from_property(property).map_err(|other| FacadeError::WrongPropertyKind {
            slot: slot.to_string(),
            expected: P::KIND,
            actual: other.kind(),
        })
    }

    fn not_found(&self, slot: &str) -> FacadeError {
        FacadeError::PropertyNotFound {
            behaviour: self.name().unwrap_or_else(|_| self.handle().to_string()),
            slot: slot.to_string(),
        }
    }

    pub fn data(&self, slot: &str) -> FacadeResult<DataProperty> {
        self.typed_property(slot)
    }

    pub fn data_range(&self, slot: &str) -> FacadeResult<DataRangeProperty> {
        self.typed_property(slot)
    }

    pub fn setting(&self, slot: &str) -> FacadeResult<SettingProperty> {
        self.typed_property(slot)
    }

    pub fn setting_range(&self, slot: &str) -> FacadeResult<SettingRangeProperty> {
        self.typed_property(slot)
    }

    pub fn object_ref(&self, slot: &str) -> FacadeResult<ObjectRefProperty> {
        self.typed_property(slot)
    }

    pub fn object_ref_range(&self, slot: &str) -> FacadeResult<ObjectRefRangeProperty> {
        self.typed_property(slot)
    }

    pub fn reference(&self, slot: &str) -> FacadeResult<ReferenceProperty> {
        self.typed_property(slot)
    }

    pub fn reference_range(&self, slot: &str) -> FacadeResult<ReferenceRangeProperty> {
        self.typed_property(slot)
    }

    pub fn string(&self, slot: &str) -> FacadeResult<StringProperty> {
        self.typed_property(slot)
    }
}

impl Facade for BehaviourFacade {
    fn core(&self) -> &Rc<FacadeCore> {
        &self.core
    }
}

facade_identity!(BehaviourFacade);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FacadeConfig;
    use crate::registry::WrapperRegistry;
    use crate::scene::SceneFacade;
    use void_host::{HostValue, MemoryHost};

    fn rig(config: FacadeConfig) -> (MemoryHost, SceneFacade, HostHandle) {
        let host = MemoryHost::new();
        host.define_behaviour(
            "Spring",
            &[
                ("rest_length", PropertyKind::Data),
                ("stiffness", PropertyKind::Setting),
                ("anchor", PropertyKind::ObjectRef),
                ("label", PropertyKind::BehaviourString),
                ("cache", PropertyKind::Unknown),
            ],
        );
        let object = host.create_object("Hip");
        let behaviour = host.attach_behaviour(object, "Spring").unwrap();
        let scene = SceneFacade::open(Rc::new(host.clone()), WrapperRegistry::standard(), config);
        (host, scene, behaviour)
    }

    #[test]
    fn test_probe_classifies_in_order() {
        let (host, _, behaviour) = rig(FacadeConfig::default());
        assert_eq!(probe_slot(&host, behaviour, "rest_length").unwrap(), PropertyKind::Data);
        assert_eq!(probe_slot(&host, behaviour, "stiffness").unwrap(), PropertyKind::Setting);
        assert_eq!(probe_slot(&host, behaviour, "label").unwrap(), PropertyKind::BehaviourString);

        let failure = probe_slot(&host, behaviour, "cache").unwrap_err();
        assert_eq!(failure.attempts.len(), PropertyKind::PROBE_ORDER.len());
        assert_eq!(failure.attempts[0].0, PropertyKind::Data);
    }

    #[test]
    fn test_table_is_built_once() {
        let (host, scene, handle) = rig(FacadeConfig::default());
        let behaviour = scene.behaviour(handle);
        assert!(!behaviour.is_classified());

        assert!(behaviour.property("stiffness").unwrap().is_some());
        let reads = host.total_slot_reads();
        assert!(reads > 0);
        assert_eq!(behaviour.property_table().unwrap().source(), TableSource::Probed);

        for _ in 0..3 {
            behaviour.property("stiffness").unwrap();
            behaviour.property_kind("anchor").unwrap();
        }
        assert_eq!(host.total_slot_reads(), reads);
    }

    #[test]
    fn test_schema_skips_probing() {
        let (host, scene, handle) = rig(FacadeConfig::default());
        host.set_schema_enabled(true);
        let behaviour = scene.behaviour(handle);

        assert_eq!(behaviour.property_kind("anchor").unwrap(), Some(PropertyKind::ObjectRef));
        assert_eq!(behaviour.property_table().unwrap().source(), TableSource::Schema);
        assert_eq!(host.total_slot_reads(), 0);
    }

    #[test]
    fn test_unknown_slot_is_none_unless_strict() {
        let (_, scene, handle) = rig(FacadeConfig::default());
        let behaviour = scene.behaviour(handle);
        assert_eq!(behaviour.property_kind("cache").unwrap(), Some(PropertyKind::Unknown));
        assert!(behaviour.property("cache").unwrap().is_none());
        assert!(behaviour.property("missing").unwrap().is_none());

        let (_, strict, handle) = rig(FacadeConfig::strict());
        let behaviour = strict.behaviour(handle);
        assert!(matches!(
            behaviour.property("cache"),
            Err(FacadeError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn test_typed_property_checks_kind() {
        let (_, scene, handle) = rig(FacadeConfig::default());
        let behaviour = scene.behaviour(handle);

        behaviour.setting("stiffness").unwrap().set(120.0, None).unwrap();
        assert_eq!(
            behaviour.setting("stiffness").unwrap().get(None).unwrap(),
            HostValue::Float(120.0)
        );

        match behaviour.data("stiffness") {
            Err(FacadeError::WrongPropertyKind { expected, actual, .. }) => {
                assert_eq!(expected, PropertyKind::Data);
                assert_eq!(actual, PropertyKind::Setting);
            }
            other => panic!("expected a kind error, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(
            behaviour.string("missing"),
            Err(FacadeError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn test_owner_resolves_without_creator() {
        let (host, scene, handle) = rig(FacadeConfig::default());
        let owner = scene.behaviour(handle).owner().unwrap();
        assert_eq!(owner.name().unwrap(), "Hip");
        assert_eq!(owner, host.get_behaviour_owner(handle).unwrap());
    }
}
