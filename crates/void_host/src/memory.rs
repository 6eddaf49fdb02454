//! In-memory host model
//!
//! `MemoryHost` implements every viewer and editor over plain maps. It
//! follows the same rules a real host enforces: one transaction at a time,
//! editors that stop working once their transaction closes, getters that
//! only answer for the slot kind they were written for.
//!
//! The inherent methods (`create_object`, `attach_behaviour`, ...) change
//! the model directly, without a transaction, the way another tool sharing
//! the scene would. Tests use them to set up scenes and to change the model
//! behind a facade's back.

use crate::error::{HostError, HostResult};
use crate::handle::{HostClass, HostHandle};
use crate::kind::{PropertyKind, RangeKind};
use crate::model::{
    BehaviourEditor, BehaviourViewer, DataEditor, DataViewer, Frame, HostEditors, HostModel,
    LayersEditor, LayersViewer, ModelEditor, ModelViewer, Session, Updater,
};
use crate::value::HostValue;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

/// Contents of one behaviour slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Data(HostHandle),
    DataRange(Vec<HostHandle>),
    Setting(HostHandle),
    SettingRange(Vec<HostHandle>),
    Object(HostHandle),
    ObjectRange(Vec<HostHandle>),
    Reference(HostHandle),
    ReferenceRange(Vec<HostHandle>),
    String(String),
    /// A slot the host lists but exposes through none of its getters
    Opaque,
}

impl SlotValue {
    /// The kind a getter must ask for to read this slot
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Data(_) => PropertyKind::Data,
            Self::DataRange(_) => PropertyKind::DataRange,
            Self::Setting(_) => PropertyKind::Setting,
            Self::SettingRange(_) => PropertyKind::SettingRange,
            Self::Object(_) => PropertyKind::ObjectRef,
            Self::ObjectRange(_) => PropertyKind::ObjectRefRange,
            Self::Reference(_) => PropertyKind::Reference,
            Self::ReferenceRange(_) => PropertyKind::ReferenceRange,
            Self::String(_) => PropertyKind::BehaviourString,
            Self::Opaque => PropertyKind::Unknown,
        }
    }

    fn single(&self, kind: PropertyKind) -> Option<HostHandle> {
        match (self, kind) {
            (Self::Data(h), PropertyKind::Data)
            | (Self::Setting(h), PropertyKind::Setting)
            | (Self::Object(h), PropertyKind::ObjectRef)
            | (Self::Reference(h), PropertyKind::Reference) => Some(*h),
            _ => None,
        }
    }

    fn single_mut(&mut self, kind: PropertyKind) -> Option<&mut HostHandle> {
        match (self, kind) {
            (Self::Data(h), PropertyKind::Data)
            | (Self::Setting(h), PropertyKind::Setting)
            | (Self::Object(h), PropertyKind::ObjectRef)
            | (Self::Reference(h), PropertyKind::Reference) => Some(h),
            _ => None,
        }
    }

    fn many(&self, kind: PropertyKind) -> Option<&[HostHandle]> {
        match (self, kind) {
            (Self::DataRange(v), PropertyKind::DataRange)
            | (Self::SettingRange(v), PropertyKind::SettingRange)
            | (Self::ObjectRange(v), PropertyKind::ObjectRefRange)
            | (Self::ReferenceRange(v), PropertyKind::ReferenceRange) => Some(v),
            _ => None,
        }
    }

    fn many_mut(&mut self, kind: RangeKind) -> Option<&mut Vec<HostHandle>> {
        match (self, kind) {
            (Self::DataRange(v), RangeKind::Data)
            | (Self::SettingRange(v), RangeKind::Setting)
            | (Self::ObjectRange(v), RangeKind::Object)
            | (Self::ReferenceRange(v), RangeKind::Reference) => Some(v),
            _ => None,
        }
    }
}

struct ObjectNode {
    name: String,
    behaviours: Vec<HostHandle>,
    generation: u64,
}

struct BehaviourNode {
    name: String,
    owner: HostHandle,
    slots: Vec<(String, SlotValue)>,
}

struct Record {
    value: HostValue,
    animated: bool,
    keys: BTreeMap<Frame, HostValue>,
}

struct LayerNode {
    name: String,
    objects: Vec<HostHandle>,
}

#[derive(Default)]
struct MemoryState {
    next_raw: u64,
    objects: Vec<HostHandle>,
    object_nodes: HashMap<HostHandle, ObjectNode>,
    behaviours: HashMap<HostHandle, BehaviourNode>,
    records: HashMap<HostHandle, Record>,
    layers: Vec<HostHandle>,
    layer_nodes: HashMap<HostHandle, LayerNode>,
    types: HashMap<String, Vec<(String, PropertyKind)>>,
    current_frame: Frame,
    open: Option<u64>,
    next_serial: u64,
    locked: bool,
    schema_enabled: bool,
    updates: usize,
    commits: usize,
    undo_log: Vec<String>,
    slot_reads: HashMap<(HostHandle, String), usize>,
}

impl MemoryState {
    fn alloc(&mut self, class: HostClass) -> HostHandle {
        self.next_raw += 1;
        HostHandle::new(class, self.next_raw)
    }

    /// The stored handle a guid names. Raw ids are unique across classes.
    fn canonical(&self, handle: HostHandle) -> HostHandle {
        if handle.class() != HostClass::Guid {
            return handle;
        }
        self.object_nodes
            .keys()
            .chain(self.behaviours.keys())
            .chain(self.records.keys())
            .chain(self.layer_nodes.keys())
            .find(|stored| stored.raw() == handle.raw())
            .copied()
            .unwrap_or(handle)
    }

    fn object(&self, object: HostHandle) -> HostResult<&ObjectNode> {
        self.object_nodes
            .get(&self.canonical(object))
            .ok_or(HostError::InvalidHandle(object))
    }

    fn object_mut(&mut self, object: HostHandle) -> HostResult<&mut ObjectNode> {
        let key = self.canonical(object);
        self.object_nodes
            .get_mut(&key)
            .ok_or(HostError::InvalidHandle(object))
    }

    fn behaviour(&self, behaviour: HostHandle) -> HostResult<&BehaviourNode> {
        self.behaviours
            .get(&self.canonical(behaviour))
            .ok_or(HostError::InvalidHandle(behaviour))
    }

    fn behaviour_mut(&mut self, behaviour: HostHandle) -> HostResult<&mut BehaviourNode> {
        let key = self.canonical(behaviour);
        self.behaviours
            .get_mut(&key)
            .ok_or(HostError::InvalidHandle(behaviour))
    }

    fn record(&self, record: HostHandle) -> HostResult<&Record> {
        self.records
            .get(&self.canonical(record))
            .ok_or(HostError::InvalidHandle(record))
    }

    fn record_mut(&mut self, record: HostHandle) -> HostResult<&mut Record> {
        let key = self.canonical(record);
        self.records
            .get_mut(&key)
            .ok_or(HostError::InvalidHandle(record))
    }

    fn layer(&self, layer: HostHandle) -> HostResult<&LayerNode> {
        self.layer_nodes
            .get(&self.canonical(layer))
            .ok_or(HostError::InvalidHandle(layer))
    }

    fn layer_mut(&mut self, layer: HostHandle) -> HostResult<&mut LayerNode> {
        let key = self.canonical(layer);
        self.layer_nodes
            .get_mut(&key)
            .ok_or(HostError::InvalidHandle(layer))
    }

    fn create_object(&mut self, name: &str) -> HostHandle {
        let handle = self.alloc(HostClass::Object);
        self.objects.push(handle);
        self.object_nodes.insert(
            handle,
            ObjectNode {
                name: name.to_string(),
                behaviours: Vec::new(),
                generation: 0,
            },
        );
        handle
    }

    fn create_record(&mut self, class: HostClass, value: HostValue) -> HostHandle {
        let handle = self.alloc(class);
        self.records.insert(
            handle,
            Record {
                value,
                animated: false,
                keys: BTreeMap::new(),
            },
        );
        handle
    }

    fn create_layer(&mut self, name: &str) -> HostHandle {
        let handle = self.alloc(HostClass::Layer);
        self.layers.push(handle);
        self.layer_nodes.insert(
            handle,
            LayerNode {
                name: name.to_string(),
                objects: Vec::new(),
            },
        );
        handle
    }

    fn default_slot(&mut self, kind: PropertyKind) -> SlotValue {
        match kind {
            PropertyKind::Data => SlotValue::Data(self.create_record(HostClass::Data, HostValue::Null)),
            PropertyKind::DataRange => SlotValue::DataRange(Vec::new()),
            PropertyKind::Setting => {
                SlotValue::Setting(self.create_record(HostClass::Setting, HostValue::Null))
            }
            PropertyKind::SettingRange => SlotValue::SettingRange(Vec::new()),
            PropertyKind::ObjectRef => SlotValue::Object(HostHandle::null(HostClass::Object)),
            PropertyKind::ObjectRefRange => SlotValue::ObjectRange(Vec::new()),
            PropertyKind::Reference => SlotValue::Reference(HostHandle::null(HostClass::Behaviour)),
            PropertyKind::ReferenceRange => SlotValue::ReferenceRange(Vec::new()),
            PropertyKind::BehaviourString => SlotValue::String(String::new()),
            PropertyKind::Unknown => SlotValue::Opaque,
        }
    }

    fn attach_behaviour(&mut self, object: HostHandle, name: &str) -> HostResult<HostHandle> {
        self.object(object)?;
        // Unknown type names attach with no slots
        let layout = self.types.get(name).cloned().unwrap_or_default();
        let slots = layout
            .into_iter()
            .map(|(slot, kind)| (slot, self.default_slot(kind)))
            .collect();

        let handle = self.alloc(HostClass::Behaviour);
        self.behaviours.insert(
            handle,
            BehaviourNode {
                name: name.to_string(),
                owner: object,
                slots,
            },
        );
        let node = self.object_mut(object)?;
        node.behaviours.push(handle);
        node.generation += 1;
        Ok(handle)
    }

    fn detach_behaviour(&mut self, behaviour: HostHandle) -> HostResult<()> {
        let behaviour = self.canonical(behaviour);
        let node = self
            .behaviours
            .remove(&behaviour)
            .ok_or(HostError::InvalidHandle(behaviour))?;
        let owner = self.object_mut(node.owner)?;
        owner.behaviours.retain(|b| *b != behaviour);
        owner.generation += 1;
        Ok(())
    }

    fn slot(&self, behaviour: HostHandle, slot: &str) -> HostResult<&SlotValue> {
        self.behaviour(behaviour)?
            .slots
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, value)| value)
            .ok_or_else(|| HostError::SlotNotFound {
                behaviour,
                slot: slot.to_string(),
            })
    }

    fn slot_mut(&mut self, behaviour: HostHandle, slot: &str) -> HostResult<&mut SlotValue> {
        self.behaviour_mut(behaviour)?
            .slots
            .iter_mut()
            .find(|(name, _)| name == slot)
            .map(|(_, value)| value)
            .ok_or_else(|| HostError::SlotNotFound {
                behaviour,
                slot: slot.to_string(),
            })
    }

    fn count_read(&mut self, behaviour: HostHandle, slot: &str) {
        let behaviour = self.canonical(behaviour);
        *self
            .slot_reads
            .entry((behaviour, slot.to_string()))
            .or_insert(0) += 1;
    }

    fn read_single(&mut self, behaviour: HostHandle, slot: &str, kind: PropertyKind) -> HostResult<HostHandle> {
        self.count_read(behaviour, slot);
        self.slot(behaviour, slot)?
            .single(kind)
            .ok_or_else(|| HostError::kind_mismatch(behaviour, slot, kind))
    }

    fn read_many(&mut self, behaviour: HostHandle, slot: &str, kind: PropertyKind) -> HostResult<Vec<HostHandle>> {
        self.count_read(behaviour, slot);
        self.slot(behaviour, slot)?
            .many(kind)
            .map(<[HostHandle]>::to_vec)
            .ok_or_else(|| HostError::kind_mismatch(behaviour, slot, kind))
    }

    /// Validate a slot target and return the handle to store
    fn check_target(&self, kind: PropertyKind, target: HostHandle) -> HostResult<HostHandle> {
        if target.is_null() {
            return match kind {
                PropertyKind::ObjectRef | PropertyKind::Reference => Ok(target),
                _ => Err(HostError::InvalidHandle(target)),
            };
        }
        let target = self.canonical(target);
        let live = match kind {
            PropertyKind::Data | PropertyKind::DataRange => {
                target.class() == HostClass::Data && self.records.contains_key(&target)
            }
            PropertyKind::Setting | PropertyKind::SettingRange => {
                target.class() == HostClass::Setting && self.records.contains_key(&target)
            }
            PropertyKind::ObjectRef | PropertyKind::ObjectRefRange => {
                self.object_nodes.contains_key(&target)
            }
            PropertyKind::Reference | PropertyKind::ReferenceRange => {
                self.behaviours.contains_key(&target)
            }
            PropertyKind::BehaviourString | PropertyKind::Unknown => false,
        };
        if live {
            Ok(target)
        } else {
            Err(HostError::InvalidHandle(target))
        }
    }

    fn assign_single(
        &mut self,
        behaviour: HostHandle,
        slot: &str,
        kind: PropertyKind,
        target: HostHandle,
    ) -> HostResult<()> {
        let target = self.check_target(kind, target)?;
        let cell = self
            .slot_mut(behaviour, slot)?
            .single_mut(kind)
            .ok_or_else(|| HostError::kind_mismatch(behaviour, slot, kind))?;
        *cell = target;
        Ok(())
    }

    fn record_value(&self, record: HostHandle, frame: Option<Frame>) -> HostResult<HostValue> {
        let record = self.record(record)?;
        let keyed = match (record.animated, frame) {
            (true, Some(frame)) => record.keys.range(..=frame).next_back().map(|(_, v)| v.clone()),
            _ => None,
        };
        Ok(keyed.unwrap_or_else(|| record.value.clone()))
    }

    fn set_record_value(&mut self, record: HostHandle, value: HostValue, frame: Option<Frame>) -> HostResult<()> {
        let record = self.record_mut(record)?;
        match (record.animated, frame) {
            (true, Some(frame)) => {
                record.keys.insert(frame, value);
            }
            _ => record.value = value,
        }
        Ok(())
    }
}

/// An in-memory host model
///
/// Cloning shares the same scene.
#[derive(Clone, Default)]
pub struct MemoryHost {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryHost {
    /// Handle of the single scene a `MemoryHost` holds
    pub const SCENE: HostHandle = HostHandle::new(HostClass::Scene, 0);

    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the slot layout for behaviours of type `name`
    pub fn define_behaviour(&self, name: &str, slots: &[(&str, PropertyKind)]) {
        let layout = slots
            .iter()
            .map(|(slot, kind)| (slot.to_string(), *kind))
            .collect();
        self.state.write().types.insert(name.to_string(), layout);
    }

    /// Create an object node
    pub fn create_object(&self, name: &str) -> HostHandle {
        self.state.write().create_object(name)
    }

    /// Attach a behaviour of type `name`, laid out from its definition
    pub fn attach_behaviour(&self, object: HostHandle, name: &str) -> HostResult<HostHandle> {
        self.state.write().attach_behaviour(object, name)
    }

    /// Remove a behaviour from its object
    pub fn detach_behaviour(&self, behaviour: HostHandle) -> HostResult<()> {
        self.state.write().detach_behaviour(behaviour)
    }

    /// Create a data or setting record
    pub fn create_record(&self, class: HostClass, value: impl Into<HostValue>) -> HostHandle {
        self.state.write().create_record(class, value.into())
    }

    /// Mark a record static or animated
    pub fn set_record_animated(&self, record: HostHandle, animated: bool) -> HostResult<()> {
        self.state.write().record_mut(record)?.animated = animated;
        Ok(())
    }

    /// Write a record value directly
    pub fn set_record_value(
        &self,
        record: HostHandle,
        value: impl Into<HostValue>,
        frame: Option<Frame>,
    ) -> HostResult<()> {
        self.state.write().set_record_value(record, value.into(), frame)
    }

    /// Insert or replace a slot on a behaviour
    pub fn set_slot(&self, behaviour: HostHandle, slot: &str, value: SlotValue) -> HostResult<()> {
        let mut state = self.state.write();
        let node = state.behaviour_mut(behaviour)?;
        match node.slots.iter_mut().find(|(name, _)| name == slot) {
            Some((_, existing)) => *existing = value,
            None => node.slots.push((slot.to_string(), value)),
        }
        Ok(())
    }

    /// Create a layer
    pub fn create_layer(&self, name: &str) -> HostHandle {
        self.state.write().create_layer(name)
    }

    /// Move the scene's current frame
    pub fn set_current_frame(&self, frame: Frame) {
        self.state.write().current_frame = frame;
    }

    /// Refuse every transaction while locked
    pub fn set_locked(&self, locked: bool) {
        self.state.write().locked = locked;
    }

    /// Publish slot schemas through [`BehaviourViewer::get_behaviour_schema`]
    pub fn set_schema_enabled(&self, enabled: bool) {
        self.state.write().schema_enabled = enabled;
    }

    /// Whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.state.read().open.is_some()
    }

    /// Number of `generate_update` calls so far
    pub fn update_count(&self) -> usize {
        self.state.read().updates
    }

    /// Number of committed transactions
    pub fn commit_count(&self) -> usize {
        self.state.read().commits
    }

    /// Titles of committed transactions, oldest first
    pub fn undo_log(&self) -> Vec<String> {
        self.state.read().undo_log.clone()
    }

    /// How many slot getters have been called for one slot
    pub fn slot_reads(&self, behaviour: HostHandle, slot: &str) -> usize {
        let state = self.state.read();
        state
            .slot_reads
            .get(&(state.canonical(behaviour), slot.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// How many slot getters have been called in total
    pub fn total_slot_reads(&self) -> usize {
        self.state.read().slot_reads.values().sum()
    }
}

impl ModelViewer for MemoryHost {
    fn scene_handle(&self) -> HostHandle {
        Self::SCENE
    }

    fn get_objects(&self) -> HostResult<Vec<HostHandle>> {
        Ok(self.state.read().objects.clone())
    }

    fn get_object_name(&self, object: HostHandle) -> HostResult<String> {
        Ok(self.state.read().object(object)?.name.clone())
    }

    fn get_behaviours(&self, object: HostHandle) -> HostResult<Vec<HostHandle>> {
        Ok(self.state.read().object(object)?.behaviours.clone())
    }

    fn get_behaviour_generation(&self, object: HostHandle) -> HostResult<u64> {
        Ok(self.state.read().object(object)?.generation)
    }

    fn get_current_frame(&self) -> HostResult<Frame> {
        Ok(self.state.read().current_frame)
    }
}

impl BehaviourViewer for MemoryHost {
    fn get_behaviour_name(&self, behaviour: HostHandle) -> HostResult<String> {
        Ok(self.state.read().behaviour(behaviour)?.name.clone())
    }

    fn get_behaviour_owner(&self, behaviour: HostHandle) -> HostResult<HostHandle> {
        Ok(self.state.read().behaviour(behaviour)?.owner)
    }

    fn get_property_names(&self, behaviour: HostHandle) -> HostResult<Vec<String>> {
        let state = self.state.read();
        Ok(state
            .behaviour(behaviour)?
            .slots
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn get_behaviour_schema(
        &self,
        behaviour: HostHandle,
    ) -> HostResult<Option<Vec<(String, PropertyKind)>>> {
        let state = self.state.read();
        let node = state.behaviour(behaviour)?;
        if !state.schema_enabled {
            return Ok(None);
        }
        Ok(Some(
            node.slots
                .iter()
                .map(|(name, value)| (name.clone(), value.kind()))
                .collect(),
        ))
    }

    fn get_behaviour_data(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        self.state.write().read_single(behaviour, slot, PropertyKind::Data)
    }

    fn get_behaviour_data_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        self.state.write().read_many(behaviour, slot, PropertyKind::DataRange)
    }

    fn get_behaviour_setting(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        self.state.write().read_single(behaviour, slot, PropertyKind::Setting)
    }

    fn get_behaviour_settings_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        self.state.write().read_many(behaviour, slot, PropertyKind::SettingRange)
    }

    fn get_behaviour_object(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        self.state.write().read_single(behaviour, slot, PropertyKind::ObjectRef)
    }

    fn get_behaviour_objects_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        self.state.write().read_many(behaviour, slot, PropertyKind::ObjectRefRange)
    }

    fn get_behaviour_reference(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle> {
        self.state.write().read_single(behaviour, slot, PropertyKind::Reference)
    }

    fn get_behaviour_reference_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>> {
        self.state.write().read_many(behaviour, slot, PropertyKind::ReferenceRange)
    }

    fn get_behaviour_string(&self, behaviour: HostHandle, slot: &str) -> HostResult<String> {
        let mut state = self.state.write();
        state.count_read(behaviour, slot);
        match state.slot(behaviour, slot)? {
            SlotValue::String(value) => Ok(value.clone()),
            _ => Err(HostError::kind_mismatch(behaviour, slot, PropertyKind::BehaviourString)),
        }
    }
}

impl DataViewer for MemoryHost {
    fn get_data_value(&self, record: HostHandle, frame: Option<Frame>) -> HostResult<HostValue> {
        self.state.read().record_value(record, frame)
    }

    fn is_animated(&self, record: HostHandle) -> HostResult<bool> {
        Ok(self.state.read().record(record)?.animated)
    }
}

impl LayersViewer for MemoryHost {
    fn get_layers(&self) -> HostResult<Vec<HostHandle>> {
        Ok(self.state.read().layers.clone())
    }

    fn get_layer_name(&self, layer: HostHandle) -> HostResult<String> {
        Ok(self.state.read().layer(layer)?.name.clone())
    }

    fn get_layer_objects(&self, layer: HostHandle) -> HostResult<Vec<HostHandle>> {
        Ok(self.state.read().layer(layer)?.objects.clone())
    }
}

impl HostModel for MemoryHost {
    fn model_viewer(&self) -> &dyn ModelViewer {
        self
    }

    fn behaviour_viewer(&self) -> &dyn BehaviourViewer {
        self
    }

    fn data_viewer(&self) -> &dyn DataViewer {
        self
    }

    fn layers_viewer(&self) -> &dyn LayersViewer {
        self
    }

    fn transact(&self, title: &str, body: &mut dyn FnMut(HostEditors)) -> HostResult<()> {
        let serial = {
            let mut state = self.state.write();
            let reason = if state.locked {
                Some("scene is locked")
            } else if state.open.is_some() {
                Some("another transaction is in flight")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(HostError::TransactionRejected {
                    title: title.to_string(),
                    reason: reason.to_string(),
                });
            }
            state.next_serial += 1;
            let serial = state.next_serial;
            state.open = Some(serial);
            serial
        };
        log::debug!("Host transaction {} '{}' opened", serial, title);

        let close = CloseOnDrop { state: &self.state };
        let editor = Rc::new(MemoryEditor {
            state: self.state.clone(),
            serial,
            title: title.to_string(),
        });
        body(HostEditors::uniform(editor));
        drop(close);

        let mut state = self.state.write();
        state.commits += 1;
        state.undo_log.push(title.to_string());
        log::debug!("Host transaction {} '{}' committed", serial, title);
        Ok(())
    }
}

/// Closes the open transaction even if the body unwinds
struct CloseOnDrop<'a> {
    state: &'a RwLock<MemoryState>,
}

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.state.write().open = None;
    }
}

/// Editor set for one `MemoryHost` transaction
struct MemoryEditor {
    state: Arc<RwLock<MemoryState>>,
    serial: u64,
    title: String,
}

impl MemoryEditor {
    fn with_open<T>(&self, f: impl FnOnce(&mut MemoryState) -> HostResult<T>) -> HostResult<T> {
        let mut state = self.state.write();
        if state.open != Some(self.serial) {
            return Err(HostError::TransactionClosed);
        }
        f(&mut state)
    }
}

impl ModelEditor for MemoryEditor {
    fn create_object_node(&self, name: &str) -> HostResult<HostHandle> {
        self.with_open(|state| Ok(state.create_object(name)))
    }

    fn set_object_name(&self, object: HostHandle, name: &str) -> HostResult<()> {
        self.with_open(|state| {
            let node = state.object_mut(object)?;
            if name.trim().is_empty() {
                return Err(format!("Object '{}' cannot take an empty name", node.name).into());
            }
            node.name = name.to_string();
            Ok(())
        })
    }

    fn set_current_frame(&self, frame: Frame) -> HostResult<()> {
        self.with_open(|state| {
            state.current_frame = frame;
            Ok(())
        })
    }
}

impl BehaviourEditor for MemoryEditor {
    fn add_behaviour(&self, object: HostHandle, name: &str) -> HostResult<HostHandle> {
        self.with_open(|state| state.attach_behaviour(object, name))
    }

    fn delete_behaviour(&self, behaviour: HostHandle) -> HostResult<()> {
        self.with_open(|state| state.detach_behaviour(behaviour))
    }

    fn set_behaviour_data(&self, behaviour: HostHandle, slot: &str, record: HostHandle) -> HostResult<()> {
        self.with_open(|state| state.assign_single(behaviour, slot, PropertyKind::Data, record))
    }

    fn set_behaviour_setting(&self, behaviour: HostHandle, slot: &str, record: HostHandle) -> HostResult<()> {
        self.with_open(|state| state.assign_single(behaviour, slot, PropertyKind::Setting, record))
    }

    fn set_behaviour_object(&self, behaviour: HostHandle, slot: &str, object: HostHandle) -> HostResult<()> {
        self.with_open(|state| state.assign_single(behaviour, slot, PropertyKind::ObjectRef, object))
    }

    fn set_behaviour_reference(&self, behaviour: HostHandle, slot: &str, target: HostHandle) -> HostResult<()> {
        self.with_open(|state| state.assign_single(behaviour, slot, PropertyKind::Reference, target))
    }

    fn set_behaviour_string(&self, behaviour: HostHandle, slot: &str, value: &str) -> HostResult<()> {
        self.with_open(|state| match state.slot_mut(behaviour, slot)? {
            SlotValue::String(existing) => {
                *existing = value.to_string();
                Ok(())
            }
            _ => Err(HostError::kind_mismatch(behaviour, slot, PropertyKind::BehaviourString)),
        })
    }

    fn add_to_range(&self, behaviour: HostHandle, slot: &str, kind: RangeKind, item: HostHandle) -> HostResult<()> {
        self.with_open(|state| {
            let item = state.check_target(kind.property_kind(), item)?;
            state
                .slot_mut(behaviour, slot)?
                .many_mut(kind)
                .ok_or_else(|| HostError::kind_mismatch(behaviour, slot, kind.property_kind()))?
                .push(item);
            Ok(())
        })
    }

    fn erase_from_range(&self, behaviour: HostHandle, slot: &str, kind: RangeKind, item: HostHandle) -> HostResult<()> {
        self.with_open(|state| {
            let item = state.canonical(item);
            let items = state
                .slot_mut(behaviour, slot)?
                .many_mut(kind)
                .ok_or_else(|| HostError::kind_mismatch(behaviour, slot, kind.property_kind()))?;
            let index = items
                .iter()
                .position(|existing| *existing == item)
                .ok_or(HostError::InvalidHandle(item))?;
            items.remove(index);
            Ok(())
        })
    }
}

impl DataEditor for MemoryEditor {
    fn create_data(&self, value: HostValue) -> HostResult<HostHandle> {
        self.with_open(|state| Ok(state.create_record(HostClass::Data, value)))
    }

    fn create_setting(&self, value: HostValue) -> HostResult<HostHandle> {
        self.with_open(|state| Ok(state.create_record(HostClass::Setting, value)))
    }

    fn set_data_value(&self, record: HostHandle, value: HostValue, frame: Option<Frame>) -> HostResult<()> {
        self.with_open(|state| state.set_record_value(record, value, frame))
    }

    fn set_animated(&self, record: HostHandle, animated: bool) -> HostResult<()> {
        self.with_open(|state| {
            state.record_mut(record)?.animated = animated;
            Ok(())
        })
    }
}

impl LayersEditor for MemoryEditor {
    fn create_layer(&self, name: &str) -> HostResult<HostHandle> {
        self.with_open(|state| Ok(state.create_layer(name)))
    }

    fn add_object_to_layer(&self, layer: HostHandle, object: HostHandle) -> HostResult<()> {
        self.with_open(|state| {
            let object = state.canonical(object);
            state.object(object)?;
            let node = state.layer_mut(layer)?;
            if !node.objects.contains(&object) {
                node.objects.push(object);
            }
            Ok(())
        })
    }

    fn remove_object_from_layer(&self, layer: HostHandle, object: HostHandle) -> HostResult<()> {
        self.with_open(|state| {
            let object = state.canonical(object);
            state.layer_mut(layer)?.objects.retain(|o| *o != object);
            Ok(())
        })
    }
}

impl Session for MemoryEditor {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn serial(&self) -> u64 {
        self.serial
    }
}

impl Updater for MemoryEditor {
    fn generate_update(&self) -> HostResult<()> {
        self.with_open(|state| {
            state.updates += 1;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (MemoryHost, HostHandle) {
        let host = MemoryHost::new();
        host.define_behaviour(
            "Spring",
            &[
                ("stiffness", PropertyKind::Setting),
                ("targets", PropertyKind::ObjectRefRange),
                ("label", PropertyKind::BehaviourString),
            ],
        );
        let object = host.create_object("Rig");
        (host, object)
    }

    #[test]
    fn test_attach_lays_out_slots() {
        let (host, object) = rig();
        let spring = host.attach_behaviour(object, "Spring").unwrap();

        assert_eq!(host.get_behaviours(object).unwrap(), vec![spring]);
        assert_eq!(
            host.get_property_names(spring).unwrap(),
            vec!["stiffness", "targets", "label"]
        );
        assert!(host.get_behaviour_setting(spring, "stiffness").is_ok());
        assert!(host.get_behaviour_data(spring, "stiffness").is_err());
        assert_eq!(host.slot_reads(spring, "stiffness"), 2);
    }

    #[test]
    fn test_generation_tracks_behaviour_set() {
        let (host, object) = rig();
        let before = host.get_behaviour_generation(object).unwrap();
        let spring = host.attach_behaviour(object, "Spring").unwrap();
        host.detach_behaviour(spring).unwrap();
        assert_eq!(host.get_behaviour_generation(object).unwrap(), before + 2);
        assert!(host.get_behaviours(object).unwrap().is_empty());
    }

    #[test]
    fn test_editor_expires_with_transaction() {
        let (host, object) = rig();
        let mut kept = None;

        host.transact("Rename", &mut |editors| {
            editors.model.set_object_name(object, "Renamed").unwrap();
            kept = Some(editors.model.clone());
        })
        .unwrap();

        assert_eq!(host.get_object_name(object).unwrap(), "Renamed");
        let stale = kept.unwrap();
        assert_eq!(
            stale.set_object_name(object, "Again"),
            Err(HostError::TransactionClosed)
        );
        assert_eq!(host.undo_log(), vec!["Rename".to_string()]);
    }

    #[test]
    fn test_empty_object_name_rejected() {
        let (host, object) = rig();
        let mut outcome = None;

        host.transact("Clear name", &mut |editors| {
            outcome = Some(editors.model.set_object_name(object, "  "));
        })
        .unwrap();

        assert_eq!(
            outcome,
            Some(Err(HostError::Other("Object 'Rig' cannot take an empty name".to_string())))
        );
        assert_eq!(host.get_object_name(object).unwrap(), "Rig");
    }

    #[test]
    fn test_locked_scene_rejects_transaction() {
        let (host, _) = rig();
        host.set_locked(true);

        let mut ran = false;
        let result = host.transact("Blocked", &mut |_| ran = true);

        assert!(matches!(result, Err(HostError::TransactionRejected { .. })));
        assert!(!ran);
        assert_eq!(host.commit_count(), 0);
    }

    #[test]
    fn test_guid_handles_resolve_by_raw_id() {
        let (host, object) = rig();
        let spring = host.attach_behaviour(object, "Spring").unwrap();
        let as_guid = |h: HostHandle| HostHandle::new(HostClass::Guid, h.raw());

        assert_eq!(host.get_object_name(as_guid(object)).unwrap(), "Rig");
        assert_eq!(host.get_behaviour_name(as_guid(spring)).unwrap(), "Spring");
        assert!(host.get_behaviour_setting(as_guid(spring), "stiffness").is_ok());
        assert_eq!(host.slot_reads(spring, "stiffness"), 1);

        host.transact("Target", &mut |editors| {
            editors
                .behaviour
                .add_to_range(spring, "targets", RangeKind::Object, as_guid(object))
                .unwrap();
        })
        .unwrap();
        // Stored under the concrete class
        assert_eq!(host.get_behaviour_objects_range(spring, "targets").unwrap(), vec![object]);

        let unknown = HostHandle::new(HostClass::Guid, 9999);
        assert_eq!(host.get_object_name(unknown), Err(HostError::InvalidHandle(unknown)));
    }

    #[test]
    fn test_animated_record_keys() {
        let host = MemoryHost::new();
        let record = host.create_record(HostClass::Data, 1.0);
        host.set_record_animated(record, true).unwrap();
        host.set_record_value(record, 5.0, Some(10)).unwrap();

        assert_eq!(host.get_data_value(record, Some(4)).unwrap(), HostValue::Float(1.0));
        assert_eq!(host.get_data_value(record, Some(12)).unwrap(), HostValue::Float(5.0));
    }
}
