//! Scalar property facades

use super::{DataSlot, ObjectSlot, PropertySlot, RecordKind, RefKind, ReferenceSlot, SettingSlot};
use crate::error::{FacadeError, FacadeResult};
use crate::facade::{AnyFacade, AsHostHandle, Facade};
use crate::record::{read_record, resolve_frame, set_record_animated, write_record, RecordFacade};
use std::fmt;
use std::marker::PhantomData;
use void_host::{Frame, HostHandle, HostValue};

pub type DataProperty = RecordProperty<DataSlot>;
pub type SettingProperty = RecordProperty<SettingSlot>;
pub type ObjectRefProperty = RefProperty<ObjectSlot>;
pub type ReferenceProperty = RefProperty<ReferenceSlot>;

// ============================================================================
// Record properties
// ============================================================================

/// A slot holding one data or setting record
pub struct RecordProperty<K: RecordKind> {
    slot: PropertySlot,
    _kind: PhantomData<fn() -> K>,
}

impl<K: RecordKind> RecordProperty<K> {
    pub(crate) fn new(slot: PropertySlot) -> Self {
        Self {
            slot,
            _kind: PhantomData,
        }
    }

    pub fn slot(&self) -> &PropertySlot {
        &self.slot
    }

    /// Slot name
    pub fn name(&self) -> &str {
        self.slot.name()
    }

    /// The record the slot currently points at
    pub fn id(&self) -> FacadeResult<HostHandle> {
        let id = match self.slot.cached_id() {
            Some(id) => id,
            None => {
                let behaviour = self.slot.behaviour();
                K::read(behaviour.scene().behaviour_viewer(), self.slot.handle(), self.name())?
            }
        };
        id.non_null().ok_or_else(|| FacadeError::EmptySlot {
            slot: self.name().to_string(),
        })
    }

    /// The record as a facade, created by the owning behaviour
    pub fn record(&self) -> FacadeResult<RecordFacade> {
        let behaviour = self.slot.behaviour();
        let core = behaviour.scene().core(self.id()?, K::TARGET, Some(behaviour.core()));
        Ok(RecordFacade::from_core(core))
    }

    pub fn is_animated(&self) -> FacadeResult<bool> {
        let scene = self.slot.behaviour().scene();
        Ok(scene.data_viewer().is_animated(self.id()?)?)
    }

    /// Read the value. `frame` applies to animated records only and
    /// defaults to the scene's current frame.
    pub fn get(&self, frame: Option<Frame>) -> FacadeResult<HostValue> {
        read_record(self.slot.behaviour().scene(), self.id()?, frame)
    }

    /// Write the value, opening an edit session if none is open
    pub fn set(&self, value: impl Into<HostValue>, frame: Option<Frame>) -> FacadeResult<()> {
        let value = value.into();
        let scene = self.slot.behaviour().scene();
        scene.edit(&format!("Set {}", self.name()), |tx| {
            write_record(tx, self.id()?, value, frame)
        })
    }

    /// Write the same value at several frames in one edit session.
    ///
    /// Static records take the value once.
    pub fn set_frames(&self, value: impl Into<HostValue>, frames: &[Frame]) -> FacadeResult<()> {
        let value = value.into();
        let scene = self.slot.behaviour().scene();
        scene.edit(&format!("Set {}", self.name()), |tx| {
            let record = self.id()?;
            if resolve_frame(tx.scene(), record, None)?.is_none() {
                return write_record(tx, record, value.clone(), None);
            }
            for frame in frames {
                write_record(tx, record, value.clone(), Some(*frame))?;
            }
            Ok(())
        })
    }

    /// Switch the record between static and animated
    pub fn set_animated(&self, animated: bool) -> FacadeResult<()> {
        set_record_animated(self.slot.behaviour().scene(), self.id()?, animated)
    }

    /// Point the slot at a different record
    pub fn assign(&self, record: &impl AsHostHandle) -> FacadeResult<()> {
        self.slot.reject_element()?;
        let record = record.as_host_handle();
        let scene = self.slot.behaviour().scene();
        scene.edit(&format!("Assign {}", self.name()), |tx| {
            K::write(tx.behaviour_editor(), self.slot.handle(), self.name(), record)?;
            Ok(())
        })
    }
}

impl<K: RecordKind> Clone for RecordProperty<K> {
    fn clone(&self) -> Self {
        Self::new(self.slot.clone())
    }
}

impl<K: RecordKind> fmt::Debug for RecordProperty<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::SCALAR, self.slot)
    }
}

// ============================================================================
// Reference properties
// ============================================================================

/// A slot holding a reference to a scene object or a behaviour
pub struct RefProperty<K: RefKind> {
    slot: PropertySlot,
    _kind: PhantomData<fn() -> K>,
}

impl<K: RefKind> RefProperty<K> {
    pub(crate) fn new(slot: PropertySlot) -> Self {
        Self {
            slot,
            _kind: PhantomData,
        }
    }

    pub fn slot(&self) -> &PropertySlot {
        &self.slot
    }

    pub fn name(&self) -> &str {
        self.slot.name()
    }

    /// The referenced handle, `None` when the slot holds the null sentinel
    pub fn id(&self) -> FacadeResult<Option<HostHandle>> {
        if let Some(id) = self.slot.cached_id() {
            return Ok(Some(id));
        }
        let behaviour = self.slot.behaviour();
        let id = K::read(behaviour.scene().behaviour_viewer(), self.slot.handle(), self.name())?;
        Ok(id.non_null())
    }

    /// The referenced node, wrapped with the behaviour as creator
    pub fn get(&self) -> FacadeResult<Option<AnyFacade>> {
        let Some(id) = self.id()? else {
            return Ok(None);
        };
        Ok(self
            .slot
            .behaviour()
            .wrap(HostValue::Handle(id))
            .and_then(|wrapped| wrapped.into_facade()))
    }

    /// Point the slot at `target`, or clear it with `None`
    pub fn set(&self, target: Option<HostHandle>) -> FacadeResult<()> {
        self.slot.reject_element()?;
        let target = target.unwrap_or(K::NULL);
        let scene = self.slot.behaviour().scene();
        scene.edit(&format!("Set {}", self.name()), |tx| {
            K::write(tx.behaviour_editor(), self.slot.handle(), self.name(), target)?;
            Ok(())
        })
    }

    /// Point the slot at a facade or handle
    pub fn assign(&self, target: &impl AsHostHandle) -> FacadeResult<()> {
        self.set(Some(target.as_host_handle()))
    }

    /// Write the null sentinel
    pub fn clear(&self) -> FacadeResult<()> {
        self.set(None)
    }
}

impl<K: RefKind> Clone for RefProperty<K> {
    fn clone(&self) -> Self {
        Self::new(self.slot.clone())
    }
}

impl<K: RefKind> fmt::Debug for RefProperty<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::SCALAR, self.slot)
    }
}

// ============================================================================
// String properties
// ============================================================================

/// A plain string stored on the behaviour
#[derive(Debug, Clone)]
pub struct StringProperty {
    slot: PropertySlot,
}

impl StringProperty {
    pub(crate) fn new(slot: PropertySlot) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &PropertySlot {
        &self.slot
    }

    pub fn name(&self) -> &str {
        self.slot.name()
    }

    pub fn get(&self) -> FacadeResult<String> {
        let viewer = self.slot.behaviour().scene().behaviour_viewer();
        Ok(viewer.get_behaviour_string(self.slot.handle(), self.name())?)
    }

    pub fn set(&self, value: &str) -> FacadeResult<()> {
        let scene = self.slot.behaviour().scene();
        scene.edit(&format!("Set {}", self.name()), |tx| {
            tx.behaviour_editor()
                .set_behaviour_string(self.slot.handle(), self.name(), value)?;
            Ok(())
        })
    }
}
