//! Range property facades

use super::{DataSlot, ObjectSlot, PropertySlot, RecordKind, ReferenceSlot, SettingSlot, SlotKind};
use crate::error::FacadeResult;
use crate::facade::{AsHostHandle, Facade};
use crate::session::EditSession;
use std::fmt;
use std::marker::PhantomData;
use void_host::{HostHandle, HostValue};

pub type DataRangeProperty = RangeProperty<DataSlot>;
pub type SettingRangeProperty = RangeProperty<SettingSlot>;
pub type ObjectRefRangeProperty = RangeProperty<ObjectSlot>;
pub type ReferenceRangeProperty = RangeProperty<ReferenceSlot>;

/// A slot holding an ordered collection of records or references
pub struct RangeProperty<K: SlotKind> {
    slot: PropertySlot,
    _kind: PhantomData<fn() -> K>,
}

impl<K: SlotKind> RangeProperty<K> {
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

    /// Element handles in range order
    pub fn ids(&self) -> FacadeResult<Vec<HostHandle>> {
        let viewer = self.slot.behaviour().scene().behaviour_viewer();
        Ok(K::read_range(viewer, self.slot.handle(), self.name())?)
    }

    /// One scalar facade per element, each already holding its id
    pub fn get(&self) -> FacadeResult<Vec<K::Element>> {
        Ok(self
            .ids()?
            .into_iter()
            .map(|id| K::element(self.slot.element(id)))
            .collect())
    }

    pub fn len(&self) -> FacadeResult<usize> {
        Ok(self.ids()?.len())
    }

    pub fn is_empty(&self) -> FacadeResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Append an element
    pub fn add(&self, item: &impl AsHostHandle) -> FacadeResult<()> {
        let item = item.as_host_handle();
        self.slot
            .behaviour()
            .scene()
            .edit(&format!("Add to {}", self.name()), |tx| self.push(tx, item))
    }

    /// Remove an element
    pub fn remove(&self, item: &impl AsHostHandle) -> FacadeResult<()> {
        let item = item.as_host_handle();
        self.slot
            .behaviour()
            .scene()
            .edit(&format!("Remove from {}", self.name()), |tx| {
                tx.behaviour_editor()
                    .erase_from_range(self.slot.handle(), self.name(), K::RANGE, item)?;
                Ok(())
            })
    }

    /// Replace the whole membership, keeping the order of `items`
    pub fn set<T: AsHostHandle>(&self, items: &[T]) -> FacadeResult<()> {
        self.slot
            .behaviour()
            .scene()
            .edit(&format!("Set {}", self.name()), |tx| {
                let editor = tx.behaviour_editor();
                for existing in self.ids()? {
                    editor.erase_from_range(self.slot.handle(), self.name(), K::RANGE, existing)?;
                }
                for item in items {
                    self.push(tx, item.as_host_handle())?;
                }
                Ok(())
            })
    }

    fn push(&self, tx: &EditSession<'_>, item: HostHandle) -> FacadeResult<()> {
        tx.behaviour_editor()
            .add_to_range(self.slot.handle(), self.name(), K::RANGE, item)?;
        Ok(())
    }
}

impl<K: RecordKind> RangeProperty<K> {
    /// Create a new record holding `value` and append it, in one edit session
    pub fn create(&self, value: impl Into<HostValue>) -> FacadeResult<K::Element> {
        let value = value.into();
        let record = self
            .slot
            .behaviour()
            .scene()
            .edit(&format!("Create in {}", self.name()), |tx| {
                let record = K::create(tx.data_editor(), value)?;
                self.push(tx, record)?;
                Ok(record)
            })?;
        Ok(K::element(self.slot.element(record)))
    }
}

impl<K: SlotKind> Clone for RangeProperty<K> {
    fn clone(&self) -> Self {
        Self::new(self.slot.clone())
    }
}

impl<K: SlotKind> fmt::Debug for RangeProperty<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::RANGE.property_kind(), self.slot)
    }
}
