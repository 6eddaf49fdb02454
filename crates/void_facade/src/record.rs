//! Data and setting records
//!
//! Records hold the values behaviours point at. A record is either static
//! or animated; animated records are keyed per frame, and a read or write
//! without an explicit frame resolves to the scene's current frame. Static
//! records ignore frame arguments entirely.

use crate::error::FacadeResult;
use crate::facade::{facade_identity, Facade, FacadeCore};
use crate::registry::FacadeKind;
use crate::scene::SceneFacade;
use crate::session::EditSession;
use std::rc::Rc;
use void_host::{Frame, HostHandle, HostValue};

/// Facade over one data or setting record
#[derive(Clone)]
pub struct RecordFacade {
    core: Rc<FacadeCore>,
}

impl RecordFacade {
    pub(crate) fn from_core(core: Rc<FacadeCore>) -> Self {
        Self { core }
    }

    /// Whether this is a setting record rather than a data record
    pub fn is_setting(&self) -> bool {
        self.kind() == FacadeKind::Setting
    }

    pub fn is_animated(&self) -> FacadeResult<bool> {
        Ok(self.scene().data_viewer().is_animated(self.handle())?)
    }

    /// Read the value, at `frame` or the current frame when animated
    pub fn value(&self, frame: Option<Frame>) -> FacadeResult<HostValue> {
        read_record(self.scene(), self.handle(), frame)
    }

    /// Write the value, keyed at `frame` or the current frame when animated
    pub fn set_value(&self, value: impl Into<HostValue>, frame: Option<Frame>) -> FacadeResult<()> {
        let value = value.into();
        let record = self.handle();
        self.scene()
            .edit("Set record value", |tx| write_record(tx, record, value, frame))
    }

    /// Switch between static and animated
    pub fn set_animated(&self, animated: bool) -> FacadeResult<()> {
        set_record_animated(self.scene(), self.handle(), animated)
    }
}

impl Facade for RecordFacade {
    fn core(&self) -> &Rc<FacadeCore> {
        &self.core
    }
}

facade_identity!(RecordFacade);

/// The frame a record access is keyed at, or `None` for static records
pub(crate) fn resolve_frame(
    scene: &SceneFacade,
    record: HostHandle,
    frame: Option<Frame>,
) -> FacadeResult<Option<Frame>> {
    if !scene.data_viewer().is_animated(record)? {
        return Ok(None);
    }
    match frame {
        Some(frame) => Ok(Some(frame)),
        None => Ok(Some(scene.current_frame()?)),
    }
}

pub(crate) fn read_record(
    scene: &SceneFacade,
    record: HostHandle,
    frame: Option<Frame>,
) -> FacadeResult<HostValue> {
    let frame = resolve_frame(scene, record, frame)?;
    Ok(scene.data_viewer().get_data_value(record, frame)?)
}

pub(crate) fn write_record(
    tx: &EditSession<'_>,
    record: HostHandle,
    value: HostValue,
    frame: Option<Frame>,
) -> FacadeResult<()> {
    let frame = resolve_frame(tx.scene(), record, frame)?;
    tx.data_editor().set_data_value(record, value, frame)?;
    Ok(())
}

pub(crate) fn set_record_animated(
    scene: &SceneFacade,
    record: HostHandle,
    animated: bool,
) -> FacadeResult<()> {
    let title = if animated { "Animate record" } else { "Make record static" };
    scene.edit(title, |tx| Ok(tx.data_editor().set_animated(record, animated)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_host::{HostClass, MemoryHost};

    fn record(animated: bool) -> (MemoryHost, SceneFacade, RecordFacade) {
        let host = MemoryHost::new();
        let handle = host.create_record(HostClass::Data, 1.0);
        host.set_record_animated(handle, animated).unwrap();
        let scene = SceneFacade::with_defaults(Rc::new(host.clone()));
        let record = match scene.wrap(HostValue::Handle(handle), None) {
            Some(wrapped) => wrapped.into_facade().unwrap().as_record().unwrap().clone(),
            None => panic!("record handle wrapped to nothing"),
        };
        (host, scene, record)
    }

    #[test]
    fn test_static_record_ignores_frames() {
        let (_, _, record) = record(false);
        assert!(!record.is_setting());
        record.set_value(2.5, Some(40)).unwrap();
        assert_eq!(record.value(None).unwrap(), HostValue::Float(2.5));
        assert_eq!(record.value(Some(-10)).unwrap(), HostValue::Float(2.5));
    }

    #[test]
    fn test_animated_record_defaults_to_current_frame() {
        let (host, _, record) = record(true);
        host.set_current_frame(10);
        record.set_value(5.0, None).unwrap();
        record.set_value(9.0, Some(20)).unwrap();

        assert_eq!(record.value(Some(12)).unwrap(), HostValue::Float(5.0));
        assert_eq!(record.value(Some(25)).unwrap(), HostValue::Float(9.0));

        host.set_current_frame(21);
        assert_eq!(record.value(None).unwrap(), HostValue::Float(9.0));
    }

    #[test]
    fn test_set_animated_is_an_edit() {
        let (host, _, record) = record(false);
        record.set_animated(true).unwrap();
        assert!(record.is_animated().unwrap());
        assert_eq!(host.undo_log(), vec!["Animate record".to_string()]);
    }
}
