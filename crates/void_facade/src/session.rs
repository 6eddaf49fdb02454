//! Edit sessions - the scope in which host editors are valid
//!
//! A session is opened by the outermost [`SceneFacade::edit`] call and
//! reused by every nested one. The editors it holds are handed to actions
//! only as borrows of an [`EditSession`], so they cannot outlive the
//! action that received them.

use crate::error::FacadeResult;
use crate::scene::SceneFacade;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use void_host::{
    BehaviourEditor, DataEditor, Frame, HostEditors, LayersEditor, ModelEditor, Session, Updater,
};

/// The transaction currently open on a scene
pub(crate) struct ActiveEdit {
    pub(crate) title: String,
    pub(crate) editors: HostEditors,
    /// Host frame when the transaction opened
    pub(crate) frame: Frame,
    pub(crate) nested: Cell<u32>,
}

impl ActiveEdit {
    pub(crate) fn new(title: &str, editors: HostEditors, frame: Frame) -> Self {
        Self {
            title: title.to_string(),
            editors,
            frame,
            nested: Cell::new(0),
        }
    }
}

/// Installs the active transaction on a scene and removes it on every exit path
pub(crate) struct ActiveSlot<'a> {
    slot: &'a RefCell<Option<Rc<ActiveEdit>>>,
}

impl<'a> ActiveSlot<'a> {
    pub(crate) fn install(slot: &'a RefCell<Option<Rc<ActiveEdit>>>, active: Rc<ActiveEdit>) -> Self {
        let previous = slot.borrow_mut().replace(active);
        debug_assert!(previous.is_none(), "edit sessions never stack");
        Self { slot }
    }
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        self.slot.borrow_mut().take();
    }
}

/// Borrowed access to the editors of the open transaction
///
/// Handed to the action of [`SceneFacade::edit`]; nested calls receive a
/// session over the same transaction.
pub struct EditSession<'s> {
    scene: &'s SceneFacade,
    active: Rc<ActiveEdit>,
    nested: bool,
}

impl<'s> EditSession<'s> {
    pub(crate) fn new(scene: &'s SceneFacade, active: Rc<ActiveEdit>, nested: bool) -> Self {
        if nested {
            active.nested.set(active.nested.get() + 1);
        }
        Self {
            scene,
            active,
            nested,
        }
    }

    /// The scene being edited
    pub fn scene(&self) -> &'s SceneFacade {
        self.scene
    }

    /// Title of the outermost transaction
    pub fn title(&self) -> &str {
        &self.active.title
    }

    /// Whether this session joined a transaction opened further up the stack
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// Host frame captured when the transaction opened
    pub fn start_frame(&self) -> Frame {
        self.active.frame
    }

    /// The frame defaulted frame arguments resolve to, per the scene's policy
    pub fn frame(&self) -> FacadeResult<Frame> {
        self.scene.current_frame()
    }

    pub fn model_editor(&self) -> &dyn ModelEditor {
        self.active.editors.model.as_ref()
    }

    pub fn behaviour_editor(&self) -> &dyn BehaviourEditor {
        self.active.editors.behaviour.as_ref()
    }

    pub fn data_editor(&self) -> &dyn DataEditor {
        self.active.editors.data.as_ref()
    }

    pub fn layers_editor(&self) -> &dyn LayersEditor {
        self.active.editors.layers.as_ref()
    }

    pub fn session(&self) -> &dyn Session {
        self.active.editors.session.as_ref()
    }

    pub fn updater(&self) -> &dyn Updater {
        self.active.editors.updater.as_ref()
    }
}
