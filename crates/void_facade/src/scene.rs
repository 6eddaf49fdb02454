//! Scene facade - the root of every facade tree
//!
//! A `SceneFacade` is created once per opened scene. It owns the host
//! model, the wrapper registry and the configuration, and runs the edit
//! session protocol:
//!
//! ```text
//! edit(title, action)
//!   ├─ session already open ──► action(session)               (inline, no new transaction)
//!   └─ no session ──► host.transact(title)
//!                        ├─ install editors
//!                        ├─ action(session)
//!                        ├─ updater.generate_update()          (once, on success)
//!                        └─ remove editors                     (every exit path)
//! ```

use crate::behaviour::BehaviourFacade;
use crate::config::{FacadeConfig, FramePolicy};
use crate::error::{FacadeError, FacadeResult};
use crate::facade::{wrap_value, FacadeCore, Wrapped};
use crate::layer::LayerFacade;
use crate::object::ObjectFacade;
use crate::registry::{FacadeKind, WrapperRegistry};
use crate::session::{ActiveEdit, ActiveSlot, EditSession};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use void_host::{
    BehaviourEditor, BehaviourViewer, DataEditor, DataViewer, Frame, HostEditors, HostHandle,
    HostModel, HostValue, LayersEditor, LayersViewer, ModelEditor, ModelViewer, Session, Updater,
};

/// Statistics about edit sessions on one scene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditStats {
    /// Host transactions opened by outermost `edit` calls
    pub transactions: u64,
    /// `edit` calls that ran inside an already open session
    pub nested_edits: u64,
    /// Update propagations triggered
    pub updates: u64,
    /// Transactions the host refused to open
    pub rejected: u64,
    /// Actions that returned an error
    pub failed_actions: u64,
}

struct SceneInner {
    host: Rc<dyn HostModel>,
    registry: WrapperRegistry,
    config: FacadeConfig,
    handle: HostHandle,
    active: RefCell<Option<Rc<ActiveEdit>>>,
    stats: RefCell<EditStats>,
}

/// The root facade for one open scene
///
/// Cloning is cheap and shares the scene.
#[derive(Clone)]
pub struct SceneFacade {
    inner: Rc<SceneInner>,
}

impl SceneFacade {
    /// Open a facade over a host scene
    pub fn open(host: Rc<dyn HostModel>, registry: WrapperRegistry, config: FacadeConfig) -> Self {
        let handle = host.model_viewer().scene_handle();
        log::debug!(
            "Opened scene facade {} ({} wrapper classes, strict: {})",
            handle,
            registry.len(),
            config.strict_properties
        );
        Self {
            inner: Rc::new(SceneInner {
                host,
                registry,
                config,
                handle,
                active: RefCell::new(None),
                stats: RefCell::new(EditStats::default()),
            }),
        }
    }

    /// Open with the standard registry and default configuration
    pub fn with_defaults(host: Rc<dyn HostModel>) -> Self {
        Self::open(host, WrapperRegistry::standard(), FacadeConfig::default())
    }

    /// Handle of the scene in the host
    pub fn handle(&self) -> HostHandle {
        self.inner.handle
    }

    pub fn host(&self) -> &Rc<dyn HostModel> {
        &self.inner.host
    }

    pub fn registry(&self) -> &WrapperRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.inner.config
    }

    /// Snapshot of the edit statistics
    pub fn stats(&self) -> EditStats {
        self.inner.stats.borrow().clone()
    }

    // ========================================================================
    // Viewers
    // ========================================================================

    pub fn model_viewer(&self) -> &dyn ModelViewer {
        self.inner.host.model_viewer()
    }

    pub fn behaviour_viewer(&self) -> &dyn BehaviourViewer {
        self.inner.host.behaviour_viewer()
    }

    pub fn data_viewer(&self) -> &dyn DataViewer {
        self.inner.host.data_viewer()
    }

    pub fn layers_viewer(&self) -> &dyn LayersViewer {
        self.inner.host.layers_viewer()
    }

    // ========================================================================
    // Editors (only inside an edit session)
    // ========================================================================

    /// Whether an edit session is open
    pub fn is_editing(&self) -> bool {
        self.inner.active.borrow().is_some()
    }

    fn editors(&self, accessor: &'static str) -> FacadeResult<HostEditors> {
        self.inner
            .active
            .borrow()
            .as_ref()
            .map(|active| active.editors.clone())
            .ok_or(FacadeError::EditorAccess { accessor })
    }

    pub fn model_editor(&self) -> FacadeResult<Rc<dyn ModelEditor>> {
        Ok(self.editors("model_editor")?.model)
    }

    pub fn behaviour_editor(&self) -> FacadeResult<Rc<dyn BehaviourEditor>> {
        Ok(self.editors("behaviour_editor")?.behaviour)
    }

    pub fn data_editor(&self) -> FacadeResult<Rc<dyn DataEditor>> {
        Ok(self.editors("data_editor")?.data)
    }

    pub fn layers_editor(&self) -> FacadeResult<Rc<dyn LayersEditor>> {
        Ok(self.editors("layers_editor")?.layers)
    }

    pub fn session(&self) -> FacadeResult<Rc<dyn Session>> {
        Ok(self.editors("session")?.session)
    }

    pub fn updater(&self) -> FacadeResult<Rc<dyn Updater>> {
        Ok(self.editors("updater")?.updater)
    }

    // ========================================================================
    // Edit sessions
    // ========================================================================

    /// Run `action` inside an edit session.
    ///
    /// Opens a host transaction titled `title` unless a session is already
    /// open, in which case `action` runs inline in that session. Update
    /// propagation happens once, when the outermost action succeeds.
    pub fn edit<R>(
        &self,
        title: &str,
        action: impl FnOnce(&EditSession<'_>) -> FacadeResult<R>,
    ) -> FacadeResult<R> {
        let current = self.inner.active.borrow().clone();
        if let Some(active) = current {
            self.inner.stats.borrow_mut().nested_edits += 1;
            log::trace!("Edit '{}' joins open session '{}'", title, active.title);
            return action(&EditSession::new(self, active, true));
        }

        let frame = self.model_viewer().get_current_frame()?;
        let mut action = Some(action);
        let mut outcome: Option<FacadeResult<R>> = None;

        let opened = {
            let mut body = |editors: HostEditors| {
                let Some(action) = action.take() else {
                    return;
                };
                let active = Rc::new(ActiveEdit::new(title, editors, frame));
                let _slot = ActiveSlot::install(&self.inner.active, active.clone());

                let session = EditSession::new(self, active.clone(), false);
                let result = action(&session).and_then(|value| {
                    active.editors.updater.generate_update()?;
                    self.inner.stats.borrow_mut().updates += 1;
                    Ok(value)
                });
                log::debug!(
                    "Edit session '{}' closed after {} nested edits",
                    title,
                    active.nested.get()
                );
                outcome = Some(result);
            };
            self.inner.host.transact(title, &mut body)
        };

        let mut stats = self.inner.stats.borrow_mut();
        match (opened, outcome) {
            (Ok(()), Some(result)) => {
                stats.transactions += 1;
                if let Err(err) = &result {
                    stats.failed_actions += 1;
                    log::debug!("Edit '{}' failed: {}", title, err);
                }
                result
            }
            (Ok(()), None) => Err(FacadeError::TransactionSkipped(title.to_string())),
            (Err(err), None) => {
                stats.rejected += 1;
                log::warn!("Edit '{}' could not open a transaction: {}", title, err);
                Err(err.into())
            }
            (Err(err), Some(result)) => {
                stats.transactions += 1;
                log::warn!("Edit '{}' failed to commit: {}", title, err);
                result.and_then(|_| Err(err.into()))
            }
        }
    }

    /// The frame a defaulted frame argument resolves to
    pub fn current_frame(&self) -> FacadeResult<Frame> {
        if self.inner.config.frame_policy == FramePolicy::SnapshotAtEditStart {
            if let Some(active) = self.inner.active.borrow().as_ref() {
                return Ok(active.frame);
            }
        }
        Ok(self.model_viewer().get_current_frame()?)
    }

    // ========================================================================
    // Wrapping
    // ========================================================================

    /// Wrap a raw host value; see [`crate::facade::unwrap`] for the inverse
    pub fn wrap(&self, value: HostValue, creator: Option<&Rc<FacadeCore>>) -> Option<Wrapped> {
        wrap_value(self, value, creator)
    }

    pub(crate) fn core(
        &self,
        handle: HostHandle,
        kind: FacadeKind,
        creator: Option<&Rc<FacadeCore>>,
    ) -> Rc<FacadeCore> {
        FacadeCore::new(self, handle, kind, creator)
    }

    // ========================================================================
    // Scene contents
    // ========================================================================

    /// Object facade for a known object handle
    pub fn object(&self, handle: HostHandle) -> ObjectFacade {
        ObjectFacade::from_core(self.core(handle, FacadeKind::Object, None))
    }

    /// Behaviour facade for a known behaviour handle
    pub fn behaviour(&self, handle: HostHandle) -> BehaviourFacade {
        BehaviourFacade::from_core(self.core(handle, FacadeKind::Behaviour, None), None)
    }

    /// Layer facade for a known layer handle
    pub fn layer(&self, handle: HostHandle) -> LayerFacade {
        LayerFacade::from_core(self.core(handle, FacadeKind::Layer, None))
    }

    /// All objects in the scene
    pub fn objects(&self) -> FacadeResult<Vec<ObjectFacade>> {
        Ok(self
            .model_viewer()
            .get_objects()?
            .into_iter()
            .filter_map(HostHandle::non_null)
            .map(|handle| self.object(handle))
            .collect())
    }

    /// First object with this name
    pub fn object_by_name(&self, name: &str) -> FacadeResult<Option<ObjectFacade>> {
        for object in self.objects()? {
            if object.name()? == name {
                return Ok(Some(object));
            }
        }
        Ok(None)
    }

    /// Create an object node
    pub fn create_object(&self, name: &str) -> FacadeResult<ObjectFacade> {
        let handle = self.edit(&format!("Create {}", name), |tx| {
            Ok(tx.model_editor().create_object_node(name)?)
        })?;
        Ok(self.object(handle))
    }

    /// All layers in the scene
    pub fn layers(&self) -> FacadeResult<Vec<LayerFacade>> {
        Ok(self
            .layers_viewer()
            .get_layers()?
            .into_iter()
            .filter_map(HostHandle::non_null)
            .map(|handle| self.layer(handle))
            .collect())
    }

    /// Create a layer
    pub fn create_layer(&self, name: &str) -> FacadeResult<LayerFacade> {
        let handle = self.edit(&format!("Create layer {}", name), |tx| {
            Ok(tx.layers_editor().create_layer(name)?)
        })?;
        Ok(self.layer(handle))
    }

    /// Set the scene's current frame
    pub fn set_current_frame(&self, frame: Frame) -> FacadeResult<()> {
        self.edit("Set current frame", |tx| Ok(tx.model_editor().set_current_frame(frame)?))
    }
}

impl fmt::Debug for SceneFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneFacade")
            .field("handle", &self.inner.handle)
            .field("editing", &self.is_editing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_host::{HostError, MemoryHost};

    fn scene() -> (MemoryHost, SceneFacade) {
        let host = MemoryHost::new();
        let scene = SceneFacade::with_defaults(Rc::new(host.clone()));
        (host, scene)
    }

    #[test]
    fn test_editors_rejected_outside_session() {
        let (_, scene) = scene();
        assert!(!scene.is_editing());
        assert!(matches!(
            scene.model_editor().err(),
            Some(FacadeError::EditorAccess { accessor: "model_editor" })
        ));
        assert!(scene.updater().err().unwrap().is_editor_access());
        assert!(scene.session().err().unwrap().is_editor_access());
    }

    #[test]
    fn test_editors_available_inside_session() {
        let (_, scene) = scene();
        scene
            .edit("Probe", |tx| {
                assert!(tx.scene().is_editing());
                assert!(tx.scene().model_editor().is_ok());
                assert!(tx.scene().layers_editor().is_ok());
                assert_eq!(tx.session().title(), "Probe");
                Ok(())
            })
            .unwrap();
        assert!(!scene.is_editing());
    }

    #[test]
    fn test_nested_edits_propagate_once() {
        let (host, scene) = scene();
        let depth = scene
            .edit("Outer", |tx| {
                tx.scene().edit("Middle", |middle| {
                    assert!(middle.is_nested());
                    assert_eq!(middle.title(), "Outer");
                    middle.scene().edit("Inner", |_| Ok(3))
                })
            })
            .unwrap();

        assert_eq!(depth, 3);
        assert_eq!(host.update_count(), 1);
        assert_eq!(host.undo_log(), vec!["Outer".to_string()]);

        let stats = scene.stats();
        assert_eq!(stats.transactions, 1);
        assert_eq!(stats.nested_edits, 2);
        assert_eq!(stats.updates, 1);
    }

    #[test]
    fn test_rejected_open_skips_propagation() {
        let (host, scene) = scene();
        host.set_locked(true);

        let mut ran = false;
        let result = scene.edit("Blocked", |_| {
            ran = true;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(FacadeError::Host(HostError::TransactionRejected { .. }))
        ));
        assert!(!ran);
        assert!(!scene.is_editing());
        assert_eq!(host.update_count(), 0);
        assert_eq!(scene.stats().rejected, 1);
    }

    #[test]
    fn test_failed_action_clears_editors() {
        let (host, scene) = scene();
        let result: FacadeResult<()> = scene.edit("Broken", |_| {
            Err(FacadeError::EmptySlot {
                slot: "weight".to_string(),
            })
        });

        assert!(matches!(result, Err(FacadeError::EmptySlot { .. })));
        assert!(!scene.is_editing());
        assert!(!host.in_transaction());
        assert_eq!(host.update_count(), 0);
        assert_eq!(scene.stats().failed_actions, 1);

        // The scene stays usable
        scene.edit("Recovered", |_| Ok(())).unwrap();
        assert_eq!(host.update_count(), 1);
    }

    #[test]
    fn test_create_object() {
        let (host, scene) = scene();
        let object = scene.create_object("Hip").unwrap();
        assert_eq!(object.name().unwrap(), "Hip");
        assert_eq!(host.undo_log(), vec!["Create Hip".to_string()]);
        assert_eq!(scene.object_by_name("Hip").unwrap(), Some(object));
        assert_eq!(scene.object_by_name("Knee").unwrap(), None);
    }
}
