//! Viewer, editor and transaction entry points of the host model
//!
//! Viewers are borrowed from the [`HostModel`] and stay valid for the life
//! of the open scene. Editors are handed out by [`HostModel::transact`] as a
//! fresh [`HostEditors`] set for every transaction; a host is expected to
//! reject any editor call made after that transaction has closed.

use crate::error::HostResult;
use crate::handle::HostHandle;
use crate::kind::{PropertyKind, RangeKind};
use crate::value::HostValue;
use std::rc::Rc;

/// A frame number on the host's timeline
pub type Frame = i64;

// ============================================================================
// Viewers
// ============================================================================

/// Read-only queries over the scene graph
pub trait ModelViewer {
    /// Handle of the open scene
    fn scene_handle(&self) -> HostHandle;

    /// All object nodes in the scene, in host order
    fn get_objects(&self) -> HostResult<Vec<HostHandle>>;

    /// Name of an object node
    fn get_object_name(&self, object: HostHandle) -> HostResult<String>;

    /// Behaviours attached to an object, in host order
    fn get_behaviours(&self, object: HostHandle) -> HostResult<Vec<HostHandle>>;

    /// Counter bumped whenever the behaviour set of `object` changes
    fn get_behaviour_generation(&self, object: HostHandle) -> HostResult<u64>;

    /// The scene's current frame
    fn get_current_frame(&self) -> HostResult<Frame>;
}

/// Read-only queries over behaviours and their slots
pub trait BehaviourViewer {
    /// Type name of a behaviour
    fn get_behaviour_name(&self, behaviour: HostHandle) -> HostResult<String>;

    /// Object a behaviour is attached to
    fn get_behaviour_owner(&self, behaviour: HostHandle) -> HostResult<HostHandle>;

    /// Every slot name the behaviour exposes
    fn get_property_names(&self, behaviour: HostHandle) -> HostResult<Vec<String>>;

    /// Slot classification straight from the host, when it publishes one.
    ///
    /// Hosts without a schema keep the default and callers fall back to probing.
    fn get_behaviour_schema(
        &self,
        _behaviour: HostHandle,
    ) -> HostResult<Option<Vec<(String, PropertyKind)>>> {
        Ok(None)
    }

    fn get_behaviour_data(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle>;
    fn get_behaviour_data_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>>;
    fn get_behaviour_setting(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle>;
    fn get_behaviour_settings_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>>;
    fn get_behaviour_object(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle>;
    fn get_behaviour_objects_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>>;
    fn get_behaviour_reference(&self, behaviour: HostHandle, slot: &str) -> HostResult<HostHandle>;
    fn get_behaviour_reference_range(&self, behaviour: HostHandle, slot: &str) -> HostResult<Vec<HostHandle>>;
    fn get_behaviour_string(&self, behaviour: HostHandle, slot: &str) -> HostResult<String>;
}

/// Read-only queries over data and setting records
pub trait DataViewer {
    /// Value of a record. `frame` is only meaningful for animated records.
    fn get_data_value(&self, record: HostHandle, frame: Option<Frame>) -> HostResult<HostValue>;

    /// Whether the record varies per frame
    fn is_animated(&self, record: HostHandle) -> HostResult<bool>;
}

/// Read-only queries over layers
pub trait LayersViewer {
    fn get_layers(&self) -> HostResult<Vec<HostHandle>>;
    fn get_layer_name(&self, layer: HostHandle) -> HostResult<String>;
    fn get_layer_objects(&self, layer: HostHandle) -> HostResult<Vec<HostHandle>>;
}

// ============================================================================
// Editors
// ============================================================================

/// Scene graph mutation
pub trait ModelEditor {
    fn create_object_node(&self, name: &str) -> HostResult<HostHandle>;
    fn set_object_name(&self, object: HostHandle, name: &str) -> HostResult<()>;
    fn set_current_frame(&self, frame: Frame) -> HostResult<()>;
}

/// Behaviour and slot mutation
pub trait BehaviourEditor {
    /// Attach a new behaviour of type `name` to `object`
    fn add_behaviour(&self, object: HostHandle, name: &str) -> HostResult<HostHandle>;

    /// Detach and destroy a behaviour
    fn delete_behaviour(&self, behaviour: HostHandle) -> HostResult<()>;

    fn set_behaviour_data(&self, behaviour: HostHandle, slot: &str, record: HostHandle) -> HostResult<()>;
    fn set_behaviour_setting(&self, behaviour: HostHandle, slot: &str, record: HostHandle) -> HostResult<()>;
    fn set_behaviour_object(&self, behaviour: HostHandle, slot: &str, object: HostHandle) -> HostResult<()>;
    fn set_behaviour_reference(&self, behaviour: HostHandle, slot: &str, target: HostHandle) -> HostResult<()>;
    fn set_behaviour_string(&self, behaviour: HostHandle, slot: &str, value: &str) -> HostResult<()>;

    /// Append `item` to a range slot
    fn add_to_range(&self, behaviour: HostHandle, slot: &str, kind: RangeKind, item: HostHandle) -> HostResult<()>;

    /// Remove `item` from a range slot
    fn erase_from_range(&self, behaviour: HostHandle, slot: &str, kind: RangeKind, item: HostHandle) -> HostResult<()>;
}

/// Record creation and value mutation
pub trait DataEditor {
    fn create_data(&self, value: HostValue) -> HostResult<HostHandle>;
    fn create_setting(&self, value: HostValue) -> HostResult<HostHandle>;

    /// Write a record value. Animated records take a key at `frame`.
    fn set_data_value(&self, record: HostHandle, value: HostValue, frame: Option<Frame>) -> HostResult<()>;

    /// Switch a record between static and animated
    fn set_animated(&self, record: HostHandle, animated: bool) -> HostResult<()>;
}

/// Layer mutation
pub trait LayersEditor {
    fn create_layer(&self, name: &str) -> HostResult<HostHandle>;
    fn add_object_to_layer(&self, layer: HostHandle, object: HostHandle) -> HostResult<()>;
    fn remove_object_from_layer(&self, layer: HostHandle, object: HostHandle) -> HostResult<()>;
}

/// The host's record of one open transaction
pub trait Session {
    /// Title recorded in the host's undo log
    fn title(&self) -> String;

    /// Host-assigned transaction serial
    fn serial(&self) -> u64;
}

/// Update propagation for one transaction
pub trait Updater {
    /// Push the transaction's changes through the host's dependency graph
    fn generate_update(&self) -> HostResult<()>;
}

/// The editor set handed to a transaction body
#[derive(Clone)]
pub struct HostEditors {
    pub model: Rc<dyn ModelEditor>,
    pub behaviour: Rc<dyn BehaviourEditor>,
    pub data: Rc<dyn DataEditor>,
    pub layers: Rc<dyn LayersEditor>,
    pub session: Rc<dyn Session>,
    pub updater: Rc<dyn Updater>,
}

impl HostEditors {
    /// Build the set from one object that implements every editor role
    pub fn uniform<E>(editor: Rc<E>) -> Self
    where
        E: ModelEditor + BehaviourEditor + DataEditor + LayersEditor + Session + Updater + 'static,
    {
        Self {
            model: editor.clone(),
            behaviour: editor.clone(),
            data: editor.clone(),
            layers: editor.clone(),
            session: editor.clone(),
            updater: editor,
        }
    }
}

// ============================================================================
// Host model
// ============================================================================

/// An open scene in the host
pub trait HostModel {
    fn model_viewer(&self) -> &dyn ModelViewer;
    fn behaviour_viewer(&self) -> &dyn BehaviourViewer;
    fn data_viewer(&self) -> &dyn DataViewer;
    fn layers_viewer(&self) -> &dyn LayersViewer;

    /// Open a transaction titled `title` and run `body` with fresh editors.
    ///
    /// The host commits when `body` returns. An error means the transaction
    /// could not be opened or committed; in the first case `body` never ran.
    fn transact(&self, title: &str, body: &mut dyn FnMut(HostEditors)) -> HostResult<()>;
}
