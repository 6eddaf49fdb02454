//! Layer facades

use crate::error::FacadeResult;
use crate::facade::{facade_identity, AsHostHandle, Facade, FacadeCore, Wrapped};
use crate::object::ObjectFacade;
use std::rc::Rc;
use void_host::HostValue;

/// Facade over one scene layer
#[derive(Clone)]
pub struct LayerFacade {
    core: Rc<FacadeCore>,
}

impl LayerFacade {
    pub(crate) fn from_core(core: Rc<FacadeCore>) -> Self {
        Self { core }
    }

    pub fn name(&self) -> FacadeResult<String> {
        Ok(self.scene().layers_viewer().get_layer_name(self.handle())?)
    }

    /// Objects on the layer, wrapped with the layer as creator
    pub fn objects(&self) -> FacadeResult<Vec<ObjectFacade>> {
        let handles = self.scene().layers_viewer().get_layer_objects(self.handle())?;
        let raw = HostValue::List(handles.into_iter().map(HostValue::Handle).collect());
        let objects = match self.wrap(raw) {
            Some(Wrapped::List(items)) => items
                .into_iter()
                .filter_map(Wrapped::into_facade)
                .filter_map(|facade| facade.into_object())
                .collect(),
            _ => Vec::new(),
        };
        Ok(objects)
    }

    pub fn contains(&self, object: &impl AsHostHandle) -> FacadeResult<bool> {
        let object = object.as_host_handle();
        Ok(self
            .scene()
            .layers_viewer()
            .get_layer_objects(self.handle())?
            .contains(&object))
    }

    pub fn add_object(&self, object: &impl AsHostHandle) -> FacadeResult<()> {
        let (layer, object) = (self.handle(), object.as_host_handle());
        self.scene().edit("Add to layer", |tx| {
            Ok(tx.layers_editor().add_object_to_layer(layer, object)?)
        })
    }

    pub fn remove_object(&self, object: &impl AsHostHandle) -> FacadeResult<()> {
        let (layer, object) = (self.handle(), object.as_host_handle());
        self.scene().edit("Remove from layer", |tx| {
            Ok(tx.layers_editor().remove_object_from_layer(layer, object)?)
        })
    }
}

impl Facade for LayerFacade {
    fn core(&self) -> &Rc<FacadeCore> {
        &self.core
    }
}

facade_identity!(LayerFacade);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneFacade;
    use void_host::MemoryHost;

    #[test]
    fn test_layer_membership() {
        let host = MemoryHost::new();
        let scene = SceneFacade::with_defaults(Rc::new(host.clone()));
        let props = scene.create_layer("Props").unwrap();
        let crate_box = scene.create_object("Crate").unwrap();

        assert_eq!(props.name().unwrap(), "Props");
        assert!(props.objects().unwrap().is_empty());

        props.add_object(&crate_box).unwrap();
        assert!(props.contains(&crate_box).unwrap());
        let objects = props.objects().unwrap();
        assert_eq!(objects, vec![crate_box.clone()]);
        assert_eq!(objects[0].creator().unwrap().handle(), props.handle());

        props.remove_object(&crate_box).unwrap();
        assert!(!props.contains(&crate_box).unwrap());
        assert_eq!(scene.layers().unwrap(), vec![props]);
    }
}
