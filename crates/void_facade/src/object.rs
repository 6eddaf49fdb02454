//! Object facades and the behaviour cache
//!
//! An object lists its behaviours by name. Building the list is expensive
//! (every behaviour gets its slot table classified), so the facade keeps a
//! name-keyed cache. The cache is rebuilt when:
//!
//! - it has never been populated
//! - a lookup asks for a name the cache does not contain
//! - the host's behaviour generation for the object moved (when
//!   `revalidate_behaviour_cache` is on)
//! - `flush_cache` is called, which also happens after every add or remove
//!   made through this facade

use crate::behaviour::BehaviourFacade;
use crate::error::{FacadeError, FacadeResult};
use crate::facade::{facade_identity, Facade, FacadeCore};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
struct BehaviourCache {
    populated: bool,
    generation: u64,
    by_name: HashMap<String, Vec<BehaviourFacade>>,
    order: Vec<BehaviourFacade>,
}

/// Facade over one scene object
#[derive(Clone)]
pub struct ObjectFacade {
    core: Rc<FacadeCore>,
    cache: Rc<RefCell<BehaviourCache>>,
}

impl ObjectFacade {
    pub(crate) fn from_core(core: Rc<FacadeCore>) -> Self {
        Self {
            core,
            cache: Rc::new(RefCell::new(BehaviourCache::default())),
        }
    }

    pub fn name(&self) -> FacadeResult<String> {
        Ok(self.scene().model_viewer().get_object_name(self.handle())?)
    }

    pub fn set_name(&self, name: &str) -> FacadeResult<()> {
        let object = self.handle();
        self.scene().edit(&format!("Rename to {}", name), |tx| {
            Ok(tx.model_editor().set_object_name(object, name)?)
        })
    }

    // ========================================================================
    // Cache maintenance
    // ========================================================================

    /// Drop every cached behaviour facade
    pub fn flush_cache(&self) {
        let mut cache = self.cache.borrow_mut();
        cache.populated = false;
        cache.by_name.clear();
        cache.order.clear();
    }

    /// Whether the cache currently holds a populated list
    pub fn is_cached(&self) -> bool {
        self.cache.borrow().populated
    }

    fn rebuild(&self) -> FacadeResult<()> {
        let viewer = self.scene().model_viewer();
        let generation = viewer.get_behaviour_generation(self.handle())?;
        let behaviour_viewer = self.scene().behaviour_viewer();

        let mut by_name: HashMap<String, Vec<BehaviourFacade>> = HashMap::new();
        let mut order = Vec::new();
        for handle in viewer.get_behaviours(self.handle())? {
            let Some(handle) = handle.non_null() else {
                continue;
            };
            let name = behaviour_viewer.get_behaviour_name(handle)?;
            let behaviour = BehaviourFacade::attached(self, handle)?;
            by_name.entry(name).or_default().push(behaviour.clone());
            order.push(behaviour);
        }
        log::debug!(
            "Rebuilt behaviour cache of {}: {} behaviours, generation {}",
            self.handle(),
            order.len(),
            generation
        );

        let mut cache = self.cache.borrow_mut();
        cache.populated = true;
        cache.generation = generation;
        cache.by_name = by_name;
        cache.order = order;
        Ok(())
    }

    /// Rebuild when unpopulated, or when the host generation moved.
    ///
    /// Returns whether a rebuild happened.
    fn ensure_fresh(&self) -> FacadeResult<bool> {
        let (populated, generation) = {
            let cache = self.cache.borrow();
            (cache.populated, cache.generation)
        };
        if !populated {
            self.rebuild()?;
            return Ok(true);
        }
        if self.scene().config().revalidate_behaviour_cache {
            let current = self
                .scene()
                .model_viewer()
                .get_behaviour_generation(self.handle())?;
            if current != generation {
                log::debug!(
                    "Behaviour generation of {} moved from {} to {}",
                    self.handle(),
                    generation,
                    current
                );
                self.rebuild()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    // ========================================================================
    // Behaviour lookup
    // ========================================================================

    /// All attached behaviours, in host order
    pub fn behaviours(&self) -> FacadeResult<Vec<BehaviourFacade>> {
        self.ensure_fresh()?;
        Ok(self.cache.borrow().order.clone())
    }

    /// Whether a behaviour named `name` is attached.
    ///
    /// A name missing from the cache triggers a rebuild before answering.
    pub fn has_behaviour(&self, name: &str) -> FacadeResult<bool> {
        let rebuilt = self.ensure_fresh()?;
        if !rebuilt && !self.cache.borrow().by_name.contains_key(name) {
            self.rebuild()?;
        }
        Ok(self.cache.borrow().by_name.contains_key(name))
    }

    /// Every behaviour named `name`
    pub fn behaviours_named(&self, name: &str) -> FacadeResult<Vec<BehaviourFacade>> {
        if !self.has_behaviour(name)? {
            return Ok(Vec::new());
        }
        Ok(self
            .cache
            .borrow()
            .by_name
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    /// The single behaviour named `name`, if any.
    ///
    /// Fails with `AmbiguousBehaviour` when more than one is attached.
    pub fn get_behaviour_by_name(&self, name: &str) -> FacadeResult<Option<BehaviourFacade>> {
        let mut matches = self.behaviours_named(name)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(FacadeError::AmbiguousBehaviour {
                object: self.display_name(),
                name: name.to_string(),
                count,
            }),
        }
    }

    /// The single behaviour named `name`
    pub fn behaviour(&self, name: &str) -> FacadeResult<BehaviourFacade> {
        self.get_behaviour_by_name(name)?
            .ok_or_else(|| FacadeError::BehaviourNotFound {
                object: self.display_name(),
                name: name.to_string(),
            })
    }

    fn display_name(&self) -> String {
        self.name().unwrap_or_else(|_| self.handle().to_string())
    }

    // ========================================================================
    // Behaviour mutation
    // ========================================================================

    /// Attach a new behaviour of type `name`
    pub fn add_behaviour(&self, name: &str) -> FacadeResult<BehaviourFacade> {
        let object = self.handle();
        let handle = self.scene().edit(&format!("Add {}", name), |tx| {
            Ok(tx.behaviour_editor().add_behaviour(object, name)?)
        })?;
        self.flush_cache();
        BehaviourFacade::attached(self, handle)
    }

    /// Detach and destroy a behaviour
    pub fn remove_behaviour(&self, behaviour: &BehaviourFacade) -> FacadeResult<()> {
        let handle = behaviour.handle();
        let result = self.scene().edit("Remove behaviour", |tx| {
            Ok(tx.behaviour_editor().delete_behaviour(handle)?)
        });
        self.flush_cache();
        result
    }
}

impl Facade for ObjectFacade {
    fn core(&self) -> &Rc<FacadeCore> {
        &self.core
    }
}

facade_identity!(ObjectFacade);
