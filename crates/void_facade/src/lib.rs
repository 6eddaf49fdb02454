//! # void_facade - Typed Facades over the Host Model
//!
//! The host model only hands out handles, and only lets anyone mutate the
//! scene inside a transaction. This crate puts typed facades on top of
//! those handles and runs every mutation through an edit session.
//!
//! ```text
//! SceneFacade::edit(title, action)
//!     │
//!     ├─ ObjectFacade ── behaviour cache ──► BehaviourFacade
//!     │                                          │
//!     │                          property table (schema or probed)
//!     │                                          │
//!     │              Data / Setting / ObjectRef / Reference / String
//!     │                        scalar and range properties
//!     │
//!     └─ host results ──► wrap() ──► facades ──► unwrap() ──► host calls
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let scene = SceneFacade::with_defaults(Rc::new(host));
//! let Some(hip) = scene.object_by_name("Hip")? else {
//!     return Ok(());
//! };
//! let spring = hip.behaviour("Spring")?;
//!
//! scene.edit("Stiffen spring", |_| {
//!     spring.setting("stiffness")?.set(120.0, None)?;
//!     spring.object_ref("anchor")?.assign(&hip)
//! })?;
//! ```

pub mod behaviour;
pub mod config;
pub mod error;
pub mod facade;
pub mod layer;
pub mod object;
pub mod property;
pub mod record;
pub mod registry;
pub mod scene;
pub mod session;

pub use behaviour::{probe_slot, BehaviourFacade, ProbeFailure, PropertyTable, TableSource};
pub use config::{FacadeConfig, FramePolicy};
pub use error::{FacadeError, FacadeResult};
pub use facade::{unwrap, AnyFacade, AsHostHandle, Facade, FacadeCore, GenericFacade, Wrapped};
pub use layer::LayerFacade;
pub use object::ObjectFacade;
pub use property::{
    DataProperty, DataRangeProperty, FromProperty, ObjectRefProperty, ObjectRefRangeProperty,
    Property, PropertySlot, RangeProperty, RecordProperty, RefProperty, ReferenceProperty,
    ReferenceRangeProperty, SettingProperty, SettingRangeProperty, StringProperty,
};
pub use record::RecordFacade;
pub use registry::{FacadeKind, WrapperRegistry};
pub use scene::{EditStats, SceneFacade};
pub use session::EditSession;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::behaviour::BehaviourFacade;
    pub use crate::config::{FacadeConfig, FramePolicy};
    pub use crate::error::{FacadeError, FacadeResult};
    pub use crate::facade::{unwrap, AnyFacade, AsHostHandle, Facade, Wrapped};
    pub use crate::object::ObjectFacade;
    pub use crate::property::Property;
    pub use crate::registry::WrapperRegistry;
    pub use crate::scene::SceneFacade;
    pub use crate::session::EditSession;
    pub use void_host::{HostHandle, HostModel, HostValue, PropertyKind};
}
