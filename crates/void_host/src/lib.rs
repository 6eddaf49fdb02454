//! # void_host - Host Model Boundary
//!
//! The host model is an opaque scene engine that owns every object,
//! behaviour and data record. Nothing outside it holds a pointer into its
//! graph: callers hold [`HostHandle`]s and go through two families of
//! entry points.
//!
//! - **Viewers** answer read-only queries and stay valid while the scene is open.
//! - **Editors** mutate the model and only exist inside a transaction opened
//!   with [`HostModel::transact`].
//!
//! ```text
//! caller ──► HostModel::transact(title, body) ──► body(HostEditors) ──► commit
//!    │                                                  │
//!    └──────────── Viewers (always valid) ◄─────────────┘
//! ```
//!
//! [`MemoryHost`] is a complete in-memory host model used by tests and
//! headless tooling.

pub mod error;
pub mod handle;
pub mod kind;
pub mod memory;
pub mod model;
pub mod value;

pub use error::{HostError, HostResult};
pub use handle::{HostClass, HostHandle};
pub use kind::{PropertyKind, RangeKind};
pub use memory::{MemoryHost, SlotValue};
pub use model::{
    BehaviourEditor, BehaviourViewer, DataEditor, DataViewer, Frame, HostEditors, HostModel,
    LayersEditor, LayersViewer, ModelEditor, ModelViewer, Session, Updater,
};
pub use value::HostValue;
