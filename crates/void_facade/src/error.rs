//! Error types for the facade layer

use thiserror::Error;
use void_host::{HostError, PropertyKind};

/// Result type for facade operations
pub type FacadeResult<T> = std::result::Result<T, FacadeError>;

/// Errors raised by facades and edit sessions
#[derive(Debug, Error)]
pub enum FacadeError {
    /// An editor, session or updater was requested outside an edit session
    #[error("'{accessor}' is only available inside an edit session")]
    EditorAccess { accessor: &'static str },

    /// No behaviour with this name is attached to the object
    #[error("Object '{object}' has no behaviour named '{name}'")]
    BehaviourNotFound { object: String, name: String },

    /// More than one behaviour with this name is attached to the object
    #[error("Object '{object}' has {count} behaviours named '{name}'")]
    AmbiguousBehaviour {
        object: String,
        name: String,
        count: usize,
    },

    /// The slot could not be classified, or does not exist
    #[error("Behaviour '{behaviour}' has no readable property '{slot}'")]
    PropertyNotFound { behaviour: String, slot: String },

    /// The slot exists but holds a different kind than requested
    #[error("Property '{slot}' is a {actual} property, not a {expected} property")]
    WrongPropertyKind {
        slot: String,
        expected: PropertyKind,
        actual: PropertyKind,
    },

    /// A data or setting slot holds the null record
    #[error("Property '{slot}' holds no record")]
    EmptySlot { slot: String },

    /// Range elements are read through the range and changed through it too
    #[error("Element of range '{slot}' cannot be reassigned; edit the range instead")]
    RangeElement { slot: String },

    /// The host accepted the transaction but never ran the edit action
    #[error("Host did not run the edit action for '{0}'")]
    TransactionSkipped(String),

    /// Error reported by the host model
    #[error(transparent)]
    Host(#[from] HostError),

    /// Configuration could not be parsed
    #[error("Invalid facade configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl FacadeError {
    /// Whether the error is a scope violation (a caller bug, never retried)
    pub fn is_editor_access(&self) -> bool {
        matches!(self, Self::EditorAccess { .. })
    }
}
