//! Errors reported by the host model

use crate::handle::HostHandle;
use crate::kind::PropertyKind;
use thiserror::Error;

/// Result type for host calls
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Errors a host call can report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The handle does not name a live node of the expected class
    #[error("Invalid host handle {0}")]
    InvalidHandle(HostHandle),

    /// The behaviour has no slot with this name
    #[error("Slot '{slot}' not found on {behaviour}")]
    SlotNotFound { behaviour: HostHandle, slot: String },

    /// The slot exists but does not answer to this getter or setter
    #[error("Slot '{slot}' on {behaviour} is not a {expected} slot")]
    KindMismatch {
        behaviour: HostHandle,
        slot: String,
        expected: PropertyKind,
    },

    /// The host refused to open a transaction
    #[error("Transaction '{title}' rejected: {reason}")]
    TransactionRejected { title: String, reason: String },

    /// An editor was used after its transaction closed
    #[error("Editor used outside of its transaction")]
    TransactionClosed,

    /// Any other host-side failure
    #[error("{0}")]
    Other(String),
}

impl HostError {
    /// Shorthand for a mismatch on a behaviour slot
    pub fn kind_mismatch(behaviour: HostHandle, slot: &str, expected: PropertyKind) -> Self {
        Self::KindMismatch {
            behaviour,
            slot: slot.to_string(),
            expected,
        }
    }
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}
