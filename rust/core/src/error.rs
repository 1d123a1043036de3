// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for host element-store operations.

use crate::store::HostOp;
use crate::types::{ElementId, ElementType};

/// Result type alias for element-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the host element store or the model layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A host call returned a non-success status.
    #[error("host call {op} failed: {reason}")]
    Host { op: HostOp, reason: String },

    /// The element does not exist in the store.
    #[error("element not found: {0}")]
    NotFound(ElementId),

    /// The element exists but has a different type than expected.
    #[error("element {id} is a {actual}, expected {expected}")]
    WrongType {
        id: ElementId,
        expected: ElementType,
        actual: ElementType,
    },

    /// The host could not hand out a scratch buffer.
    #[error("host could not allocate {bytes} bytes")]
    Allocation { bytes: usize },

    /// Text could not be parsed as a GUID.
    #[error("invalid GUID: {0:?}")]
    InvalidGuid(String),

    /// Begin/commit/rollback of an undoable command failed.
    #[error("command '{name}' failed: {reason}")]
    Command { name: String, reason: String },

    /// Snapshot serialization error.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a host-call failure.
    pub fn host(op: HostOp, reason: impl Into<String>) -> Self {
        Error::Host {
            op,
            reason: reason.into(),
        }
    }

    /// Create a command wrapper failure.
    pub fn command(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Command {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
