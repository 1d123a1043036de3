// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for inspection and report output.

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an inspection pass.
///
/// Host failures on individual elements are not errors here; they become
/// placeholders or error records in the report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Element-store failure outside the per-element paths.
    #[error(transparent)]
    Store(#[from] bim_annotate_core::Error),

    /// The report sink could not be written.
    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown report format name.
    #[error("unknown report format: {0:?}")]
    UnknownFormat(String),
}
