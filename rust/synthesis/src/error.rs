// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for import reading and annotation synthesis.

use bim_annotate_core::ImportColumn;

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single import row was rejected. Never fatal for the batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    /// Fewer fields than any row must carry.
    #[error("not enough fields: found {found}, need at least {required}")]
    TooFewFields { found: usize, required: usize },

    /// A column the row's label type needs is absent.
    #[error("missing {0}")]
    MissingColumn(ImportColumn),

    /// A numeric column does not hold a number.
    #[error("{column} is not a number: {value:?}")]
    InvalidNumber { column: ImportColumn, value: String },

    /// The CSV reader could not decode the row.
    #[error("unreadable row: {0}")]
    Unreadable(String),
}

/// Errors that abort a synthesis run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The import file could not be opened.
    #[error("import file error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] bim_annotate_core::Error),
}
