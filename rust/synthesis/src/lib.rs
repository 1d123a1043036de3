// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Annotate Synthesis
//!
//! Creates annotation elements from the rows of an exported element table:
//!
//! - label type 1: linear dimension along a wall
//! - label type 2: marker next to a door and a label attached to it
//! - label type 4: zone stamped at the room position
//!
//! Placement is computed by the pure functions in [`placement`]; creation
//! goes through an [`ElementStore`](bim_annotate_core::ElementStore).

pub mod error;
pub mod import;
pub mod placement;
pub mod synthesizer;

pub use error::{Error, Result, RowError};
pub use import::{AnnotationRequest, ImportReader, ImportedElementRow, RejectedRow};
pub use placement::{plan_wall_dimension, DimensionPlan};
pub use synthesizer::{auto_annotate, SynthesisReport, Synthesizer};
