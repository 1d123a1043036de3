// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Annotate Core
//!
//! Element model and host contract shared by the inspection and synthesis
//! crates.
//!
//! ## Overview
//!
//! - **Element model**: typed payloads for walls, doors, slabs, zones,
//!   dimensions, labels and details, keyed by GUID
//! - **Host contract**: the [`ElementStore`] trait covering reads, creation,
//!   deletion, bounds and undoable commands
//! - **Scoped memos**: [`ScopedMemo`] releases host buffers on drop
//! - **In-memory host**: [`MemoryStore`] backed by a JSON model snapshot
//! - **Interchange schema**: label-type codes and import column table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bim_annotate_core::{ElementStore, ElementType, MemoryStore};
//!
//! let store = MemoryStore::load("model.json")?;
//! for id in store.element_list(ElementType::Wall)? {
//!     let bounds = store.calc_bounds(id)?;
//!     println!("{} {}", id, bounds);
//! }
//! ```

pub mod bounds;
pub mod element;
pub mod error;
pub mod memo;
pub mod memory;
pub mod schema;
pub mod store;
pub mod types;

pub use bounds::BoundingBox3D;
pub use element::{
    AttributeIndex, DimAppearance, Detail, Dimension, Door, Element, ElementBody, Label,
    LabelClass, PolygonHeader, Slab, TextDirection, TextPosition, Wall, Zone,
};
pub use error::{Error, Result};
pub use memo::{
    DimBase, DimElem, DimNote, ElementMemo, HandleId, Marker, ScopedMemo, SubElement,
    SubElementKind,
};
pub use memory::{MemoryStore, ModelSnapshot, StoredElement};
pub use schema::{ImportColumn, LabelType, NOT_AVAILABLE, REPORT_SCHEMA};
pub use store::{get_typed, run_undoable, ElementStore, ExtDefaults, HostOp};
pub use types::{ElementId, ElementRef, ElementType, Point2D};
