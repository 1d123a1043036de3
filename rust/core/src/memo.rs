// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extended element data ("memos") and their host-owned handles.
//!
//! Memos carry the variable-length parts of an element: a wall's embedded
//! doors, a dimension's sub-elements, a detail's polygon, a label's text.
//! The host backs every memo buffer with a handle that must be released.
//! [`ScopedMemo`] owns a memo and releases its handles when dropped, so every
//! exit path of a read or create disposes the memory.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::error::{Error, Result};
use crate::store::ElementStore;
use crate::types::{ElementId, ElementRef, Point2D};

/// Host handle backing a memo buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub u64);

/// Note attached to a dimension sub-element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimNote {
    /// Rich-text content, when the host provides one.
    pub rich_text: Option<String>,
    /// Raw content field.
    pub content: String,
}

impl DimNote {
    /// Rich text if present, raw content otherwise.
    pub fn text(&self) -> &str {
        self.rich_text.as_deref().unwrap_or(&self.content)
    }
}

/// Base point of a dimension sub-element and the element it measures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimBase {
    pub element: Option<ElementRef>,
    pub loc: Point2D,
}

/// One measured point of a dimension chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimElem {
    pub base: DimBase,
    pub note: DimNote,
    /// Measured value
    pub value: f64,
    pub pos: Point2D,
}

/// Extended data of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementMemo {
    /// Doors embedded in a wall.
    pub wall_doors: Vec<ElementId>,
    /// Sub-elements of a dimension, in chain order.
    pub dim_elems: Vec<DimElem>,
    /// Polygon coordinates.
    pub coords: Vec<Point2D>,
    /// End index (exclusive) of every sub-polygon, prefixed with 0.
    pub pends: Vec<usize>,
    /// Label text.
    pub text_content: Option<String>,
    /// Host handles backing the buffers above.
    #[serde(skip)]
    pub handles: Vec<HandleId>,
}

impl ElementMemo {
    /// Detach the handles so the host can release them.
    pub fn take_handles(&mut self) -> Vec<HandleId> {
        std::mem::take(&mut self.handles)
    }
}

/// Kind of sub-element created together with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubElementKind {
    #[default]
    MainMarker,
}

/// Marker object placed with a detail element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Marker {
    pub pen: i16,
    pub use_object_pens: bool,
    pub pos: Point2D,
}

/// Sub-element payload for extended creation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubElement {
    pub kind: SubElementKind,
    /// Create the marker without library parameters.
    pub no_params: bool,
    pub marker: Marker,
}

/// A memo whose host handles are released on drop.
pub struct ScopedMemo<'s, S: ElementStore + ?Sized> {
    store: &'s S,
    memo: ElementMemo,
}

impl<'s, S: ElementStore + ?Sized> ScopedMemo<'s, S> {
    /// Take ownership of a memo returned by `store`.
    pub fn new(store: &'s S, memo: ElementMemo) -> Self {
        Self { store, memo }
    }

    pub fn empty(store: &'s S) -> Self {
        Self::new(store, ElementMemo::default())
    }

    /// Allocate `n` zeroed dimension sub-elements.
    pub fn alloc_dim_elems(&mut self, n: usize) -> Result<()> {
        self.alloc(n * std::mem::size_of::<DimElem>())?;
        self.memo.dim_elems = vec![DimElem::default(); n];
        Ok(())
    }

    /// Allocate `n` zeroed polygon coordinates.
    pub fn alloc_coords(&mut self, n: usize) -> Result<()> {
        self.alloc(n * std::mem::size_of::<Point2D>())?;
        self.memo.coords = vec![Point2D::default(); n];
        Ok(())
    }

    /// Allocate `n` zeroed sub-polygon end indices.
    pub fn alloc_pends(&mut self, n: usize) -> Result<()> {
        self.alloc(n * std::mem::size_of::<usize>())?;
        self.memo.pends = vec![0; n];
        Ok(())
    }

    /// Replace the text content, allocating a text buffer when there is none.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        if self.memo.text_content.is_none() {
            self.alloc(text.len() + 1)?;
        }
        self.memo.text_content = Some(text.to_string());
        Ok(())
    }

    fn alloc(&mut self, bytes: usize) -> Result<()> {
        let handle = self
            .store
            .allocate(bytes)
            .ok_or(Error::Allocation { bytes })?;
        self.memo.handles.push(handle);
        Ok(())
    }
}

impl<S: ElementStore + ?Sized> Deref for ScopedMemo<'_, S> {
    type Target = ElementMemo;

    fn deref(&self) -> &ElementMemo {
        &self.memo
    }
}

impl<S: ElementStore + ?Sized> DerefMut for ScopedMemo<'_, S> {
    fn deref_mut(&mut self) -> &mut ElementMemo {
        &mut self.memo
    }
}

impl<S: ElementStore + ?Sized> Drop for ScopedMemo<'_, S> {
    fn drop(&mut self) {
        self.store.dispose_memo(&mut self.memo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn note_prefers_rich_text() {
        let mut note = DimNote {
            rich_text: None,
            content: "raw".into(),
        };
        assert_eq!(note.text(), "raw");
        note.rich_text = Some("rich".into());
        assert_eq!(note.text(), "rich");
    }

    #[test]
    fn scoped_memo_releases_on_drop() {
        let store = MemoryStore::new();
        {
            let mut memo = ScopedMemo::empty(&store);
            memo.alloc_coords(5).unwrap();
            memo.alloc_pends(2).unwrap();
            assert_eq!(memo.coords.len(), 5);
            assert_eq!(store.live_handles(), 2);
        }
        assert_eq!(store.live_handles(), 0);
    }

    #[test]
    fn set_text_allocates_once() {
        let store = MemoryStore::new();
        {
            let mut memo = ScopedMemo::empty(&store);
            memo.set_text("A").unwrap();
            memo.set_text("Door").unwrap();
            assert_eq!(memo.text_content.as_deref(), Some("Door"));
            assert_eq!(store.live_handles(), 1);
        }
        assert_eq!(store.live_handles(), 0);
    }

    #[test]
    fn failed_allocation_keeps_earlier_handles_releasable() {
        let store = MemoryStore::new();
        store.set_allocation_budget(Some(1));
        {
            let mut memo = ScopedMemo::empty(&store);
            memo.alloc_coords(5).unwrap();
            let err = memo.alloc_pends(2).unwrap_err();
            assert!(matches!(err, Error::Allocation { .. }));
        }
        assert_eq!(store.live_handles(), 0);
    }
}
