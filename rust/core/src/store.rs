// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host element-store contract.
//!
//! Everything the add-on knows about the model goes through [`ElementStore`].
//! Calls are synchronous and return a status; a failing call never poisons the
//! store, so callers decide per element whether to skip or substitute.

use std::fmt;

use crate::bounds::BoundingBox3D;
use crate::element::{AttributeIndex, Element};
use crate::error::{Error, Result};
use crate::memo::{ElementMemo, HandleId, SubElement, SubElementKind};
use crate::types::{ElementId, ElementType};

/// Host operations, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    ElementList,
    Get,
    Memo,
    Defaults,
    Create,
    Delete,
    CalcBounds,
    Connected,
    InfoString,
    TypeName,
    AttributeIndex,
}

impl HostOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostOp::ElementList => "element_list",
            HostOp::Get => "get",
            HostOp::Memo => "memo",
            HostOp::Defaults => "defaults",
            HostOp::Create => "create",
            HostOp::Delete => "delete",
            HostOp::CalcBounds => "calc_bounds",
            HostOp::Connected => "connected_elements",
            HostOp::InfoString => "info_string",
            HostOp::TypeName => "type_name",
            HostOp::AttributeIndex => "attribute_index",
        }
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defaults for an element created together with one sub-element.
#[derive(Debug, Clone)]
pub struct ExtDefaults {
    pub element: Element,
    pub memo: ElementMemo,
    pub sub: SubElement,
    pub sub_memo: ElementMemo,
}

/// Read/write access to the host's live model.
///
/// Memos returned by [`memo`](ElementStore::memo) and the defaults calls hold
/// host handles; wrap them in [`ScopedMemo`](crate::ScopedMemo) so they are
/// released on every path.
pub trait ElementStore {
    /// All element identifiers of one type, in host order.
    fn element_list(&self, ty: ElementType) -> Result<Vec<ElementId>>;

    /// Fetch an element by identifier.
    fn get(&self, id: ElementId) -> Result<Element>;

    /// Fetch the extended data of an element.
    fn memo(&self, id: ElementId) -> Result<ElementMemo>;

    /// Default element and memo for a new element of `ty`.
    fn defaults(&self, ty: ElementType) -> Result<(Element, ElementMemo)>;

    /// Defaults for an element plus one sub-element of `kind`.
    fn defaults_ext(&self, ty: ElementType, kind: SubElementKind) -> Result<ExtDefaults>;

    /// Create an element. On success the element's id is set and returned.
    fn create(&self, element: &mut Element, memo: &ElementMemo) -> Result<ElementId>;

    /// Create an element together with a sub-element.
    fn create_ext(
        &self,
        element: &mut Element,
        memo: &ElementMemo,
        sub: &SubElement,
        sub_memo: &ElementMemo,
    ) -> Result<ElementId>;

    /// Delete elements in one call.
    fn delete(&self, ids: &[ElementId]) -> Result<()>;

    /// Axis-aligned bounds of an element.
    fn calc_bounds(&self, id: ElementId) -> Result<BoundingBox3D>;

    /// Elements of `ty` connected to `id` (labels attached to an element).
    fn connected_elements(&self, id: ElementId, ty: ElementType) -> Result<Vec<ElementId>>;

    /// Host-composed descriptive string of an element.
    fn info_string(&self, id: ElementId) -> Result<String>;

    /// Localised type name.
    fn type_name(&self, ty: ElementType) -> Result<String> {
        Ok(ty.as_str().to_string())
    }

    /// Allocate a fresh attribute-category index.
    fn create_attribute_index(&self) -> Result<AttributeIndex>;

    /// Allocate a scratch buffer; `None` when the host is out of memory.
    fn allocate(&self, bytes: usize) -> Option<HandleId>;

    /// Release every handle held by `memo`.
    fn dispose_memo(&self, memo: &mut ElementMemo);

    /// Open an undoable command.
    fn begin_command(&self, name: &str) -> Result<()>;

    /// Close the open command, keeping its changes.
    fn commit_command(&self) -> Result<()>;

    /// Close the open command, discarding its changes.
    fn rollback_command(&self);
}

/// Run `f` inside one undoable command.
///
/// Changes are committed when `f` succeeds and rolled back as a whole when it
/// fails.
pub fn run_undoable<S, T, E, F>(store: &S, name: &str, f: F) -> std::result::Result<T, E>
where
    S: ElementStore + ?Sized,
    E: From<Error>,
    F: FnOnce(&S) -> std::result::Result<T, E>,
{
    store.begin_command(name)?;
    tracing::debug!(command = name, "Undoable command started");
    match f(store) {
        Ok(value) => {
            store.commit_command()?;
            tracing::debug!(command = name, "Undoable command committed");
            Ok(value)
        }
        Err(err) => {
            store.rollback_command();
            tracing::warn!(command = name, "Undoable command rolled back");
            Err(err)
        }
    }
}

/// Fetch an element, checking it has the expected type.
pub fn get_typed<S: ElementStore + ?Sized>(
    store: &S,
    id: ElementId,
    expected: ElementType,
) -> Result<Element> {
    let element = store.get(id)?;
    let actual = element.element_type();
    if actual != expected {
        return Err(Error::WrongType {
            id,
            expected,
            actual,
        });
    }
    Ok(element)
}
