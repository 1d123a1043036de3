// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process element store backed by a JSON model snapshot.
//!
//! `MemoryStore` implements the full host contract for tests and for the
//! command-line front end. Bounds are taken from the snapshot when present
//! and otherwise derived from the plan points of annotation elements; there is
//! no geometry kernel behind it.
//!
//! Host failures can be injected per operation (and per element) to exercise
//! the non-fatal error paths of callers.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::bounds::BoundingBox3D;
use crate::element::{AttributeIndex, Element, ElementBody};
use crate::error::{Error, Result};
use crate::memo::{ElementMemo, HandleId, Marker, SubElement, SubElementKind};
use crate::store::{ElementStore, ExtDefaults, HostOp};
use crate::types::{ElementId, ElementType};

/// One element as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub memo: ElementMemo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<SubElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox3D>,
}

impl StoredElement {
    pub fn new(body: ElementBody) -> Self {
        Self {
            element: Element::new(ElementId::NULL, body),
            memo: ElementMemo::default(),
            sub: None,
            info: None,
            bounds: None,
        }
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.element.id = id;
        self
    }

    pub fn with_memo(mut self, memo: ElementMemo) -> Self {
        self.memo = memo;
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingBox3D) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Serializable model content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSnapshot {
    pub elements: Vec<StoredElement>,
    /// Next attribute-category index handed out for new zones.
    pub next_attribute_index: u32,
}

#[derive(Debug, Clone, Default)]
struct Model {
    order: Vec<ElementId>,
    elements: FxHashMap<ElementId, StoredElement>,
    next_attribute_index: u32,
}

impl Model {
    fn insert(&mut self, mut stored: StoredElement) -> ElementId {
        if stored.element.id.is_null() {
            stored.element.id = ElementId::new_v4();
        }
        let id = stored.element.id;
        stored.memo.handles.clear();
        if self.elements.insert(id, stored).is_none() {
            self.order.push(id);
        }
        id
    }

    fn stored(&self, id: ElementId) -> Result<&StoredElement> {
        self.elements.get(&id).ok_or(Error::NotFound(id))
    }
}

#[derive(Debug, Default)]
struct State {
    model: Model,
    defaults: FxHashMap<ElementType, (ElementBody, ElementMemo)>,
    next_handle: u64,
    live_handles: FxHashSet<HandleId>,
    allocation_budget: Option<usize>,
    failing_ops: FxHashSet<HostOp>,
    failing_elements: FxHashSet<(HostOp, ElementId)>,
    command: Option<(String, Model)>,
}

impl State {
    fn check(&self, op: HostOp, id: Option<ElementId>) -> Result<()> {
        if self.failing_ops.contains(&op) {
            return Err(Error::host(op, "injected failure"));
        }
        if let Some(id) = id {
            if self.failing_elements.contains(&(op, id)) {
                return Err(Error::host(op, format!("injected failure for {}", id)));
            }
        }
        Ok(())
    }

    fn new_handle(&mut self) -> HandleId {
        self.next_handle += 1;
        let handle = HandleId(self.next_handle);
        self.live_handles.insert(handle);
        handle
    }

    /// Copy of a stored memo with a host handle backing it.
    fn hand_out(&mut self, mut memo: ElementMemo) -> ElementMemo {
        memo.handles.clear();
        let has_buffers = !memo.wall_doors.is_empty()
            || !memo.dim_elems.is_empty()
            || !memo.coords.is_empty()
            || !memo.pends.is_empty()
            || memo.text_content.is_some();
        if has_buffers {
            let handle = self.new_handle();
            memo.handles.push(handle);
        }
        memo
    }

    fn default_parts(&self, ty: ElementType) -> (ElementBody, ElementMemo) {
        self.defaults
            .get(&ty)
            .cloned()
            .unwrap_or_else(|| builtin_defaults(ty))
    }
}

fn builtin_defaults(ty: ElementType) -> (ElementBody, ElementMemo) {
    let body = ElementBody::default_for(ty);
    let memo = match ty {
        // Text labels come with an empty text buffer.
        ElementType::Label => ElementMemo {
            text_content: Some(String::new()),
            ..Default::default()
        },
        _ => ElementMemo::default(),
    };
    (body, memo)
}

/// Reject payloads the host would refuse to create.
fn validate(model: &Model, element: &Element, memo: &ElementMemo) -> Result<()> {
    let reject = |reason: String| Err(Error::host(HostOp::Create, reason));
    match &element.body {
        ElementBody::Dimension(dim) => {
            if dim.n_dim_elem < 2 || dim.n_dim_elem != memo.dim_elems.len() {
                return reject(format!(
                    "dimension needs {} sub-elements, memo has {}",
                    dim.n_dim_elem,
                    memo.dim_elems.len()
                ));
            }
        }
        ElementBody::Detail(detail) => {
            if detail.poly.n_coords != memo.coords.len()
                || detail.poly.n_sub_polys + 1 != memo.pends.len()
            {
                return reject("detail polygon does not match memo".to_string());
            }
        }
        ElementBody::Label(label) => {
            if let Some(parent) = label.parent.filter(|p| !p.is_null()) {
                if !model.elements.contains_key(&parent) {
                    return reject(format!("label parent {} not found", parent));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Plan-point bounds for elements that carry their geometry in the memo.
fn derived_bounds(element: &Element, memo: &ElementMemo) -> Option<BoundingBox3D> {
    let mut bounds = BoundingBox3D::empty();
    match &element.body {
        ElementBody::Dimension(dim) => {
            for elem in &memo.dim_elems {
                bounds.expand(elem.base.loc.x, elem.base.loc.y, 0.0);
            }
            bounds.expand(dim.ref_c.x, dim.ref_c.y, 0.0);
        }
        ElementBody::Detail(_) => {
            for c in &memo.coords {
                bounds.expand(c.x, c.y, 0.0);
            }
        }
        ElementBody::Label(label) => {
            for p in [label.begin, label.mid, label.end] {
                bounds.expand(p.x, p.y, 0.0);
            }
        }
        ElementBody::Zone(zone) => bounds.expand(zone.pos.x, zone.pos.y, 0.0),
        ElementBody::Wall(wall) => {
            let half = wall.thickness / 2.0;
            for p in [wall.begin, wall.end] {
                bounds.expand(p.x - half, p.y - half, 0.0);
                bounds.expand(p.x + half, p.y + half, wall.height);
            }
        }
        _ => return None,
    }
    bounds.is_valid().then_some(bounds)
}

/// Element store holding the whole model in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from snapshot content.
    pub fn from_snapshot(snapshot: ModelSnapshot) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.borrow_mut();
            for stored in snapshot.elements {
                state.model.insert(stored);
            }
            state.model.next_attribute_index = snapshot.next_attribute_index;
        }
        store
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let snapshot: ModelSnapshot = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(
            path = %path.as_ref().display(),
            elements = snapshot.elements.len(),
            "Loaded model snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Current model content, in insertion order.
    pub fn snapshot(&self) -> ModelSnapshot {
        let state = self.state.borrow();
        let elements = state
            .model
            .order
            .iter()
            .filter_map(|id| state.model.elements.get(id).cloned())
            .collect();
        ModelSnapshot {
            elements,
            next_attribute_index: state.model.next_attribute_index,
        }
    }

    /// Write the current model as a JSON snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.snapshot())?;
        Ok(())
    }

    /// Add an element; a null id is replaced with a fresh one.
    pub fn insert(&self, stored: StoredElement) -> ElementId {
        self.state.borrow_mut().model.insert(stored)
    }

    /// Stored copy of an element, including memo and sub-element.
    pub fn stored(&self, id: ElementId) -> Option<StoredElement> {
        self.state.borrow().model.elements.get(&id).cloned()
    }

    /// Number of elements of a type.
    pub fn count(&self, ty: ElementType) -> usize {
        let state = self.state.borrow();
        state
            .model
            .elements
            .values()
            .filter(|s| s.element.element_type() == ty)
            .count()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.state.borrow().model.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Override the defaults handed out for a type.
    pub fn set_defaults(&self, ty: ElementType, body: ElementBody, memo: ElementMemo) {
        self.state.borrow_mut().defaults.insert(ty, (body, memo));
    }

    /// Handles allocated and not yet released.
    pub fn live_handles(&self) -> usize {
        self.state.borrow().live_handles.len()
    }

    /// Limit how many further allocations succeed; `None` removes the limit.
    pub fn set_allocation_budget(&self, budget: Option<usize>) {
        self.state.borrow_mut().allocation_budget = budget;
    }

    /// Make every call of `op` fail.
    pub fn fail(&self, op: HostOp) {
        self.state.borrow_mut().failing_ops.insert(op);
    }

    /// Make calls of `op` on one element fail.
    pub fn fail_for(&self, op: HostOp, id: ElementId) {
        self.state.borrow_mut().failing_elements.insert((op, id));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.failing_ops.clear();
        state.failing_elements.clear();
    }
}

impl ElementStore for MemoryStore {
    fn element_list(&self, ty: ElementType) -> Result<Vec<ElementId>> {
        let state = self.state.borrow();
        state.check(HostOp::ElementList, None)?;
        Ok(state
            .model
            .order
            .iter()
            .filter(|id| {
                state
                    .model
                    .elements
                    .get(*id)
                    .is_some_and(|s| s.element.element_type() == ty)
            })
            .copied()
            .collect())
    }

    fn get(&self, id: ElementId) -> Result<Element> {
        let state = self.state.borrow();
        state.check(HostOp::Get, Some(id))?;
        Ok(state.model.stored(id)?.element.clone())
    }

    fn memo(&self, id: ElementId) -> Result<ElementMemo> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::Memo, Some(id))?;
        let memo = state.model.stored(id)?.memo.clone();
        Ok(state.hand_out(memo))
    }

    fn defaults(&self, ty: ElementType) -> Result<(Element, ElementMemo)> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::Defaults, None)?;
        let (body, memo) = state.default_parts(ty);
        let memo = state.hand_out(memo);
        Ok((Element::new(ElementId::NULL, body), memo))
    }

    fn defaults_ext(&self, ty: ElementType, kind: SubElementKind) -> Result<ExtDefaults> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::Defaults, None)?;
        let (body, memo) = state.default_parts(ty);
        let memo = state.hand_out(memo);
        let sub = SubElement {
            kind,
            no_params: false,
            marker: Marker {
                pen: 1,
                use_object_pens: false,
                ..Default::default()
            },
        };
        Ok(ExtDefaults {
            element: Element::new(ElementId::NULL, body),
            memo,
            sub,
            sub_memo: ElementMemo::default(),
        })
    }

    fn create(&self, element: &mut Element, memo: &ElementMemo) -> Result<ElementId> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::Create, None)?;
        validate(&state.model, element, memo)?;
        element.id = ElementId::new_v4();
        let bounds = derived_bounds(element, memo);
        let stored = StoredElement {
            element: element.clone(),
            memo: memo.clone(),
            sub: None,
            info: None,
            bounds,
        };
        Ok(state.model.insert(stored))
    }

    fn create_ext(
        &self,
        element: &mut Element,
        memo: &ElementMemo,
        sub: &SubElement,
        _sub_memo: &ElementMemo,
    ) -> Result<ElementId> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::Create, None)?;
        validate(&state.model, element, memo)?;
        element.id = ElementId::new_v4();
        let bounds = derived_bounds(element, memo);
        let stored = StoredElement {
            element: element.clone(),
            memo: memo.clone(),
            sub: Some(sub.clone()),
            info: None,
            bounds,
        };
        Ok(state.model.insert(stored))
    }

    fn delete(&self, ids: &[ElementId]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::Delete, None)?;
        if let Some(missing) = ids.iter().find(|id| !state.model.elements.contains_key(*id)) {
            return Err(Error::NotFound(*missing));
        }
        let doomed: FxHashSet<ElementId> = ids.iter().copied().collect();
        state.model.order.retain(|id| !doomed.contains(id));
        state.model.elements.retain(|id, _| !doomed.contains(id));
        Ok(())
    }

    fn calc_bounds(&self, id: ElementId) -> Result<BoundingBox3D> {
        let state = self.state.borrow();
        state.check(HostOp::CalcBounds, Some(id))?;
        let stored = state.model.stored(id)?;
        stored
            .bounds
            .or_else(|| derived_bounds(&stored.element, &stored.memo))
            .ok_or_else(|| Error::host(HostOp::CalcBounds, format!("no geometry for {}", id)))
    }

    fn connected_elements(&self, id: ElementId, ty: ElementType) -> Result<Vec<ElementId>> {
        let state = self.state.borrow();
        state.check(HostOp::Connected, Some(id))?;
        let owner = state.model.stored(id)?;
        let connected = match ty {
            ElementType::Label => state
                .model
                .order
                .iter()
                .filter_map(|other| state.model.elements.get(other))
                .filter(|s| {
                    s.element
                        .as_label()
                        .is_some_and(|label| label.parent == Some(id))
                })
                .map(|s| s.element.id)
                .collect(),
            ElementType::Door if owner.element.element_type() == ElementType::Wall => {
                owner.memo.wall_doors.clone()
            }
            _ => Vec::new(),
        };
        Ok(connected)
    }

    fn info_string(&self, id: ElementId) -> Result<String> {
        let state = self.state.borrow();
        state.check(HostOp::InfoString, Some(id))?;
        state
            .model
            .stored(id)?
            .info
            .clone()
            .ok_or_else(|| Error::host(HostOp::InfoString, format!("no info string for {}", id)))
    }

    fn type_name(&self, ty: ElementType) -> Result<String> {
        self.state.borrow().check(HostOp::TypeName, None)?;
        Ok(ty.as_str().to_string())
    }

    fn create_attribute_index(&self) -> Result<AttributeIndex> {
        let mut state = self.state.borrow_mut();
        state.check(HostOp::AttributeIndex, None)?;
        state.model.next_attribute_index += 1;
        Ok(AttributeIndex(state.model.next_attribute_index))
    }

    fn allocate(&self, _bytes: usize) -> Option<HandleId> {
        let mut state = self.state.borrow_mut();
        if let Some(remaining) = state.allocation_budget.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        Some(state.new_handle())
    }

    fn dispose_memo(&self, memo: &mut ElementMemo) {
        let handles = memo.take_handles();
        let mut state = self.state.borrow_mut();
        for handle in handles {
            state.live_handles.remove(&handle);
        }
    }

    fn begin_command(&self, name: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some((open, _)) = &state.command {
            return Err(Error::command(
                name,
                format!("command '{}' is still open", open),
            ));
        }
        let saved = state.model.clone();
        state.command = Some((name.to_string(), saved));
        Ok(())
    }

    fn commit_command(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.command.take() {
            Some(_) => Ok(()),
            None => Err(Error::command("commit", "no open command")),
        }
    }

    fn rollback_command(&self) {
        let mut state = self.state.borrow_mut();
        if let Some((_, saved)) = state.command.take() {
            state.model = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Dimension, Door, Label, LabelClass, Wall};
    use crate::memo::ScopedMemo;
    use crate::run_undoable;
    use crate::types::Point2D;

    fn wall(x1: f64) -> StoredElement {
        StoredElement::new(ElementBody::Wall(Wall {
            begin: Point2D::new(0.0, 0.0),
            end: Point2D::new(x1, 0.0),
            thickness: 0.2,
            height: 2.5,
        }))
    }

    #[test]
    fn element_list_keeps_insertion_order() {
        let store = MemoryStore::new();
        let a = store.insert(wall(1.0));
        let _door = store.insert(StoredElement::new(ElementBody::Door(Door::default())));
        let b = store.insert(wall(2.0));
        assert_eq!(store.element_list(ElementType::Wall).unwrap(), vec![a, b]);
    }

    #[test]
    fn memo_hand_out_is_tracked() {
        let store = MemoryStore::new();
        let door = store.insert(StoredElement::new(ElementBody::Door(Door::default())));
        let id = store.insert(wall(3.0).with_memo(ElementMemo {
            wall_doors: vec![door],
            ..Default::default()
        }));
        {
            let memo = ScopedMemo::new(&store, store.memo(id).unwrap());
            assert_eq!(memo.wall_doors, vec![door]);
            assert_eq!(store.live_handles(), 1);
        }
        assert_eq!(store.live_handles(), 0);
    }

    #[test]
    fn injected_failures_are_scoped_to_element() {
        let store = MemoryStore::new();
        let a = store.insert(wall(1.0).with_info("A"));
        let b = store.insert(wall(1.0).with_info("B"));
        store.fail_for(HostOp::InfoString, a);
        assert!(store.info_string(a).is_err());
        assert_eq!(store.info_string(b).unwrap(), "B");
        store.clear_failures();
        assert_eq!(store.info_string(a).unwrap(), "A");
    }

    #[test]
    fn create_rejects_short_dimension() {
        let store = MemoryStore::new();
        let (mut element, memo) = store.defaults(ElementType::Dimension).unwrap();
        let memo = ScopedMemo::new(&store, memo);
        element.as_dimension_mut().unwrap().n_dim_elem = 2;
        assert!(store.create(&mut element, &memo).is_err());
        assert_eq!(store.count(ElementType::Dimension), 0);
    }

    #[test]
    fn label_defaults_carry_text_buffer() {
        let store = MemoryStore::new();
        let (element, memo) = store.defaults(ElementType::Label).unwrap();
        assert_eq!(element.as_label().map(|l| l.class), Some(LabelClass::Text));
        assert_eq!(memo.text_content.as_deref(), Some(""));
        let memo = ScopedMemo::new(&store, memo);
        drop(memo);
        assert_eq!(store.live_handles(), 0);
    }

    #[test]
    fn label_with_unknown_parent_is_rejected() {
        let store = MemoryStore::new();
        let mut element = Element::new(
            ElementId::NULL,
            ElementBody::Label(Label {
                parent: Some(ElementId::new_v4()),
                ..Default::default()
            }),
        );
        let err = store.create(&mut element, &ElementMemo::default()).unwrap_err();
        assert!(matches!(err, Error::Host { op: HostOp::Create, .. }));
    }

    #[test]
    fn connected_labels_follow_parent() {
        let store = MemoryStore::new();
        let door = store.insert(StoredElement::new(ElementBody::Door(Door::default())));
        let label = store.insert(StoredElement::new(ElementBody::Label(Label {
            parent: Some(door),
            ..Default::default()
        })));
        assert_eq!(
            store.connected_elements(door, ElementType::Label).unwrap(),
            vec![label]
        );
    }

    #[test]
    fn rollback_restores_model() {
        let store = MemoryStore::new();
        store.insert(wall(1.0));
        let result: Result<()> = run_undoable(&store, "test", |s| {
            s.insert(wall(2.0));
            let mut dim = Element::new(ElementId::NULL, ElementBody::Dimension(Dimension::default()));
            s.create(&mut dim, &ElementMemo::default())?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn commit_keeps_changes() {
        let store = MemoryStore::new();
        let result: Result<()> = run_undoable(&store, "test", |s| {
            s.insert(wall(2.0));
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn nested_commands_are_refused() {
        let store = MemoryStore::new();
        store.begin_command("outer").unwrap();
        assert!(store.begin_command("inner").is_err());
        store.commit_command().unwrap();
        assert!(store.commit_command().is_err());
    }

    #[test]
    fn snapshot_round_trip_through_file() {
        let store = MemoryStore::new();
        let id = store.insert(
            wall(4.0)
                .with_info("Wall 4m")
                .with_bounds(BoundingBox3D::new([0.0, -0.1, 0.0], [4.0, 0.1, 2.5])),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.info_string(id).unwrap(), "Wall 4m");
        assert_eq!(loaded.calc_bounds(id).unwrap().x_max, 4.0);
    }

    #[test]
    fn allocation_budget_runs_out() {
        let store = MemoryStore::new();
        store.set_allocation_budget(Some(2));
        assert!(store.allocate(8).is_some());
        assert!(store.allocate(8).is_some());
        assert!(store.allocate(8).is_none());
        store.set_allocation_budget(None);
        assert!(store.allocate(8).is_some());
    }
}
