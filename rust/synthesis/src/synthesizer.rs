// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Annotation Synthesizer: creates annotation elements from import rows.
//!
//! Every creation follows the same steps: fetch the host defaults for the
//! type, fill in the payload, create, and release the memo. Memos are held in
//! [`ScopedMemo`] guards so host buffers are released on every exit path,
//! including failed allocations and refused creations.
//!
//! A row that cannot be used is logged with its raw text and skipped. A
//! failed creation is logged and counted; the run goes on with the next
//! element.

use bim_annotate_core::{
    BoundingBox3D, DimAppearance, Element, ElementId, ElementStore, ElementType, Error,
    ExtDefaults, ImportColumn, LabelClass, Point2D, PolygonHeader, ScopedMemo, SubElementKind,
    TextDirection,
};
use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::import::{AnnotationRequest, ImportReader, ImportedElementRow, RejectedRow};
use crate::placement::{
    door_label_anchor, door_label_text, fit_room_field, marker_anchor, marker_polygon,
    marker_symbol_position, plan_wall_dimension, zone_position, MARKER_PEN,
};

/// Counts from one synthesis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynthesisReport {
    pub dimensions: usize,
    pub markers: usize,
    pub labels: usize,
    pub zones: usize,
    /// Rows rejected as malformed.
    pub skipped_rows: usize,
    /// Rows whose label type needs nothing created.
    pub ignored_rows: usize,
    /// Door labels not created for lack of a usable door GUID.
    pub skipped_labels: usize,
    /// Creations the host refused or could not allocate for.
    pub failures: usize,
}

impl SynthesisReport {
    /// Elements created in total.
    pub fn created(&self) -> usize {
        self.dimensions + self.markers + self.labels + self.zones
    }
}

fn unexpected_defaults(expected: ElementType, element: &Element) -> Error {
    Error::WrongType {
        id: element.id,
        expected,
        actual: element.element_type(),
    }
}

pub struct Synthesizer<'a, S: ElementStore + ?Sized> {
    store: &'a S,
    report: SynthesisReport,
}

impl<'a, S: ElementStore + ?Sized> Synthesizer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            report: SynthesisReport::default(),
        }
    }

    pub fn report(&self) -> &SynthesisReport {
        &self.report
    }

    /// Process rows in order and return the counts.
    pub fn run<I>(mut self, rows: I) -> SynthesisReport
    where
        I: IntoIterator<Item = std::result::Result<ImportedElementRow, RejectedRow>>,
    {
        for row in rows {
            match row {
                Ok(row) => self.apply_row(&row),
                Err(rejected) => {
                    tracing::warn!(
                        line = rejected.line,
                        raw = %rejected.raw,
                        error = %rejected.error,
                        "Skipping import row"
                    );
                    self.report.skipped_rows += 1;
                }
            }
        }

        tracing::info!(
            dimensions = self.report.dimensions,
            markers = self.report.markers,
            labels = self.report.labels,
            zones = self.report.zones,
            skipped_rows = self.report.skipped_rows,
            failures = self.report.failures,
            "Annotation synthesis complete"
        );
        self.report
    }

    pub fn apply_row(&mut self, row: &ImportedElementRow) {
        match row.request() {
            Ok(Some(request)) => self.apply(row, request),
            Ok(None) => {
                tracing::trace!(line = row.line, "Row needs no annotation");
                self.report.ignored_rows += 1;
            }
            Err(error) => {
                tracing::warn!(line = row.line, raw = %row.raw(), %error, "Skipping import row");
                self.report.skipped_rows += 1;
            }
        }
    }

    fn apply(&mut self, row: &ImportedElementRow, request: AnnotationRequest) {
        match request {
            AnnotationRequest::WallDimension { bounds, width } => {
                let created = self.create_wall_dimension(&bounds, width);
                self.tally(row, "dimension", created, |r| &mut r.dimensions);
            }
            AnnotationRequest::DoorMarker { corner, door } => {
                let created = self.create_door_marker(marker_anchor(corner));
                self.tally(row, "door marker", created, |r| &mut r.markers);

                let door = match door.as_deref().map(ElementId::parse) {
                    Some(Ok(door)) => door,
                    Some(Err(error)) => {
                        tracing::warn!(line = row.line, raw = %row.raw(), %error, "Door GUID is invalid, label skipped");
                        self.report.skipped_labels += 1;
                        return;
                    }
                    None => {
                        tracing::warn!(line = row.line, raw = %row.raw(), "Door GUID is empty, label skipped");
                        self.report.skipped_labels += 1;
                        return;
                    }
                };
                let x_max = match row.number(ImportColumn::BboxXMax) {
                    Ok(x_max) => x_max,
                    Err(error) => {
                        tracing::warn!(line = row.line, raw = %row.raw(), %error, "Door extent is unusable, label skipped");
                        self.report.skipped_labels += 1;
                        return;
                    }
                };
                let created = self.create_door_label(door, door_label_anchor(corner, x_max));
                self.tally(row, "door label", created, |r| &mut r.labels);
            }
            AnnotationRequest::Zone {
                position,
                room_name,
                room_number,
            } => {
                let created = self.create_zone(position, &room_name, &room_number);
                self.tally(row, "zone", created, |r| &mut r.zones);
            }
        }
    }

    fn tally(
        &mut self,
        row: &ImportedElementRow,
        what: &str,
        created: bim_annotate_core::Result<ElementId>,
        counter: impl FnOnce(&mut SynthesisReport) -> &mut usize,
    ) {
        match created {
            Ok(id) => {
                tracing::debug!(line = row.line, guid = %id, "Created {}", what);
                *counter(&mut self.report) += 1;
            }
            Err(error) => {
                tracing::error!(line = row.line, %error, "Error creating {}", what);
                self.report.failures += 1;
            }
        }
    }

    /// Two-point linear dimension along a wall's box.
    pub fn create_wall_dimension(
        &self,
        bounds: &BoundingBox3D,
        width: f64,
    ) -> bim_annotate_core::Result<ElementId> {
        let plan = plan_wall_dimension(bounds, width);
        let (mut element, memo) = self.store.defaults(ElementType::Dimension)?;
        let mut memo = ScopedMemo::new(self.store, memo);

        let unexpected = unexpected_defaults(ElementType::Dimension, &element);
        let dimension = element.as_dimension_mut().ok_or(unexpected)?;
        dimension.text_way = plan.text_way;
        dimension.appearance = DimAppearance::Normal;
        dimension.text_pos = plan.text_pos;
        dimension.ref_c = plan.ref_c;
        dimension.direction = plan.direction;
        dimension.n_dim_elem = plan.points.len();

        memo.alloc_dim_elems(plan.points.len())?;
        for (elem, point) in memo.dim_elems.iter_mut().zip(plan.points) {
            elem.base.loc = point;
            elem.pos = point;
        }

        self.store.create(&mut element, &memo)
    }

    /// Diamond detail with a main marker next to it.
    pub fn create_door_marker(&self, anchor: Point2D) -> bim_annotate_core::Result<ElementId> {
        let ExtDefaults {
            mut element,
            memo,
            mut sub,
            sub_memo,
        } = self
            .store
            .defaults_ext(ElementType::Detail, SubElementKind::MainMarker)?;
        let mut memo = ScopedMemo::new(self.store, memo);
        let sub_memo = ScopedMemo::new(self.store, sub_memo);

        let polygon = marker_polygon(anchor);
        let unexpected = unexpected_defaults(ElementType::Detail, &element);
        let detail = element.as_detail_mut().ok_or(unexpected)?;
        detail.pos = anchor;
        detail.poly = PolygonHeader {
            n_coords: polygon.len(),
            n_sub_polys: 1,
            n_arcs: 0,
        };

        memo.alloc_coords(polygon.len())?;
        memo.coords.copy_from_slice(&polygon);
        memo.alloc_pends(2)?;
        memo.pends[0] = 0;
        memo.pends[1] = polygon.len();

        sub.kind = SubElementKind::MainMarker;
        sub.no_params = true;
        sub.marker.pen = MARKER_PEN;
        sub.marker.use_object_pens = true;
        sub.marker.pos = marker_symbol_position(anchor);

        self.store.create_ext(&mut element, &memo, &sub, &sub_memo)
    }

    /// Text label attached to a door at `anchor`.
    pub fn create_door_label(
        &self,
        door: ElementId,
        anchor: Point2D,
    ) -> bim_annotate_core::Result<ElementId> {
        let (mut element, memo) = self.store.defaults(ElementType::Label)?;
        let mut memo = ScopedMemo::new(self.store, memo);

        let unexpected = unexpected_defaults(ElementType::Label, &element);
        let label = element.as_label_mut().ok_or(unexpected)?;
        label.begin = anchor;
        label.mid = anchor;
        label.end = anchor;
        label.parent = Some(door);
        if label.class == LabelClass::Text {
            if let Some(text) = door_label_text(memo.text_content.as_deref()) {
                memo.set_text(text)?;
            }
            label.non_breaking = true;
        }
        label.text_way = TextDirection::Parallel;

        self.store.create(&mut element, &memo)
    }

    /// Zone offset from the exported room position, in a new category.
    pub fn create_zone(
        &self,
        room: Point2D,
        room_name: &str,
        room_number: &str,
    ) -> bim_annotate_core::Result<ElementId> {
        let (mut element, memo) = self.store.defaults(ElementType::Zone)?;
        let memo = ScopedMemo::new(self.store, memo);

        let category = self.store.create_attribute_index()?;
        let position = zone_position(room);
        let unexpected = unexpected_defaults(ElementType::Zone, &element);
        let zone = element.as_zone_mut().ok_or(unexpected)?;
        zone.category = category;
        zone.manual = false;
        zone.room_name = fit_room_field(room_name);
        zone.room_number = fit_room_field(room_number);
        zone.pos = position;
        zone.ref_pos = position;

        self.store.create(&mut element, &memo)
    }
}

/// Read the import file and create the annotations it asks for.
pub fn auto_annotate<S: ElementStore + ?Sized>(store: &S, path: &Path) -> Result<SynthesisReport> {
    let mut reader = ImportReader::open(path)?;
    tracing::info!(path = %path.display(), "Synthesizing annotations");
    Ok(Synthesizer::new(store).run(reader.rows()))
}
