// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element Inspector: one report record per element of interest.
//!
//! Types are walked in a fixed order. Dimensions come first so that every
//! wall measured by a dimension is flagged before walls are classified, and
//! walls come before doors so that embedded doors know their wall.
//!
//! Host failures on a single element never stop the pass: missing info
//! strings and bounds are reported as "Not available", and an element that
//! cannot be read at all gets an error record.

use bim_annotate_core::{
    get_typed, Element, ElementId, ElementStore, ElementType, LabelType, ScopedMemo,
    NOT_AVAILABLE,
};
use serde::Serialize;
use std::time::Instant;

use crate::error::Result;
use crate::records::{
    AttachedLabel, DoorRecord, ElementRecord, Record, RecordTail, WallRecord, ZoneRecord,
};
use crate::report::ReportSink;
use crate::session::Session;

/// Order in which element types are inspected.
pub const INSPECTION_ORDER: [ElementType; 5] = [
    ElementType::Dimension,
    ElementType::Wall,
    ElementType::Slab,
    ElementType::Zone,
    ElementType::Door,
];

/// Counts from one inspection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectionStats {
    /// Records written, including error records.
    pub records: usize,
    pub error_records: usize,
    pub dimension_elements: usize,
    /// Types whose element list could not be read.
    pub skipped_types: Vec<ElementType>,
}

/// Run a full inspection pass over the model.
///
/// The session is reset first; its summary sections are handed to the sink
/// after the last record.
pub fn inspect_model<S: ElementStore + ?Sized>(
    store: &S,
    session: &mut Session,
    sink: &mut dyn ReportSink,
) -> Result<InspectionStats> {
    let start = Instant::now();
    session.reset();
    sink.begin()?;

    let stats = {
        let mut inspector = Inspector::new(store, session, sink);
        inspector.run()?;
        inspector.stats
    };

    sink.finish(&session.summary_sections())?;

    tracing::info!(
        records = stats.records,
        errors = stats.error_records,
        dimension_elements = stats.dimension_elements,
        embedded_doors = session.resolver.embedded_door_count(),
        dimensioned_walls = session.resolver.dimensioned_wall_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Inspection complete"
    );
    Ok(stats)
}

pub(crate) struct Inspector<'a, S: ElementStore + ?Sized> {
    pub(crate) store: &'a S,
    pub(crate) session: &'a mut Session,
    sink: &'a mut dyn ReportSink,
    pub(crate) stats: InspectionStats,
}

impl<'a, S: ElementStore + ?Sized> Inspector<'a, S> {
    pub(crate) fn new(store: &'a S, session: &'a mut Session, sink: &'a mut dyn ReportSink) -> Self {
        Self {
            store,
            session,
            sink,
            stats: InspectionStats::default(),
        }
    }

    fn run(&mut self) -> Result<()> {
        for ty in INSPECTION_ORDER {
            let ids = match self.store.element_list(ty) {
                Ok(ids) => ids,
                Err(err) => {
                    tracing::warn!(element_type = %ty, error = %err, "Could not list elements");
                    self.stats.skipped_types.push(ty);
                    continue;
                }
            };
            tracing::debug!(element_type = %ty, count = ids.len(), "Inspecting elements");

            for id in ids {
                match ty {
                    ElementType::Dimension => self.report_dimension(id)?,
                    ElementType::Wall => self.inspect_wall(id)?,
                    ElementType::Zone => self.inspect_zone(id)?,
                    ElementType::Door => self.inspect_door(id)?,
                    other => self.inspect_generic(id, other)?,
                }
            }
        }
        Ok(())
    }

    pub(crate) fn emit(&mut self, record: Record) -> Result<()> {
        self.stats.records += 1;
        if record.is_error() {
            self.stats.error_records += 1;
        }
        self.sink.record(&record)
    }

    /// Read an element of the expected type, writing an error record when
    /// that fails.
    pub(crate) fn fetch(&mut self, id: ElementId, expected: ElementType) -> Result<Option<Element>> {
        match get_typed(self.store, id, expected) {
            Ok(element) => Ok(Some(element)),
            Err(err) => {
                tracing::warn!(guid = %id, element_type = %expected, error = %err, "Could not read element");
                self.emit(Record::Error {
                    id,
                    element_type: expected,
                    reason: err.to_string(),
                })?;
                Ok(None)
            }
        }
    }

    fn tail(&self, id: ElementId, label_type: LabelType) -> RecordTail {
        let info = self
            .store
            .info_string(id)
            .map_err(|err| tracing::debug!(guid = %id, error = %err, "No info string"))
            .ok();
        let bounds = self
            .store
            .calc_bounds(id)
            .map_err(|err| tracing::debug!(guid = %id, error = %err, "No bounds"))
            .ok();
        RecordTail {
            info,
            bounds,
            label_type,
        }
    }

    fn type_name(&self, ty: ElementType) -> String {
        self.store.type_name(ty).unwrap_or_else(|err| {
            tracing::debug!(element_type = %ty, error = %err, "No type name, using type code");
            ty.code().to_string()
        })
    }

    fn connected_labels(&self, id: ElementId) -> Vec<AttachedLabel> {
        match self.store.connected_elements(id, ElementType::Label) {
            Ok(labels) => labels
                .into_iter()
                .map(|label| AttachedLabel {
                    id: label,
                    bounds: self.store.calc_bounds(label).ok(),
                })
                .collect(),
            Err(err) => {
                tracing::warn!(guid = %id, error = %err, "Could not read connected labels");
                Vec::new()
            }
        }
    }

    fn inspect_zone(&mut self, id: ElementId) -> Result<()> {
        let Some(element) = self.fetch(id, ElementType::Zone)? else {
            return Ok(());
        };
        let Some(zone) = element.as_zone() else {
            return Ok(());
        };

        let stamp = zone.stamp();
        let stamp_bounds = stamp.and_then(|stamp| match self.store.calc_bounds(stamp) {
            Ok(bounds) => Some(bounds),
            Err(err) => {
                tracing::warn!(zone = %id, stamp = %stamp, error = %err, "Zone stamp bounds not available");
                None
            }
        });
        let label_type = if stamp.is_some() {
            LabelType::ZoneStamp
        } else {
            LabelType::None
        };

        if let Some(stamp) = stamp {
            let bounds = stamp_bounds
                .map(|b| b.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            self.session.note_zone_stamp(format!(
                "Zone {}: stamp {} at {}, bounds {}",
                id, stamp, zone.pos, bounds
            ));
        }

        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let record = ZoneRecord {
            id,
            stamp,
            position: zone.pos,
            room_name: non_empty(&zone.room_name),
            room_number: non_empty(&zone.room_number),
            room_height: zone.room_height,
            stamp_bounds,
            tail: self.tail(id, label_type),
        };
        self.emit(Record::Zone(record))
    }

    fn inspect_door(&mut self, id: ElementId) -> Result<()> {
        let Some(element) = self.fetch(id, ElementType::Door)? else {
            return Ok(());
        };
        let Some(door) = element.as_door() else {
            return Ok(());
        };

        let marker = door.marker();
        let labels = self.connected_labels(id);
        let wall = self.session.resolver.containing_wall(id);
        let label_type = if marker.is_some() {
            LabelType::Marker
        } else if !labels.is_empty() {
            LabelType::Label
        } else {
            LabelType::None
        };

        for label in &labels {
            let bounds = label
                .bounds
                .map(|b| b.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            self.session
                .note_door_label(format!("Door {}: label {} {}", id, label.id, bounds));
        }

        let record = DoorRecord {
            id,
            marker,
            width: door.width,
            height: door.height,
            labels,
            wall,
            tail: self.tail(id, label_type),
        };
        self.emit(Record::Door(record))
    }

    fn inspect_wall(&mut self, id: ElementId) -> Result<()> {
        let Some(element) = self.fetch(id, ElementType::Wall)? else {
            return Ok(());
        };
        let Some(wall) = element.as_wall() else {
            return Ok(());
        };

        let doors = match self.store.memo(id) {
            Ok(memo) => {
                let memo = ScopedMemo::new(self.store, memo);
                memo.wall_doors.clone()
            }
            Err(err) => {
                tracing::warn!(guid = %id, error = %err, "Could not read embedded doors");
                Vec::new()
            }
        };
        self.session.resolver.record_wall_doors(id, &doors);

        let label_type = if self.session.resolver.has_dimension(id) {
            LabelType::Dimension
        } else {
            LabelType::None
        };
        let record = WallRecord {
            id,
            type_name: self.type_name(ElementType::Wall),
            length: wall.plan_length(),
            thickness: wall.thickness,
            height: wall.height,
            doors,
            tail: self.tail(id, label_type),
        };
        self.emit(Record::Wall(record))
    }

    fn inspect_generic(&mut self, id: ElementId, ty: ElementType) -> Result<()> {
        if self.fetch(id, ty)?.is_none() {
            return Ok(());
        }
        let label_type = if self.connected_labels(id).is_empty() {
            LabelType::None
        } else {
            LabelType::Label
        };
        let record = ElementRecord {
            id,
            type_name: self.type_name(ty),
            tail: self.tail(id, label_type),
        };
        self.emit(Record::Element(record))
    }
}
