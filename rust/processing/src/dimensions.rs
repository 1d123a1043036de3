// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimension sub-element reporting.
//!
//! Each sub-element gets a run-wide sequence number. Its base reference feeds
//! the relationship resolver, and its measured value adds to the dimension's
//! total, written in a summary record after the last sub-element.

use bim_annotate_core::{BoundingBox3D, ElementId, ElementStore, ElementType, ScopedMemo};

use crate::error::Result;
use crate::inspector::Inspector;
use crate::records::{DimensionElementRecord, DimensionRecord, Record};

/// Half-size of the box reported around a dimension sub-element point.
pub const SUB_ELEMENT_HALF_SIZE: f64 = 0.01;

impl<S: ElementStore + ?Sized> Inspector<'_, S> {
    pub(crate) fn report_dimension(&mut self, id: ElementId) -> Result<()> {
        let Some(element) = self.fetch(id, ElementType::Dimension)? else {
            return Ok(());
        };
        let Some(dimension) = element.as_dimension() else {
            return Ok(());
        };

        let mut count = 0;
        let mut total = 0.0;
        match self.store.memo(id) {
            Ok(memo) => {
                let memo = ScopedMemo::new(self.store, memo);
                for (index, elem) in memo.dim_elems.iter().enumerate() {
                    let sequence = self.session.next_sequence();
                    self.session.resolver.record_dimension_base(elem.base.element);

                    let note = elem.note.text().to_string();
                    if !note.is_empty() {
                        self.session
                            .note_dimension(format!("#{} {}: {}", sequence, id, note));
                    }
                    total += elem.value;
                    count += 1;
                    self.stats.dimension_elements += 1;

                    self.emit(Record::DimensionElement(DimensionElementRecord {
                        sequence,
                        index,
                        dimension: id,
                        base: elem.base.element,
                        note,
                        value: elem.value,
                        position: elem.pos,
                        bounds: BoundingBox3D::around_point(elem.base.loc, SUB_ELEMENT_HALF_SIZE),
                    }))?;
                }
            }
            Err(err) => {
                tracing::warn!(guid = %id, error = %err, "Could not read dimension sub-elements");
                self.emit(Record::DimensionError {
                    id,
                    reason: err.to_string(),
                })?;
            }
        }

        let bounds = self
            .store
            .calc_bounds(id)
            .map_err(|err| tracing::debug!(guid = %id, error = %err, "No dimension bounds"))
            .ok();
        self.emit(Record::Dimension(DimensionRecord {
            id,
            line_pen: dimension.line_pen,
            text_position: dimension.text_pos.code(),
            sub_elements: count,
            total,
            bounds,
        }))
    }
}
