// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Import file reading.
//!
//! The import file is the comma-separated element export: one header line,
//! then one row per element. Rows are checked one at a time; a bad row is
//! handed back as a [`RejectedRow`] carrying its raw text so the caller can
//! log it and go on with the next one.

use bim_annotate_core::{BoundingBox3D, ImportColumn, LabelType, Point2D};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, RowError};

/// Annotation work derived from one row.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationRequest {
    /// Linear dimension along a wall.
    WallDimension { bounds: BoundingBox3D, width: f64 },
    /// Marker next to a door plus a label attached to it.
    DoorMarker {
        /// Minimum plan corner of the door's box.
        corner: Point2D,
        /// Door GUID column, `None` when empty.
        door: Option<String>,
    },
    /// Zone stamped at the room position.
    Zone {
        position: Point2D,
        room_name: String,
        room_number: String,
    },
}

/// One data row of the import file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedElementRow {
    /// Line number in the file, 1-based.
    pub line: u64,
    pub fields: Vec<String>,
}

impl ImportedElementRow {
    pub fn new(line: u64, fields: Vec<String>) -> std::result::Result<Self, RowError> {
        if fields.len() < ImportColumn::MIN_FIELDS {
            return Err(RowError::TooFewFields {
                found: fields.len(),
                required: ImportColumn::MIN_FIELDS,
            });
        }
        Ok(Self { line, fields })
    }

    /// The row as it appeared in the file, for logging.
    pub fn raw(&self) -> String {
        self.fields.join(",")
    }

    pub fn text(&self, column: ImportColumn) -> std::result::Result<&str, RowError> {
        self.fields
            .get(column.index())
            .map(String::as_str)
            .ok_or(RowError::MissingColumn(column))
    }

    pub fn number(&self, column: ImportColumn) -> std::result::Result<f64, RowError> {
        let text = self.text(column)?;
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(RowError::InvalidNumber {
                column,
                value: text.to_string(),
            }),
        }
    }

    /// Label type requested by the row; `None` for codes that are not known.
    pub fn label_type(&self) -> std::result::Result<Option<LabelType>, RowError> {
        let code = self.number(ImportColumn::LabelType)?;
        if code.fract() != 0.0 || code < i32::MIN as f64 || code > i32::MAX as f64 {
            return Ok(None);
        }
        Ok(LabelType::from_code(code as i32))
    }

    /// Plan-view bounding box from the min/max columns, at elevation zero.
    pub fn plan_bounds(&self) -> std::result::Result<BoundingBox3D, RowError> {
        let x_min = self.number(ImportColumn::BboxXMin)?;
        let y_min = self.number(ImportColumn::BboxYMin)?;
        let x_max = self.number(ImportColumn::BboxXMax)?;
        let y_max = self.number(ImportColumn::BboxYMax)?;
        Ok(BoundingBox3D::new([x_min, y_min, 0.0], [x_max, y_max, 0.0]))
    }

    /// Work requested by this row. Rows whose label type needs nothing
    /// created give `None`.
    pub fn request(&self) -> std::result::Result<Option<AnnotationRequest>, RowError> {
        let request = match self.label_type()? {
            Some(LabelType::Dimension) => AnnotationRequest::WallDimension {
                bounds: self.plan_bounds()?,
                width: self.number(ImportColumn::WallWidth)?,
            },
            Some(LabelType::Label) => {
                let corner = Point2D::new(
                    self.number(ImportColumn::BboxXMin)?,
                    self.number(ImportColumn::BboxYMin)?,
                );
                let door = self.text(ImportColumn::ElementGuid)?.trim();
                AnnotationRequest::DoorMarker {
                    corner,
                    door: (!door.is_empty()).then(|| door.to_string()),
                }
            }
            Some(LabelType::ZoneStamp) => AnnotationRequest::Zone {
                position: Point2D::new(
                    self.number(ImportColumn::ZonePosX)?,
                    self.number(ImportColumn::ZonePosY)?,
                ),
                room_name: self.text(ImportColumn::RoomName)?.to_string(),
                room_number: self.text(ImportColumn::RoomNumber)?.to_string(),
            },
            _ => return Ok(None),
        };
        Ok(Some(request))
    }
}

/// A row that could not be turned into an [`ImportedElementRow`].
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: u64,
    pub raw: String,
    pub error: RowError,
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Reads import rows, skipping the header line.
pub struct ImportReader<R: Read> {
    reader: csv::Reader<R>,
}

impl ImportReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let reader = reader_builder().from_path(path)?;
        tracing::debug!(path = %path.display(), "Opened import file");
        Ok(Self { reader })
    }
}

impl<R: Read> ImportReader<R> {
    pub fn from_reader(input: R) -> Self {
        Self {
            reader: reader_builder().from_reader(input),
        }
    }

    /// Data rows in file order.
    pub fn rows(
        &mut self,
    ) -> impl Iterator<Item = std::result::Result<ImportedElementRow, RejectedRow>> + '_ {
        self.reader.records().map(|result| match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line());
                let fields: Vec<String> = record.iter().map(str::to_string).collect();
                let raw = fields.join(",");
                ImportedElementRow::new(line, fields).map_err(|error| RejectedRow {
                    line,
                    raw,
                    error,
                })
            }
            Err(err) => Err(RejectedRow {
                line: err.position().map_or(0, |p| p.line()),
                raw: String::new(),
                error: RowError::Unreadable(err.to_string()),
            }),
        })
    }
}
