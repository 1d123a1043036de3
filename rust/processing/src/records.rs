// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report records, one per inspected element or dimension sub-element.
//!
//! `Display` renders the text report line; `Serialize` renders the same
//! fields, in the same order, for the JSON-lines report.

use bim_annotate_core::{
    BoundingBox3D, ElementId, ElementRef, ElementType, LabelType, Point2D, NOT_AVAILABLE,
};
use serde::Serialize;
use std::fmt;

/// Fields every element record ends with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordTail {
    /// Host info string, `None` when the host could not provide it.
    pub info: Option<String>,
    /// Overall bounds, `None` when the host could not compute them.
    pub bounds: Option<BoundingBox3D>,
    /// Annotation the element already carries.
    pub label_type: LabelType,
}

impl fmt::Display for RecordTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ", Info String: {}", self.info.as_deref().unwrap_or(NOT_AVAILABLE))?;
        write!(f, ", Bounding Box: {}", OptBounds(self.bounds.as_ref()))?;
        write!(f, ", Label Type: {}", self.label_type)
    }
}

struct OptBounds<'a>(Option<&'a BoundingBox3D>);

impl fmt::Display for OptBounds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(b) => write!(f, "{}", b),
            None => f.write_str(NOT_AVAILABLE),
        }
    }
}

fn join_ids(ids: &[ElementId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Zone with its stamp and room fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRecord {
    pub id: ElementId,
    /// Zone stamp element, if any.
    pub stamp: Option<ElementId>,
    /// Stamp position.
    pub position: Point2D,
    /// Room name, `None` when empty.
    pub room_name: Option<String>,
    /// Room number, `None` when empty.
    pub room_number: Option<String>,
    pub room_height: f64,
    /// Bounds of the stamp element, `None` when not obtainable.
    pub stamp_bounds: Option<BoundingBox3D>,
    #[serde(flatten)]
    pub tail: RecordTail,
}

/// A label attached to an element, with its bounds when obtainable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachedLabel {
    /// Label element.
    pub id: ElementId,
    /// Label bounds, `None` when not obtainable.
    pub bounds: Option<BoundingBox3D>,
}

/// Door with its marker, labels and containing wall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorRecord {
    pub id: ElementId,
    /// Marker placed with the door, if any.
    pub marker: Option<ElementId>,
    /// Opening width.
    pub width: f64,
    /// Opening height.
    pub height: f64,
    /// Labels attached to the door.
    pub labels: Vec<AttachedLabel>,
    /// Wall the door is embedded in.
    pub wall: Option<ElementId>,
    #[serde(flatten)]
    pub tail: RecordTail,
}

/// Wall with its dimensions and embedded doors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallRecord {
    pub id: ElementId,
    /// Host type name, or the type code when the host has none.
    pub type_name: String,
    /// Plan length of the reference line.
    pub length: f64,
    pub thickness: f64,
    pub height: f64,
    /// Doors embedded in the wall.
    pub doors: Vec<ElementId>,
    #[serde(flatten)]
    pub tail: RecordTail,
}

/// Slabs and any other type without specific fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementRecord {
    pub id: ElementId,
    pub type_name: String,
    #[serde(flatten)]
    pub tail: RecordTail,
}

/// Summary of one dimension, written after its sub-elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionRecord {
    pub id: ElementId,
    pub line_pen: i16,
    /// Text position code.
    pub text_position: i32,
    /// Number of sub-elements reported.
    pub sub_elements: usize,
    /// Sum of the measured values of all sub-elements.
    pub total: f64,
    pub bounds: Option<BoundingBox3D>,
}

/// One measured point of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionElementRecord {
    /// Run-wide sequence number.
    pub sequence: u64,
    /// Position within the owning dimension.
    pub index: usize,
    /// Owning dimension.
    pub dimension: ElementId,
    /// Element the point measures.
    pub base: Option<ElementRef>,
    /// Note text, rich text preferred.
    pub note: String,
    pub value: f64,
    /// Source position of the sub-element.
    pub position: Point2D,
    /// Small box around the base point.
    pub bounds: BoundingBox3D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Zone(ZoneRecord),
    Door(DoorRecord),
    Wall(WallRecord),
    Element(ElementRecord),
    Dimension(DimensionRecord),
    DimensionElement(DimensionElementRecord),
    /// Sub-elements of a dimension could not be read.
    DimensionError { id: ElementId, reason: String },
    /// The element itself could not be read.
    Error {
        id: ElementId,
        element_type: ElementType,
        reason: String,
    },
}

impl Record {
    pub fn id(&self) -> ElementId {
        match self {
            Record::Zone(r) => r.id,
            Record::Door(r) => r.id,
            Record::Wall(r) => r.id,
            Record::Element(r) => r.id,
            Record::Dimension(r) => r.id,
            Record::DimensionElement(r) => r.dimension,
            Record::DimensionError { id, .. } | Record::Error { id, .. } => *id,
        }
    }

    /// Label type of element records.
    pub fn label_type(&self) -> Option<LabelType> {
        match self {
            Record::Zone(r) => Some(r.tail.label_type),
            Record::Door(r) => Some(r.tail.label_type),
            Record::Wall(r) => Some(r.tail.label_type),
            Record::Element(r) => Some(r.tail.label_type),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Record::DimensionError { .. } | Record::Error { .. })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Zone(r) => {
                let stamp = r.stamp.unwrap_or(ElementId::NULL);
                write!(
                    f,
                    "Zone ID: {}, Zone Stamp GUID: {}, Position: {}",
                    r.id, stamp, r.position
                )?;
                if let Some(name) = &r.room_name {
                    write!(f, ", Room Name: {}", name)?;
                }
                if let Some(number) = &r.room_number {
                    write!(f, ", Room Number: {}", number)?;
                }
                write!(f, ", Room Height: {:.2}", r.room_height)?;
                write!(f, ", Zone Stamp Bounding Box: {}", OptBounds(r.stamp_bounds.as_ref()))?;
                write!(f, "{}", r.tail)
            }
            Record::Door(r) => {
                let marker = r.marker.unwrap_or(ElementId::NULL);
                write!(
                    f,
                    "Door Element, GUID: {}, Marker GUID: {}, Width: {:.2}, Height: {:.2}",
                    r.id, marker, r.width, r.height
                )?;
                if !r.labels.is_empty() {
                    let labels: Vec<String> = r
                        .labels
                        .iter()
                        .map(|l| format!("{} {}", l.id, OptBounds(l.bounds.as_ref())))
                        .collect();
                    write!(f, ", Labels: [{}]", labels.join("; "))?;
                }
                match r.wall {
                    Some(wall) => write!(f, ", Wall: {}", wall)?,
                    None => f.write_str(", Wall: Not embedded")?,
                }
                write!(f, "{}", r.tail)
            }
            Record::Wall(r) => {
                write!(
                    f,
                    "Element Type: {}, GUID: {}, Length: {:.2}, Thickness: {:.2}, Height: {:.2}",
                    r.type_name, r.id, r.length, r.thickness, r.height
                )?;
                if !r.doors.is_empty() {
                    write!(f, ", Embedded Doors: [{}]", join_ids(&r.doors))?;
                }
                write!(f, "{}", r.tail)
            }
            Record::Element(r) => {
                write!(f, "Element Type: {}, GUID: {}{}", r.type_name, r.id, r.tail)
            }
            Record::Dimension(r) => write!(
                f,
                "Linear Dimension, GUID: {}, Line Pen: {}, Text Position: {}, Sub-elements: {}, Total: {:.2}, Bounding Box: {}",
                r.id,
                r.line_pen,
                r.text_position,
                r.sub_elements,
                r.total,
                OptBounds(r.bounds.as_ref())
            ),
            Record::DimensionElement(r) => {
                let base = r
                    .base
                    .map(|b| b.id.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                write!(
                    f,
                    "Dimension element [{}] #{} GUID: {} is associated with Element GUID: {}, Note: {}, Value: {:.2}, Position: {}, Bounding Box: {}",
                    r.index, r.sequence, r.dimension, base, r.note, r.value, r.position, r.bounds
                )
            }
            Record::DimensionError { id, reason } => write!(
                f,
                "Linear Dimension, GUID: {}, Sub-elements: Not available ({})",
                id, reason
            ),
            Record::Error {
                id,
                element_type,
                reason,
            } => write!(
                f,
                "Error or Unsupported Element Type, GUID: {}, Type: {} ({})",
                id, element_type, reason
            ),
        }
    }
}
