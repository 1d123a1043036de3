// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element payloads read from and written to the host.
//!
//! Each element is an identifier plus a type-specific body. Bodies mirror the
//! fields the host exposes for that type; fields the add-on never reads are
//! not modelled.

use serde::{Deserialize, Serialize};

use crate::types::{ElementId, ElementType, Point2D};

/// Text anchor side of a dimension line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextPosition {
    #[default]
    Above,
    Below,
}

impl TextPosition {
    /// Host code printed in the report.
    pub fn code(&self) -> i32 {
        match self {
            TextPosition::Above => 1,
            TextPosition::Below => 2,
        }
    }
}

/// Direction text runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextDirection {
    #[default]
    Horizontal,
    Vertical,
    /// Parallel to the element the annotation belongs to.
    Parallel,
}

/// Dimension appearance style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DimAppearance {
    #[default]
    Normal,
    Elevation,
}

/// Whether a label shows free text or a library symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelClass {
    #[default]
    Text,
    Symbol,
}

/// Index into a host attribute table (zone categories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AttributeIndex(pub u32);

/// Straight wall along a plan reference line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Wall {
    /// Reference line start.
    pub begin: Point2D,
    /// Reference line end.
    pub end: Point2D,
    pub thickness: f64,
    pub height: f64,
}

impl Wall {
    /// Plan length between the two reference-line endpoints.
    pub fn plan_length(&self) -> f64 {
        self.begin.distance_to(&self.end)
    }
}

/// Door opening placed in a wall.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Door {
    /// Opening width.
    pub width: f64,
    /// Opening height.
    pub height: f64,
    /// Marker placed with the door, null GUID when none.
    pub marker: Option<ElementId>,
}

impl Door {
    /// Marker reference, treating the null GUID as absent.
    pub fn marker(&self) -> Option<ElementId> {
        self.marker.filter(|id| !id.is_null())
    }
}

/// Floor or roof slab.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Slab {
    pub thickness: f64,
    /// Top elevation relative to the story.
    pub level: f64,
}

/// Room zone with its stamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    /// Zone stamp element, null GUID when none.
    pub stamp: Option<ElementId>,
    /// Stamp position
    pub pos: Point2D,
    /// Reference point of the zone.
    pub ref_pos: Point2D,
    pub room_name: String,
    pub room_number: String,
    pub room_height: f64,
    /// Zone category attribute.
    pub category: AttributeIndex,
    /// Polygon drawn by hand rather than detected from walls.
    pub manual: bool,
}

impl Zone {
    /// Stamp reference, treating the null GUID as absent.
    pub fn stamp(&self) -> Option<ElementId> {
        self.stamp.filter(|id| !id.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimension {
    pub line_pen: i16,
    pub text_pos: TextPosition,
    pub text_way: TextDirection,
    pub appearance: DimAppearance,
    /// Reference coordinate the dimension line passes through.
    pub ref_c: Point2D,
    /// Unit direction of the dimension line.
    pub direction: Point2D,
    /// Number of sub-elements carried in the memo.
    pub n_dim_elem: usize,
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            line_pen: 1,
            text_pos: TextPosition::Above,
            text_way: TextDirection::Horizontal,
            appearance: DimAppearance::Normal,
            ref_c: Point2D::default(),
            direction: Point2D::new(1.0, 0.0),
            n_dim_elem: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub parent: Option<ElementId>,
    pub begin: Point2D,
    pub mid: Point2D,
    pub end: Point2D,
    pub class: LabelClass,
    pub text_way: TextDirection,
    pub non_breaking: bool,
}

/// Polygon shape header; the coordinates themselves live in the memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolygonHeader {
    pub n_coords: usize,
    pub n_sub_polys: usize,
    pub n_arcs: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Detail {
    pub pos: Point2D,
    pub poly: PolygonHeader,
}

/// Type-specific element body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementBody {
    Wall(Wall),
    Door(Door),
    Slab(Slab),
    Zone(Zone),
    Dimension(Dimension),
    Label(Label),
    Detail(Detail),
}

impl ElementBody {
    /// Default body for a type, before host defaults are applied.
    pub fn default_for(ty: ElementType) -> Self {
        match ty {
            ElementType::Wall => ElementBody::Wall(Wall::default()),
            ElementType::Door => ElementBody::Door(Door::default()),
            ElementType::Slab => ElementBody::Slab(Slab::default()),
            ElementType::Zone => ElementBody::Zone(Zone::default()),
            ElementType::Dimension => ElementBody::Dimension(Dimension::default()),
            ElementType::Label => ElementBody::Label(Label::default()),
            ElementType::Detail => ElementBody::Detail(Detail::default()),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementBody::Wall(_) => ElementType::Wall,
            ElementBody::Door(_) => ElementType::Door,
            ElementBody::Slab(_) => ElementType::Slab,
            ElementBody::Zone(_) => ElementType::Zone,
            ElementBody::Dimension(_) => ElementType::Dimension,
            ElementBody::Label(_) => ElementType::Label,
            ElementBody::Detail(_) => ElementType::Detail,
        }
    }
}

/// A model element: identifier plus body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub id: ElementId,
    #[serde(flatten)]
    pub body: ElementBody,
}

macro_rules! body_accessors {
    ($($ty:ident => $get:ident, $get_mut:ident;)*) => {
        $(
            pub fn $get(&self) -> Option<&$ty> {
                match &self.body {
                    ElementBody::$ty(b) => Some(b),
                    _ => None,
                }
            }

            pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                match &mut self.body {
                    ElementBody::$ty(b) => Some(b),
                    _ => None,
                }
            }
        )*
    };
}

impl Element {
    pub fn new(id: ElementId, body: ElementBody) -> Self {
        Self { id, body }
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.body.element_type()
    }

    body_accessors! {
        Wall => as_wall, as_wall_mut;
        Door => as_door, as_door_mut;
        Slab => as_slab, as_slab_mut;
        Zone => as_zone, as_zone_mut;
        Dimension => as_dimension, as_dimension_mut;
        Label => as_label, as_label_mut;
        Detail => as_detail, as_detail_mut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_plan_length() {
        let wall = Wall {
            begin: Point2D::new(1.0, 1.0),
            end: Point2D::new(4.0, 5.0),
            thickness: 0.3,
            height: 2.7,
        };
        assert_eq!(wall.plan_length(), 5.0);
    }

    #[test]
    fn null_references_are_absent() {
        let door = Door {
            marker: Some(ElementId::NULL),
            ..Default::default()
        };
        assert!(door.marker().is_none());

        let zone = Zone {
            stamp: Some(ElementId::new_v4()),
            ..Default::default()
        };
        assert!(zone.stamp().is_some());
    }

    #[test]
    fn accessors_match_body() {
        let el = Element::new(ElementId::new_v4(), ElementBody::default_for(ElementType::Door));
        assert_eq!(el.element_type(), ElementType::Door);
        assert!(el.as_door().is_some());
        assert!(el.as_wall().is_none());
    }

    #[test]
    fn element_json_is_type_tagged() {
        let json = r#"{
            "id": "0E9D4A3C-1B2F-4C5D-8E6F-7A8B9C0D1E2F",
            "type": "Slab",
            "thickness": 0.25,
            "level": 0.0
        }"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.element_type(), ElementType::Slab);
        assert_eq!(el.as_slab().unwrap().thickness, 0.25);
    }
}
