// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement geometry for new annotation elements.
//!
//! Pure functions of the exported plan bounds; nothing here talks to the
//! host.

use bim_annotate_core::{BoundingBox3D, Point2D, TextDirection, TextPosition};

/// Pen of door marker symbols.
pub const MARKER_PEN: i16 = 3;

/// Offset of the marker anchor from the door's minimum corner.
pub const MARKER_ANCHOR_OFFSET: (f64, f64) = (0.5, -0.5);

/// Offset of the marker symbol from the marker anchor.
pub const MARKER_SYMBOL_OFFSET: (f64, f64) = (1.5, 1.0);

/// Distance between a door's minimum y and its label.
pub const DOOR_LABEL_DROP: f64 = 0.25;

/// Offset of a new zone from the exported room position.
pub const ZONE_OFFSET: (f64, f64) = (1.0, -1.0);

/// Label text used when the default text is too short to read.
pub const DOOR_LABEL_TEXT: &str = "Door";

/// Shortest label text kept as is.
pub const MIN_LABEL_TEXT_LEN: usize = 2;

/// Capacity of the host's room name and room number fields.
pub const ROOM_FIELD_CAPACITY: usize = 255;

/// Geometry of a two-point linear dimension along a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionPlan {
    pub horizontal: bool,
    /// Point the dimension line passes through.
    pub ref_c: Point2D,
    pub direction: Point2D,
    pub text_pos: TextPosition,
    pub text_way: TextDirection,
    /// Measured points, in chain order.
    pub points: [Point2D; 2],
}

/// A wall is horizontal when its box is wider than it is deep; equal extents
/// count as vertical.
pub fn is_horizontal(bounds: &BoundingBox3D) -> bool {
    bounds.y_extent() < bounds.x_extent()
}

/// Dimension line along the long side of a wall's box, offset away from it.
///
/// Horizontal walls at or below y = 0 get the line below the wall with the
/// text under it; walls above get the line two widths higher with the text on
/// top. Vertical walls mirror this on x with the text sides swapped.
pub fn plan_wall_dimension(bounds: &BoundingBox3D, width: f64) -> DimensionPlan {
    let min = Point2D::new(bounds.x_min, bounds.y_min);
    if is_horizontal(bounds) {
        let (dy, text_pos) = if bounds.y_min <= 0.0 {
            (-width, TextPosition::Below)
        } else {
            (2.0 * width, TextPosition::Above)
        };
        DimensionPlan {
            horizontal: true,
            ref_c: min.offset(0.0, dy),
            direction: Point2D::new(1.0, 0.0),
            text_pos,
            text_way: TextDirection::Horizontal,
            points: [min, Point2D::new(bounds.x_max, bounds.y_min)],
        }
    } else {
        let (dx, text_pos) = if bounds.x_min <= 0.0 {
            (-width, TextPosition::Above)
        } else {
            (2.0 * width, TextPosition::Below)
        };
        DimensionPlan {
            horizontal: false,
            ref_c: min.offset(dx, 0.0),
            direction: Point2D::new(0.0, 1.0),
            text_pos,
            text_way: TextDirection::Vertical,
            points: [min, Point2D::new(bounds.x_min, bounds.y_max)],
        }
    }
}

/// Anchor of a door marker, just outside the door's minimum corner.
pub fn marker_anchor(corner: Point2D) -> Point2D {
    corner.offset(MARKER_ANCHOR_OFFSET.0, MARKER_ANCHOR_OFFSET.1)
}

/// Closed diamond of unit radius around the anchor: west, south, east,
/// north, then west again.
pub fn marker_polygon(anchor: Point2D) -> [Point2D; 5] {
    let west = anchor.offset(-1.0, 0.0);
    [
        west,
        anchor.offset(0.0, -1.0),
        anchor.offset(1.0, 0.0),
        anchor.offset(0.0, 1.0),
        west,
    ]
}

pub fn marker_symbol_position(anchor: Point2D) -> Point2D {
    anchor.offset(MARKER_SYMBOL_OFFSET.0, MARKER_SYMBOL_OFFSET.1)
}

/// Label anchor centred under the door, from its minimum corner and maximum x.
pub fn door_label_anchor(corner: Point2D, x_max: f64) -> Point2D {
    Point2D::new((corner.x + x_max) / 2.0, corner.y - DOOR_LABEL_DROP)
}

pub fn zone_position(room: Point2D) -> Point2D {
    room.offset(ZONE_OFFSET.0, ZONE_OFFSET.1)
}

/// Text to put on a door label given the default text.
pub fn door_label_text(default: Option<&str>) -> Option<&'static str> {
    match default {
        Some(text) if text.chars().count() >= MIN_LABEL_TEXT_LEN => None,
        _ => Some(DOOR_LABEL_TEXT),
    }
}

/// Cut a room field down to the host's capacity.
pub fn fit_room_field(text: &str) -> String {
    text.chars().take(ROOM_FIELD_CAPACITY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plan_box(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> BoundingBox3D {
        BoundingBox3D::new([x_min, y_min, 0.0], [x_max, y_max, 0.0])
    }

    #[test]
    fn horizontal_wall_on_axis_gets_line_below() {
        let plan = plan_wall_dimension(&plan_box(0.0, 0.0, 5.0, 0.2), 0.2);
        assert!(plan.horizontal);
        assert_relative_eq!(plan.ref_c.x, 0.0);
        assert_relative_eq!(plan.ref_c.y, -0.2);
        assert_eq!(plan.text_pos, TextPosition::Below);
        assert_eq!(plan.text_way, TextDirection::Horizontal);
        assert_eq!(plan.direction, Point2D::new(1.0, 0.0));
        assert_eq!(plan.points, [Point2D::new(0.0, 0.0), Point2D::new(5.0, 0.0)]);
    }

    #[test]
    fn horizontal_wall_above_axis_gets_line_above() {
        let plan = plan_wall_dimension(&plan_box(1.0, 3.0, 6.0, 3.3), 0.3);
        assert_relative_eq!(plan.ref_c.y, 3.6);
        assert_eq!(plan.text_pos, TextPosition::Above);
    }

    #[test]
    fn vertical_wall_offsets_mirror_on_x() {
        let left = plan_wall_dimension(&plan_box(-0.2, 0.0, 0.0, 4.0), 0.2);
        assert!(!left.horizontal);
        assert_relative_eq!(left.ref_c.x, -0.4);
        assert_eq!(left.text_pos, TextPosition::Above);
        assert_eq!(left.direction, Point2D::new(0.0, 1.0));
        assert_eq!(left.points[1], Point2D::new(-0.2, 4.0));

        let right = plan_wall_dimension(&plan_box(2.0, 0.0, 2.2, 4.0), 0.2);
        assert_relative_eq!(right.ref_c.x, 2.4);
        assert_eq!(right.text_pos, TextPosition::Below);
        assert_eq!(right.text_way, TextDirection::Vertical);
    }

    #[test]
    fn square_box_counts_as_vertical() {
        assert!(!is_horizontal(&plan_box(0.0, 0.0, 1.0, 1.0)));
        assert!(is_horizontal(&plan_box(0.0, 0.0, 1.0, 0.99)));
    }

    #[test]
    fn marker_geometry() {
        let anchor = marker_anchor(Point2D::new(2.0, 3.0));
        assert_eq!(anchor, Point2D::new(2.5, 2.5));
        let poly = marker_polygon(anchor);
        assert_eq!(poly[0], Point2D::new(1.5, 2.5));
        assert_eq!(poly[1], Point2D::new(2.5, 1.5));
        assert_eq!(poly[2], Point2D::new(3.5, 2.5));
        assert_eq!(poly[3], Point2D::new(2.5, 3.5));
        assert_eq!(poly[4], poly[0]);
        assert_eq!(marker_symbol_position(anchor), Point2D::new(4.0, 3.5));
    }

    #[test]
    fn label_sits_under_door_centre() {
        let anchor = door_label_anchor(Point2D::new(2.0, 3.0), 3.0);
        assert_relative_eq!(anchor.x, 2.5);
        assert_relative_eq!(anchor.y, 2.75);
    }

    #[test]
    fn short_label_text_is_replaced() {
        assert_eq!(door_label_text(None), Some("Door"));
        assert_eq!(door_label_text(Some("")), Some("Door"));
        assert_eq!(door_label_text(Some("D")), Some("Door"));
        assert_eq!(door_label_text(Some("D1")), None);
    }

    #[test]
    fn zone_and_room_fields() {
        assert_eq!(zone_position(Point2D::new(3.0, 4.0)), Point2D::new(4.0, 3.0));
        let long = "x".repeat(300);
        assert_eq!(fit_room_field(&long).len(), ROOM_FIELD_CAPACITY);
        assert_eq!(fit_room_field("Hall"), "Hall");
    }
}
