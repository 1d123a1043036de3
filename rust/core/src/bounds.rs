// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned 3D bounding boxes as reported by the host geometry kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Point2D;

/// Axis-aligned bounding box in f64 precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3D {
    pub x_min: f64,
    pub y_min: f64,
    pub z_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_max: f64,
}

impl BoundingBox3D {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            x_min: min[0],
            y_min: min[1],
            z_min: min[2],
            x_max: max[0],
            y_max: max[1],
            z_max: max[2],
        }
    }

    /// Create an empty box that any expanded point will replace.
    pub fn empty() -> Self {
        Self {
            x_min: f64::MAX,
            y_min: f64::MAX,
            z_min: f64::MAX,
            x_max: f64::MIN,
            y_max: f64::MIN,
            z_max: f64::MIN,
        }
    }

    /// Box of half-size `half` around a plan point at elevation zero.
    ///
    /// Dimension sub-elements are points, so their reported extent is a
    /// small cube around the point.
    pub fn around_point(p: Point2D, half: f64) -> Self {
        Self {
            x_min: p.x - half,
            y_min: p.y - half,
            z_min: -half,
            x_max: p.x + half,
            y_max: p.y + half,
            z_max: half,
        }
    }

    /// Check that min <= max on every axis
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x_min <= self.x_max && self.y_min <= self.y_max && self.z_min <= self.z_max
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, x: f64, y: f64, z: f64) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.z_min = self.z_min.min(z);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
        self.z_max = self.z_max.max(z);
    }

    #[inline]
    pub fn x_extent(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn y_extent(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl Default for BoundingBox3D {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for BoundingBox3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({:.2}, {:.2}, {:.2}), ({:.2}, {:.2}, {:.2})]",
            self.x_min, self.y_min, self.z_min, self.x_max, self.y_max, self.z_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_box_is_invalid_until_expanded() {
        let mut b = BoundingBox3D::empty();
        assert!(!b.is_valid());
        b.expand(1.0, 2.0, 3.0);
        assert!(b.is_valid());
        b.expand(-1.0, 4.0, 0.0);
        assert_eq!(b.x_min, -1.0);
        assert_eq!(b.y_max, 4.0);
        assert_eq!(b.z_min, 0.0);
    }

    #[test]
    fn around_point_uses_half_size() {
        let b = BoundingBox3D::around_point(Point2D::new(2.0, 3.0), 0.01);
        assert_relative_eq!(b.x_min, 1.99);
        assert_relative_eq!(b.x_max, 2.01);
        assert_relative_eq!(b.y_min, 2.99);
        assert_relative_eq!(b.y_max, 3.01);
        assert_relative_eq!(b.x_extent(), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn display_uses_two_decimals() {
        let b = BoundingBox3D::new([0.0, 0.0, 0.0], [5.0, 0.2, 3.0]);
        assert_eq!(b.to_string(), "[(0.00, 0.00, 0.00), (5.00, 0.20, 3.00)]");
    }
}
