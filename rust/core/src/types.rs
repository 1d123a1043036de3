// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier and planar coordinate types shared by every crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Globally unique element identifier as handed out by the host.
///
/// Formatted the way the host prints GUIDs: upper-case, hyphenated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub Uuid);

impl ElementId {
    /// The null GUID, used by the host for "no reference".
    pub const NULL: ElementId = ElementId(Uuid::nil());

    /// Create a fresh random identifier.
    pub fn new_v4() -> Self {
        ElementId(Uuid::new_v4())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }

    /// Parse a GUID column value. Surrounding whitespace and braces are accepted.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidGuid(text.to_string()));
        }
        Uuid::parse_str(trimmed)
            .map(ElementId)
            .map_err(|_| Error::InvalidGuid(text.to_string()))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        ElementId::NULL
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.hyphenated().encode_upper(&mut buf))
    }
}

impl FromStr for ElementId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementId::parse(s)
    }
}

/// Element type tags the add-on works with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum ElementType {
    Wall,
    Door,
    Slab,
    Zone,
    Dimension,
    Label,
    Detail,
}

impl ElementType {
    /// All known types, in host type-code order.
    pub const ALL: [ElementType; 7] = [
        ElementType::Wall,
        ElementType::Door,
        ElementType::Slab,
        ElementType::Zone,
        ElementType::Dimension,
        ElementType::Label,
        ElementType::Detail,
    ];

    /// Numeric type code, used in reports when the host cannot name a type.
    pub fn code(&self) -> u16 {
        match self {
            ElementType::Wall => 1,
            ElementType::Door => 3,
            ElementType::Slab => 7,
            ElementType::Zone => 16,
            ElementType::Dimension => 18,
            ElementType::Label => 22,
            ElementType::Detail => 26,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Wall => "Wall",
            ElementType::Door => "Door",
            ElementType::Slab => "Slab",
            ElementType::Zone => "Zone",
            ElementType::Dimension => "Dimension",
            ElementType::Label => "Label",
            ElementType::Detail => "Detail",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference to a model element.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ElementRef {
    pub id: ElementId,
    pub ty: ElementType,
}

impl ElementRef {
    pub fn new(id: ElementId, ty: ElementType) -> Self {
        Self { id, ty }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.id)
    }
}

/// A point on the floor plan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Translate by the given offsets.
    #[inline]
    pub fn offset(&self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
