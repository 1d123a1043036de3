// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interchange schema shared by the report writer and the import reader.
//!
//! Label-type codes are written by the inspector and read back by the
//! synthesizer, and the import column table fixes where each value lives in
//! an exported row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header line opening every text report.
pub const REPORT_SCHEMA: &str = "# bim-annotate report v1";

/// Placeholder printed when a value could not be obtained from the host.
pub const NOT_AVAILABLE: &str = "Not available";

/// Annotation an element needs (or already has).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum LabelType {
    #[default]
    None,
    /// Wall measured by a dimension line.
    Dimension,
    /// Element with an attached label; doors without one need a marker.
    Label,
    /// Door carrying a marker.
    Marker,
    /// Zone carrying a stamp.
    ZoneStamp,
}

impl LabelType {
    pub fn code(&self) -> i32 {
        match self {
            LabelType::None => 0,
            LabelType::Dimension => 1,
            LabelType::Label => 2,
            LabelType::Marker => 3,
            LabelType::ZoneStamp => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(LabelType::None),
            1 => Some(LabelType::Dimension),
            2 => Some(LabelType::Label),
            3 => Some(LabelType::Marker),
            4 => Some(LabelType::ZoneStamp),
            _ => None,
        }
    }
}

impl From<LabelType> for i32 {
    fn from(value: LabelType) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for LabelType {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        LabelType::from_code(code).ok_or_else(|| format!("unknown label type code {}", code))
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Columns of an exported element row (zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportColumn {
    ElementGuid,
    WallWidth,
    BboxXMin,
    BboxYMin,
    BboxXMax,
    BboxYMax,
    ZonePosX,
    ZonePosY,
    RoomName,
    RoomNumber,
    LabelType,
}

impl ImportColumn {
    /// Rows with fewer fields are rejected outright.
    pub const MIN_FIELDS: usize = 21;

    pub fn index(&self) -> usize {
        match self {
            ImportColumn::ElementGuid => 2,
            ImportColumn::WallWidth => 4,
            ImportColumn::BboxXMin => 9,
            ImportColumn::BboxYMin => 10,
            ImportColumn::BboxXMax => 12,
            ImportColumn::BboxYMax => 13,
            ImportColumn::ZonePosX => 16,
            ImportColumn::ZonePosY => 17,
            ImportColumn::RoomName => 18,
            ImportColumn::RoomNumber => 19,
            ImportColumn::LabelType => 23,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImportColumn::ElementGuid => "guid",
            ImportColumn::WallWidth => "width",
            ImportColumn::BboxXMin => "bb_xmin",
            ImportColumn::BboxYMin => "bb_ymin",
            ImportColumn::BboxXMax => "bb_xmax",
            ImportColumn::BboxYMax => "bb_ymax",
            ImportColumn::ZonePosX => "zone_x",
            ImportColumn::ZonePosY => "zone_y",
            ImportColumn::RoomName => "room_name",
            ImportColumn::RoomNumber => "room_number",
            ImportColumn::LabelType => "label_type",
        }
    }
}

impl fmt::Display for ImportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (column {})", self.name(), self.index())
    }
}
