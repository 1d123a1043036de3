// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-run state shared by the inspector and the dimension reporter.

use serde::Serialize;

use crate::resolver::RelationshipResolver;

/// Titled block of lines appended to the report after all records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySection {
    pub title: &'static str,
    pub lines: Vec<String>,
}

/// State of one inspection run.
///
/// Reset at the start of every run; nothing carries over between runs.
#[derive(Debug, Default)]
pub struct Session {
    pub resolver: RelationshipResolver,
    last_sequence: u64,
    zone_stamps: Vec<String>,
    door_labels: Vec<String>,
    dimension_notes: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.resolver.clear();
        self.last_sequence = 0;
        self.zone_stamps.clear();
        self.door_labels.clear();
        self.dimension_notes.clear();
    }

    /// Next dimension sub-element sequence number, starting at 1.
    pub fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn note_zone_stamp(&mut self, line: String) {
        self.zone_stamps.push(line);
    }

    pub fn note_door_label(&mut self, line: String) {
        self.door_labels.push(line);
    }

    pub fn note_dimension(&mut self, line: String) {
        self.dimension_notes.push(line);
    }

    /// Accumulated info, in the order it is appended to the report.
    pub fn summary_sections(&self) -> Vec<SummarySection> {
        vec![
            SummarySection {
                title: "Zone Stamp Info",
                lines: self.zone_stamps.clone(),
            },
            SummarySection {
                title: "Door Label Info",
                lines: self.door_labels.clone(),
            },
            SummarySection {
                title: "Dimension Note Info",
                lines: self.dimension_notes.clone(),
            },
        ]
    }
}
