// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Annotate Processing
//!
//! Walks the model through an [`ElementStore`](bim_annotate_core::ElementStore),
//! rebuilds element relationships and writes one report record per element.
//!
//! ```rust,ignore
//! use bim_annotate_processing::{create_report, inspect_model, ReportFormat, Session};
//!
//! let mut session = Session::new();
//! let mut sink = create_report(Path::new("ElementInfo.txt"), ReportFormat::Text)?;
//! let stats = inspect_model(&store, &mut session, sink.as_mut())?;
//! ```

mod dimensions;
pub mod error;
pub mod inspector;
pub mod records;
pub mod report;
pub mod resolver;
pub mod session;

pub use dimensions::SUB_ELEMENT_HALF_SIZE;
pub use error::{Error, Result};
pub use inspector::{inspect_model, InspectionStats, INSPECTION_ORDER};
pub use records::{
    AttachedLabel, DimensionElementRecord, DimensionRecord, DoorRecord, ElementRecord, Record,
    RecordTail, WallRecord, ZoneRecord,
};
pub use report::{
    create_report, CollectingReport, JsonLinesReport, ReportFormat, ReportSink, TextReport,
};
pub use resolver::RelationshipResolver;
pub use session::{Session, SummarySection};
