// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Report sinks.
//!
//! The text report opens with the schema header line, writes one line per
//! record and appends the session's summary sections when finished. The
//! JSON-lines report writes the same content as one JSON object per line.

use bim_annotate_core::REPORT_SCHEMA;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::records::Record;
use crate::session::SummarySection;

/// Destination for inspection records.
pub trait ReportSink {
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, record: &Record) -> Result<()>;

    fn finish(&mut self, sections: &[SummarySection]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    JsonLines,
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" | "jsonl" | "json-lines" => Ok(ReportFormat::JsonLines),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Line-oriented text report.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "{}", REPORT_SCHEMA)?;
        Ok(())
    }

    fn record(&mut self, record: &Record) -> Result<()> {
        writeln!(self.out, "{}", record)?;
        Ok(())
    }

    fn finish(&mut self, sections: &[SummarySection]) -> Result<()> {
        for section in sections.iter().filter(|s| !s.lines.is_empty()) {
            writeln!(self.out)?;
            writeln!(self.out, "## {}", section.title)?;
            for line in &section.lines {
                writeln!(self.out, "{}", line)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SchemaLine {
    schema: &'static str,
}

#[derive(Serialize)]
struct SectionLine<'a> {
    section: &'a str,
    lines: &'a [String],
}

/// One JSON object per line.
pub struct JsonLinesReport<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ReportSink for JsonLinesReport<W> {
    fn begin(&mut self) -> Result<()> {
        let schema = REPORT_SCHEMA.trim_start_matches("# ");
        self.line(&SchemaLine { schema })
    }

    fn record(&mut self, record: &Record) -> Result<()> {
        self.line(record)
    }

    fn finish(&mut self, sections: &[SummarySection]) -> Result<()> {
        for section in sections.iter().filter(|s| !s.lines.is_empty()) {
            self.line(&SectionLine {
                section: section.title,
                lines: &section.lines,
            })?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct CollectingReport {
    pub records: Vec<Record>,
    pub sections: Vec<SummarySection>,
    pub finished: bool,
}

impl CollectingReport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for CollectingReport {
    fn record(&mut self, record: &Record) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, sections: &[SummarySection]) -> Result<()> {
        self.sections = sections.to_vec();
        self.finished = true;
        Ok(())
    }
}

/// Create a report file in the given format, truncating any previous one.
pub fn create_report(path: &Path, format: ReportFormat) -> Result<Box<dyn ReportSink>> {
    let out = BufWriter::new(File::create(path)?);
    tracing::debug!(path = %path.display(), ?format, "Opened report file");
    Ok(match format {
        ReportFormat::Text => Box::new(TextReport::new(out)),
        ReportFormat::JsonLines => Box::new(JsonLinesReport::new(out)),
    })
}
