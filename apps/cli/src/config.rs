// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command configuration loaded from environment variables.

use bim_annotate_processing::ReportFormat;
use std::path::PathBuf;

/// Add-on name shown by `show-message`.
pub const ADDON_NAME: &str = "BIM Annotate";

/// Add-on description shown by `show-message`.
pub const ADDON_DESCRIPTION: &str =
    "Inspects walls, doors, slabs, zones and dimensions and creates annotations from an element export";

/// Command configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON model snapshot the commands work on.
    pub model_path: PathBuf,
    /// Report written by `process`.
    pub report_path: PathBuf,
    /// Import file read by `auto-annotate`.
    pub import_path: PathBuf,
    pub report_format: ReportFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            model_path: std::env::var("BIM_MODEL_PATH")
                .unwrap_or_else(|_| "model.json".into())
                .into(),
            report_path: std::env::var("BIM_REPORT_PATH")
                .unwrap_or_else(|_| "ElementInfo.txt".into())
                .into(),
            import_path: std::env::var("BIM_IMPORT_PATH")
                .unwrap_or_else(|_| "elements_data.csv".into())
                .into(),
            report_format: std::env::var("BIM_REPORT_FORMAT")
                .unwrap_or_else(|_| "text".into())
                .parse()
                .unwrap_or(ReportFormat::Text),
        }
    }

    pub fn with_model(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.model_path = path;
        }
        self
    }

    pub fn with_report(mut self, path: Option<PathBuf>, format: Option<ReportFormat>) -> Self {
        if let Some(path) = path {
            self.report_path = path;
        }
        if let Some(format) = format {
            self.report_format = format;
        }
        self
    }

    pub fn with_import(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.import_path = path;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
