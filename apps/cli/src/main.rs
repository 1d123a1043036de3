// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM-Annotate command-line front end.
//!
//! Runs the add-on commands against a JSON model snapshot:
//! - `process`: inspect walls, doors, slabs, zones and dimensions and write the element report
//! - `clear-annotations`: delete every dimension
//! - `auto-annotate`: create dimensions, door markers, door labels and zones from an element export
//! - `show-message`: print the add-on description and element counts
//!
//! Commands that change the model write the snapshot back.

mod commands;
mod config;

use anyhow::Context;
use bim_annotate_core::MemoryStore;
use bim_annotate_processing::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::Config;

#[derive(Parser)]
#[command(name = "bim-annotate", version, about = "BIM annotation add-on engine")]
struct Cli {
    /// Model snapshot (overrides BIM_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect the model and write the element report
    Process {
        /// Report file (overrides BIM_REPORT_PATH)
        #[arg(long)]
        report: Option<PathBuf>,
        /// Report format: text or jsonl (overrides BIM_REPORT_FORMAT)
        #[arg(long)]
        format: Option<ReportFormat>,
    },
    /// Delete every dimension in the model
    #[command(alias = "delete-annotations")]
    ClearAnnotations,
    /// Create annotations from an element export
    AutoAnnotate {
        /// Import file (overrides BIM_IMPORT_PATH)
        #[arg(long)]
        import: Option<PathBuf>,
    },
    /// Show the add-on description and element counts
    ShowMessage,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,bim_annotate=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().with_model(cli.model);

    tracing::info!(model = %config.model_path.display(), "Starting BIM-Annotate");

    let store = MemoryStore::load(&config.model_path)
        .with_context(|| format!("loading model {}", config.model_path.display()))?;

    match cli.command {
        Command::Process { report, format } => {
            let config = config.with_report(report, format);
            let stats = commands::process(&store, &config).with_context(|| {
                format!("writing report {}", config.report_path.display())
            })?;
            tracing::info!(
                report = %config.report_path.display(),
                records = stats.records,
                error_records = stats.error_records,
                "Report written"
            );
        }
        Command::ClearAnnotations => {
            let deleted = commands::clear_annotations(&store).context("clearing annotations")?;
            if deleted > 0 {
                save(&store, &config)?;
            }
        }
        Command::AutoAnnotate { import } => {
            let config = config.with_import(import);
            let report = commands::auto_annotate(&store, &config).with_context(|| {
                format!("reading import file {}", config.import_path.display())
            })?;
            if report.created() > 0 {
                save(&store, &config)?;
            }
        }
        Command::ShowMessage => {
            let message = commands::show_message(&store).context("reading element counts")?;
            tracing::info!("{}", message);
            println!("{}", message);
        }
    }

    Ok(())
}

fn save(store: &MemoryStore, config: &Config) -> anyhow::Result<()> {
    store
        .save(&config.model_path)
        .with_context(|| format!("saving model {}", config.model_path.display()))?;
    tracing::debug!(model = %config.model_path.display(), "Model saved");
    Ok(())
}
