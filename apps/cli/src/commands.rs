// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The add-on commands. Each one runs inside a single undoable command.

use bim_annotate_core::{run_undoable, ElementStore, ElementType};
use bim_annotate_processing::{create_report, inspect_model, InspectionStats, Session};
use bim_annotate_synthesis::{auto_annotate as synthesize, SynthesisReport};
use std::fmt::Write as _;

use crate::config::{Config, ADDON_DESCRIPTION, ADDON_NAME};

/// Inspect the model and write the element report.
pub fn process<S: ElementStore + ?Sized>(
    store: &S,
    config: &Config,
) -> bim_annotate_processing::Result<InspectionStats> {
    run_undoable(store, "process", |store| {
        let mut sink = create_report(&config.report_path, config.report_format)?;
        let mut session = Session::new();
        inspect_model(store, &mut session, sink.as_mut())
    })
}

/// Delete every dimension in one host call. Returns how many were deleted.
pub fn clear_annotations<S: ElementStore + ?Sized>(
    store: &S,
) -> bim_annotate_core::Result<usize> {
    run_undoable(store, "clear-annotations", |store| {
        let ids = store.element_list(ElementType::Dimension)?;
        if ids.is_empty() {
            tracing::info!("No dimensions to delete");
            return Ok(0);
        }
        match store.delete(&ids) {
            Ok(()) => {
                tracing::info!(count = ids.len(), "Deleted dimensions");
                Ok(ids.len())
            }
            Err(error) => {
                tracing::error!(count = ids.len(), %error, "Error deleting dimensions");
                Ok(0)
            }
        }
    })
}

/// Create annotations from the import file.
pub fn auto_annotate<S: ElementStore + ?Sized>(
    store: &S,
    config: &Config,
) -> bim_annotate_synthesis::Result<SynthesisReport> {
    run_undoable(store, "auto-annotate", |store| {
        synthesize(store, &config.import_path)
    })
}

/// Add-on name, description and the element count per type.
pub fn show_message<S: ElementStore + ?Sized>(store: &S) -> bim_annotate_core::Result<String> {
    run_undoable(store, "show-message", |store| {
        let mut message = format!("{}: {}", ADDON_NAME, ADDON_DESCRIPTION);
        for ty in ElementType::ALL {
            match store.element_list(ty) {
                Ok(ids) => {
                    let _ = write!(message, "\n{}: {}", ty, ids.len());
                }
                Err(error) => {
                    tracing::warn!(element_type = %ty, %error, "Could not count elements");
                    let _ = write!(message, "\n{}: {}", ty, bim_annotate_core::NOT_AVAILABLE);
                }
            }
        }
        Ok(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_annotate_core::{
        Dimension, ElementBody, ElementMemo, HostOp, MemoryStore, Point2D, StoredElement, Wall,
    };
    use bim_annotate_processing::ReportFormat;

    fn dimension() -> StoredElement {
        let mut memo = ElementMemo::default();
        memo.dim_elems = vec![Default::default(); 2];
        memo.dim_elems[1].base.loc = Point2D::new(4.0, 0.0);
        StoredElement::new(ElementBody::Dimension(Dimension {
            n_dim_elem: 2,
            ..Default::default()
        }))
        .with_memo(memo)
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            model_path: dir.join("model.json"),
            report_path: dir.join("ElementInfo.txt"),
            import_path: dir.join("elements_data.csv"),
            report_format: ReportFormat::Text,
        }
    }

    #[test]
    fn clear_annotations_deletes_only_dimensions() {
        let store = MemoryStore::new();
        store.insert(dimension());
        store.insert(dimension());
        store.insert(StoredElement::new(ElementBody::Wall(Wall::default())));

        assert_eq!(clear_annotations(&store).unwrap(), 2);
        assert_eq!(store.count(ElementType::Dimension), 0);
        assert_eq!(store.count(ElementType::Wall), 1);
        assert_eq!(clear_annotations(&store).unwrap(), 0);
    }

    #[test]
    fn failed_delete_is_not_escalated() {
        let store = MemoryStore::new();
        store.insert(dimension());
        store.fail(HostOp::Delete);
        assert_eq!(clear_annotations(&store).unwrap(), 0);
        assert_eq!(store.count(ElementType::Dimension), 1);
    }

    #[test]
    fn process_writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let store = MemoryStore::new();
        store.insert(dimension());

        let stats = process(&store, &config).unwrap();
        assert_eq!(stats.dimension_elements, 2);
        let text = std::fs::read_to_string(&config.report_path).unwrap();
        assert!(text.starts_with(bim_annotate_core::REPORT_SCHEMA));
        assert!(text.contains("Linear Dimension"));
        assert_eq!(store.live_handles(), 0);
    }

    #[test]
    fn auto_annotate_without_import_file_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        assert!(auto_annotate(&store, &config(dir.path())).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn show_message_counts_every_type() {
        let store = MemoryStore::new();
        store.insert(StoredElement::new(ElementBody::Wall(Wall::default())));
        let message = show_message(&store).unwrap();
        assert!(message.starts_with(ADDON_NAME));
        assert_eq!(message.lines().count(), 1 + ElementType::ALL.len());
        assert!(message.contains(&format!("{}: 1", ElementType::Wall)));
    }
}
