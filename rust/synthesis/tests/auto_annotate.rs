// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use bim_annotate_core::{
    run_undoable, AttributeIndex, Door, ElementBody, ElementStore, ElementType, LabelClass,
    MemoryStore, Point2D, StoredElement, TextDirection, TextPosition,
};
use bim_annotate_synthesis::{auto_annotate, ImportReader, SynthesisReport, Synthesizer};

const COLUMNS: usize = 25;

fn csv_row(values: &[(usize, &str)]) -> String {
    csv_row_with_len(COLUMNS, values)
}

fn csv_row_with_len(len: usize, values: &[(usize, &str)]) -> String {
    let mut fields = vec!["0".to_string(); len];
    for &(index, value) in values {
        fields[index] = value.to_string();
    }
    fields.join(",")
}

fn import_text(rows: &[String]) -> String {
    let header: Vec<String> = (0..COLUMNS).map(|i| format!("col{}", i)).collect();
    let mut text = header.join(",");
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

fn synthesize(store: &MemoryStore, rows: &[String]) -> SynthesisReport {
    let input = import_text(rows);
    let mut reader = ImportReader::from_reader(input.as_bytes());
    Synthesizer::new(store).run(reader.rows())
}

fn wall_row(x_min: &str, y_min: &str, x_max: &str, y_max: &str, width: &str) -> String {
    csv_row(&[
        (4, width),
        (9, x_min),
        (10, y_min),
        (12, x_max),
        (13, y_max),
        (23, "1"),
    ])
}

fn door_row(guid: &str) -> String {
    csv_row(&[
        (2, guid),
        (9, "2"),
        (10, "3"),
        (12, "3"),
        (13, "3.2"),
        (23, "2"),
    ])
}

#[test]
fn wall_row_creates_dimension_below_wall() {
    let store = MemoryStore::new();
    let report = synthesize(&store, &[wall_row("0", "0", "5", "0.2", "0.2")]);
    assert_eq!(report.dimensions, 1);
    assert_eq!(report.failures, 0);

    let ids = store.element_list(ElementType::Dimension).unwrap();
    assert_eq!(ids.len(), 1);
    let stored = store.stored(ids[0]).unwrap();
    let dim = stored.element.as_dimension().unwrap();
    assert_relative_eq!(dim.ref_c.x, 0.0);
    assert_relative_eq!(dim.ref_c.y, -0.2);
    assert_eq!(dim.text_pos, TextPosition::Below);
    assert_eq!(dim.text_way, TextDirection::Horizontal);
    assert_eq!(dim.n_dim_elem, 2);

    let points: Vec<Point2D> = stored.memo.dim_elems.iter().map(|e| e.base.loc).collect();
    assert_eq!(points, [Point2D::new(0.0, 0.0), Point2D::new(5.0, 0.0)]);
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn vertical_wall_row_creates_vertical_dimension() {
    let store = MemoryStore::new();
    let report = synthesize(&store, &[wall_row("3", "0", "3.3", "4", "0.3")]);
    assert_eq!(report.dimensions, 1);

    let ids = store.element_list(ElementType::Dimension).unwrap();
    let stored = store.stored(ids[0]).unwrap();
    let dim = stored.element.as_dimension().unwrap();
    assert_relative_eq!(dim.ref_c.x, 3.6);
    assert_eq!(dim.text_pos, TextPosition::Below);
    assert_eq!(dim.direction, Point2D::new(0.0, 1.0));
    assert_eq!(stored.memo.dim_elems[1].base.loc, Point2D::new(3.0, 4.0));
}

#[test]
fn door_row_with_empty_guid_creates_marker_only() {
    let store = MemoryStore::new();
    let report = synthesize(&store, &[door_row("")]);
    assert_eq!(report.markers, 1);
    assert_eq!(report.labels, 0);
    assert_eq!(report.skipped_labels, 1);

    let ids = store.element_list(ElementType::Detail).unwrap();
    assert_eq!(ids.len(), 1);
    let stored = store.stored(ids[0]).unwrap();
    let detail = stored.element.as_detail().unwrap();
    assert_eq!(detail.pos, Point2D::new(2.5, 2.5));
    assert_eq!(detail.poly.n_coords, 5);
    assert_eq!(stored.memo.coords[0], Point2D::new(1.5, 2.5));
    assert_eq!(stored.memo.coords[4], stored.memo.coords[0]);
    assert_eq!(stored.memo.pends, [0, 5]);

    let sub = stored.sub.unwrap();
    assert_eq!(sub.marker.pen, 3);
    assert!(sub.marker.use_object_pens);
    assert!(sub.no_params);
    assert_eq!(sub.marker.pos, Point2D::new(4.0, 3.5));

    assert_eq!(store.count(ElementType::Label), 0);
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn door_row_with_guid_labels_the_door() {
    let store = MemoryStore::new();
    let door = store.insert(StoredElement::new(ElementBody::Door(Door::default())));
    let report = synthesize(&store, &[door_row(&door.to_string())]);
    assert_eq!(report.markers, 1);
    assert_eq!(report.labels, 1);

    let ids = store.element_list(ElementType::Label).unwrap();
    assert_eq!(ids.len(), 1);
    let stored = store.stored(ids[0]).unwrap();
    let label = stored.element.as_label().unwrap();
    assert_eq!(label.parent, Some(door));
    assert_eq!(label.class, LabelClass::Text);
    assert_eq!(label.text_way, TextDirection::Parallel);
    assert!(label.non_breaking);
    assert_relative_eq!(label.begin.x, 2.5);
    assert_relative_eq!(label.begin.y, 2.75);
    assert_eq!(label.begin, label.end);
    assert_eq!(stored.memo.text_content.as_deref(), Some("Door"));

    assert_eq!(
        store.connected_elements(door, ElementType::Label).unwrap(),
        ids
    );
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn door_marker_needs_only_the_min_corner() {
    let store = MemoryStore::new();
    let row = csv_row(&[(2, ""), (9, "2"), (10, "3"), (12, ""), (13, ""), (23, "2")]);
    let report = synthesize(&store, &[row]);
    assert_eq!(report.markers, 1);
    assert_eq!(report.skipped_rows, 0);

    let ids = store.element_list(ElementType::Detail).unwrap();
    assert_eq!(ids.len(), 1);
    let stored = store.stored(ids[0]).unwrap();
    assert_eq!(stored.element.as_detail().unwrap().pos, Point2D::new(2.5, 2.5));
}

#[test]
fn unusable_door_extent_skips_only_the_label() {
    let store = MemoryStore::new();
    let door = store.insert(StoredElement::new(ElementBody::Door(Door::default())));
    let guid = door.to_string();
    let row = csv_row(&[
        (2, guid.as_str()),
        (9, "2"),
        (10, "3"),
        (12, "wide"),
        (23, "2"),
    ]);
    let report = synthesize(&store, &[row]);
    assert_eq!(report.markers, 1);
    assert_eq!(report.labels, 0);
    assert_eq!(report.skipped_labels, 1);
    assert_eq!(store.count(ElementType::Label), 0);
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn invalid_or_unknown_door_guid() {
    let store = MemoryStore::new();
    let unknown = bim_annotate_core::ElementId::new_v4().to_string();
    let report = synthesize(&store, &[door_row("not-a-guid"), door_row(&unknown)]);
    assert_eq!(report.markers, 2);
    assert_eq!(report.skipped_labels, 1);
    // The host refuses a label whose parent does not exist.
    assert_eq!(report.failures, 1);
    assert_eq!(store.count(ElementType::Label), 0);
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn malformed_rows_are_skipped_and_later_rows_processed() {
    let store = MemoryStore::new();
    let short = csv_row_with_len(10, &[]);
    let bad_number = csv_row(&[(9, "abc"), (23, "1")]);
    let zone = csv_row(&[
        (16, "3"),
        (17, "4"),
        (18, "Kitchen"),
        (19, "0.01"),
        (23, "4"),
    ]);
    let report = synthesize(&store, &[short, bad_number, zone]);
    assert_eq!(report.skipped_rows, 2);
    assert_eq!(report.zones, 1);
    assert_eq!(report.created(), 1);

    let ids = store.element_list(ElementType::Zone).unwrap();
    let stored = store.stored(ids[0]).unwrap();
    let zone = stored.element.as_zone().unwrap();
    assert_eq!(zone.pos, Point2D::new(4.0, 3.0));
    assert_eq!(zone.ref_pos, zone.pos);
    assert_eq!(zone.room_name, "Kitchen");
    assert_eq!(zone.room_number, "0.01");
    assert_eq!(zone.category, AttributeIndex(1));
    assert!(!zone.manual);
}

#[test]
fn long_room_names_are_truncated() {
    let store = MemoryStore::new();
    let name = "R".repeat(400);
    let report = synthesize(&store, &[csv_row(&[(18, &name), (23, "4")])]);
    assert_eq!(report.zones, 1);
    let ids = store.element_list(ElementType::Zone).unwrap();
    let stored = store.stored(ids[0]).unwrap();
    assert_eq!(stored.element.as_zone().unwrap().room_name.len(), 255);
}

#[test]
fn codes_needing_nothing_are_ignored() {
    let store = MemoryStore::new();
    let report = synthesize(
        &store,
        &[csv_row(&[(23, "0")]), csv_row(&[(23, "3")]), csv_row(&[(23, "9")])],
    );
    assert_eq!(report.ignored_rows, 3);
    assert_eq!(report.skipped_rows, 0);
    assert!(store.is_empty());
}

#[test]
fn allocation_failure_aborts_only_that_element() {
    let store = MemoryStore::new();
    store.set_allocation_budget(Some(0));
    let report = synthesize(
        &store,
        &[
            wall_row("0", "0", "5", "0.2", "0.2"),
            csv_row(&[(16, "1"), (17, "1"), (23, "4")]),
        ],
    );
    assert_eq!(report.dimensions, 0);
    assert_eq!(report.failures, 1);
    assert_eq!(report.zones, 1);
    assert_eq!(store.count(ElementType::Dimension), 0);
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn partial_marker_allocation_releases_coordinates() {
    let store = MemoryStore::new();
    store.set_allocation_budget(Some(1));
    let report = synthesize(&store, &[door_row("")]);
    assert_eq!(report.markers, 0);
    assert_eq!(report.failures, 1);
    assert_eq!(store.live_handles(), 0);
}

#[test]
fn failed_command_rolls_back_created_annotations() {
    let store = MemoryStore::new();
    let result: bim_annotate_core::Result<()> = run_undoable(&store, "auto-annotate", |s| {
        let report = synthesize(s, &[wall_row("0", "0", "5", "0.2", "0.2")]);
        assert_eq!(report.dimensions, 1);
        Err(bim_annotate_core::Error::command("auto-annotate", "aborted"))
    });
    assert!(result.is_err());
    assert!(store.is_empty());
}

#[test]
fn auto_annotate_reads_import_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elements_data.csv");
    std::fs::write(
        &path,
        import_text(&[
            wall_row("0", "0", "5", "0.2", "0.2"),
            wall_row("0", "0", "0.2", "4", "0.2"),
            door_row(""),
        ]),
    )
    .unwrap();

    let store = MemoryStore::new();
    let report = auto_annotate(&store, &path).unwrap();
    assert_eq!(report.dimensions, 2);
    assert_eq!(report.markers, 1);
    assert_eq!(store.len(), 3);

    assert!(auto_annotate(&store, &dir.path().join("missing.csv")).is_err());
}
