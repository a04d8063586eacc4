//! End-to-end comparison of extracted contract revisions
//!
//! Exercises the full flow: JSON fixture -> DocumentContent -> DiffOrchestrator
//! -> serialized DocumentDiff.

mod common;

use common::{init_logging, load_document};
use pretty_assertions::assert_eq;
use redline_core::{
    CellChangeType, DiffConfig, DiffOperation, DiffOrchestrator, DiffStats, DocumentSide, RowChangeType,
    SourceFormat,
};

#[test]
fn test_fixtures_deserialize() {
    let v1 = load_document("services_agreement_v1");
    assert_eq!(v1.format, SourceFormat::Word);
    assert_eq!(v1.paragraphs.len(), 8);
    assert_eq!(v1.tables.len(), 3);
    assert_eq!(v1.tables[0].data_row_count(), 3);
    assert!(!v1.is_degraded());
}

#[test]
fn test_contract_revision_stats() {
    init_logging();
    let original = load_document("services_agreement_v1");
    let modified = load_document("services_agreement_v2");

    let diff = DiffOrchestrator::new(DiffConfig::default()).compare(&original, &modified);

    assert_eq!(
        diff.stats,
        DiffStats {
            paragraphs_unchanged: 6,
            paragraphs_modified: 2,
            paragraphs_added: 2,
            words_added: 14,
            words_deleted: 2,
            tables_changed: 2,
            tables_added: 1,
            tables_deleted: 1,
            tables_resorted: 1,
            rows_added: 1,
            rows_modified: 1,
            rows_moved: 2,
            cells_modified: 1,
            ..DiffStats::default()
        }
    );
    assert!(!diff.degraded);
}

#[test]
fn test_contract_revision_paragraphs() {
    let original = load_document("services_agreement_v1");
    let modified = load_document("services_agreement_v2");
    let diff = DiffOrchestrator::default().compare(&original, &modified);

    let ops: Vec<_> = diff.paragraphs.iter().map(|b| b.operation).collect();
    assert_eq!(
        ops,
        vec![
            DiffOperation::Equal,
            DiffOperation::Replace,
            DiffOperation::Equal,
            DiffOperation::Equal,
            DiffOperation::Equal,
            DiffOperation::Replace,
            DiffOperation::Equal,
            DiffOperation::Equal,
            DiffOperation::Insert,
            DiffOperation::Insert,
        ]
    );

    let fees = &diff.paragraphs[5];
    let rebuilt_original: String = fees
        .segments
        .iter()
        .filter(|s| s.op != redline_core::SegmentOp::Insert)
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(rebuilt_original, "Fees are payable within 30 days of invoice.");
}

#[test]
fn test_contract_revision_tables() {
    let original = load_document("services_agreement_v1");
    let modified = load_document("services_agreement_v2");
    let diff = DiffOrchestrator::default().compare(&original, &modified);

    let ids: Vec<_> = diff
        .tables
        .iter()
        .map(|pair| {
            (
                pair.original.map(|t| t.id.as_str()),
                pair.modified.map(|t| t.id.as_str()),
            )
        })
        .collect();
    assert_eq!(
        ids,
        vec![
            (Some("fees"), Some("fees")),
            (Some("contacts"), Some("contacts")),
            (Some("milestones"), None),
            (None, Some("penalties")),
        ]
    );

    // Fee schedule: columns Hours and Rate swapped, rows re-sorted.
    let fees = diff.tables[0].diff.as_ref().unwrap();
    assert!(fees.is_resorted);
    assert!(!fees.column_mapping.is_identity());
    assert_eq!(fees.column_mapping.get(1), Some(2));
    assert_eq!(fees.column_mapping.get(2), Some(1));
    assert_eq!(fees.modified_cell_count(), 0);
    assert_eq!(fees.count(RowChangeType::Moved), 2);
    assert_eq!(
        fees.change_for_original(2).map(|c| c.change_type),
        Some(RowChangeType::Unchanged)
    );

    // Contacts: one email edited, one party added.
    let contacts = diff.tables[1].diff.as_ref().unwrap();
    assert!(!contacts.is_resorted);
    let acme = contacts.change_for_original(0).unwrap();
    assert_eq!(acme.change_type, RowChangeType::Modified);
    let email = acme.modified_cells().next().unwrap();
    assert_eq!(email.col, 2);
    assert_eq!(email.change_type, CellChangeType::Modified);
    assert_eq!(email.modified_value.as_deref(), Some("jane.roe@acme.test"));
    let added: Vec<_> = contacts
        .row_changes
        .iter()
        .filter(|c| c.change_type == RowChangeType::Added)
        .map(|c| c.modified_index)
        .collect();
    assert_eq!(added, vec![Some(2)]);

    assert!(diff.tables[2].diff.is_none());
    assert!(diff.tables[3].similarity.is_none());
}

#[test]
fn test_degraded_extraction_is_surfaced() {
    init_logging();
    let original = load_document("services_agreement_v1");
    let scan = load_document("services_agreement_v2_scan");
    assert!(scan.is_degraded());

    let diff = DiffOrchestrator::default().compare(&original, &scan);

    assert!(diff.degraded);
    assert_eq!(diff.diagnostics.len(), 1);
    assert_eq!(diff.diagnostics[0].side, DocumentSide::Modified);
    // The skipped table is simply absent: no added table shows up for it.
    assert_eq!(diff.stats.tables_added, 0);
    assert_eq!(diff.stats.tables_deleted, 1);
}

#[test]
fn test_document_against_itself_is_identical() {
    let original = load_document("services_agreement_v2");
    let diff = DiffOrchestrator::default().compare(&original, &original);

    assert!(diff.is_identical());
    assert_eq!(diff.stats.tables_unchanged, 3);
    assert_eq!(diff.stats.paragraphs_unchanged, 10);
}

#[test]
fn test_diff_serializes_to_json() {
    let original = load_document("services_agreement_v1");
    let modified = load_document("services_agreement_v2");
    let diff = DiffOrchestrator::default().compare(&original, &modified);

    let json = serde_json::to_value(&diff).unwrap();
    assert_eq!(json["stats"]["rows_moved"], 2);
    assert_eq!(json["tables"][0]["diff"]["is_resorted"], true);
    assert_eq!(json["tables"][0]["diff"]["column_mapping"]["1"], 2);
    assert_eq!(json["tables"][2]["modified"], serde_json::Value::Null);
    assert_eq!(json["paragraphs"][8]["operation"], "insert");
}
