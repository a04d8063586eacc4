//! Loading DiffConfig from files and running comparisons with it

mod common;

use std::fs;

use common::{config_fixture, load_document};
use redline_core::{AlignmentAlgorithm, DiffConfig, DiffOrchestrator, Error, RowChangeType};
use tempfile::TempDir;

#[test]
fn test_load_review_config() {
    let config = DiffConfig::load(config_fixture("redline.toml")).unwrap();

    assert_eq!(config.alignment, AlignmentAlgorithm::Patience);
    assert!(config.skip_blank_paragraphs);
    assert_eq!(config.key_columns, 2);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = DiffConfig::load(config_fixture("strict_rows.toml")).unwrap();

    assert_eq!(config.row_key_threshold, 1.0);
    assert_eq!(config.table_match_threshold, DiffConfig::default().table_match_threshold);
    assert_eq!(config.alignment, AlignmentAlgorithm::Myers);
}

#[test]
fn test_invalid_weights_are_rejected() {
    let err = DiffConfig::load(config_fixture("invalid_weights.toml")).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { ref field, .. } if field == "header_weight"));
}

#[test]
fn test_json_config_round_trips_through_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("redline.json");
    let config = DiffConfig {
        key_columns: 1,
        word_diff: false,
        ..DiffConfig::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    assert_eq!(DiffConfig::load(&path).unwrap(), config);
}

#[test]
fn test_unknown_config_extension() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("redline.yaml");
    fs::write(&path, "key_columns: 1\n").unwrap();

    let err = DiffConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
}

#[test]
fn test_strict_row_threshold_changes_contact_diff() {
    let config = DiffConfig::load(config_fixture("strict_rows.toml")).unwrap();
    let original = load_document("services_agreement_v1");
    let modified = load_document("services_agreement_v2");

    let diff = DiffOrchestrator::new(config).compare(&original, &modified);
    let contacts = diff.tables[1].diff.as_ref().unwrap();

    // The edited Acme row no longer pairs on its key columns.
    assert_eq!(contacts.count(RowChangeType::Modified), 0);
    assert_eq!(contacts.count(RowChangeType::Deleted), 1);
    assert_eq!(contacts.count(RowChangeType::Added), 2);
}

#[test]
fn test_word_diff_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plain.toml");
    fs::write(&path, "word_diff = false\n").unwrap();
    let config = DiffConfig::load(&path).unwrap();

    let original = load_document("services_agreement_v1");
    let modified = load_document("services_agreement_v2");
    let diff = DiffOrchestrator::new(config).compare(&original, &modified);

    assert!(diff.paragraphs.iter().all(|b| b.segments.is_empty()));
    assert_eq!(diff.stats.paragraphs_modified, 2);
}
