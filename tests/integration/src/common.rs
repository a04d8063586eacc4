//! Fixture loading shared by the end-to-end tests

#![allow(dead_code)]

use std::path::PathBuf;

use redline_core::DocumentContent;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

pub fn config_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("config").join(name)
}

pub fn load_document(name: &str) -> DocumentContent {
    let path = fixtures_dir().join("documents").join(format!("{name}.json"));
    let json = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
    DocumentContent::from_json_str(&json).unwrap()
}

/// Route library logs through the test harness. Set `RUST_LOG=redline_core=trace`
/// to see individual match decisions.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Only the first test in a binary gets to install the subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().compact())
        .try_init();
}
