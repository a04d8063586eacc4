//! Structural table comparison
//!
//! Tables are first paired across documents ([`TableMatcher`]); each pair
//! then gets a column mapping from its headers ([`ColumnReorderDetector`]),
//! a row matching ([`RowMatcher`]), and finally per-row and per-cell change
//! records ([`TableDiffer`]).

pub mod columns;
pub mod differ;
pub mod matcher;
pub mod rows;

pub use columns::{ColumnAlignment, ColumnMapping, ColumnReorderDetector};
pub use differ::{CellChange, CellChangeType, RowChange, RowChangeType, TableDiff, TableDiffer};
pub use matcher::{TableMatch, TableMatcher};
pub use rows::{MatchKind, RowMatch, RowMatcher, RowMatching};

/// Cells compare equal when their trimmed texts are identical.
pub(crate) fn cells_equal(original: &str, modified: &str) -> bool {
    original.trim() == modified.trim()
}
