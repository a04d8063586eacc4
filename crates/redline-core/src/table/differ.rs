//! Per-row and per-cell changes for a matched table pair

use serde::Serialize;

use crate::config::DiffConfig;
use crate::model::{Row, Table};
use crate::table::cells_equal;
use crate::table::columns::{ColumnMapping, ColumnReorderDetector};
use crate::table::rows::{RowMatch, RowMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellChangeType {
    Unchanged,
    Added,
    Deleted,
    Modified,
}

/// Change record for one cell.
///
/// `row` and `col` address the modified table for matched and added rows.
/// Deleted rows, and cells of deleted columns, address the original table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellChange {
    pub change_type: CellChangeType,
    pub original_value: Option<String>,
    pub modified_value: Option<String>,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowChangeType {
    Unchanged,
    Added,
    Deleted,
    Modified,
    Moved,
}

/// Change record for one data row. Indices are data-row ordinals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowChange {
    pub change_type: RowChangeType,
    pub original_index: Option<usize>,
    pub modified_index: Option<usize>,
    pub cells: Vec<CellChange>,
    /// Original ordinal of a matched row that now sits elsewhere.
    pub moved_from: Option<usize>,
    /// Match confidence for matched rows.
    pub confidence: Option<f64>,
}

impl RowChange {
    /// A matched row whose position changed, whatever its classification.
    pub fn is_moved(&self) -> bool {
        matches!((self.original_index, self.modified_index), (Some(a), Some(b)) if a != b)
    }

    pub fn modified_cells(&self) -> impl Iterator<Item = &CellChange> {
        self.cells
            .iter()
            .filter(|cell| cell.change_type == CellChangeType::Modified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDiff {
    pub row_changes: Vec<RowChange>,
    pub column_mapping: ColumnMapping,
    pub is_resorted: bool,
    pub added_columns: Vec<usize>,
    pub deleted_columns: Vec<usize>,
}

impl TableDiff {
    pub fn count(&self, change_type: RowChangeType) -> usize {
        self.row_changes
            .iter()
            .filter(|change| change.change_type == change_type)
            .count()
    }

    pub fn modified_cell_count(&self) -> usize {
        self.row_changes.iter().map(|row| row.modified_cells().count()).sum()
    }

    /// Change record covering the given original data row.
    pub fn change_for_original(&self, original: usize) -> Option<&RowChange> {
        self.row_changes
            .iter()
            .find(|change| change.original_index == Some(original))
    }

    pub fn has_changes(&self) -> bool {
        self.is_resorted
            || !self.added_columns.is_empty()
            || !self.deleted_columns.is_empty()
            || !self.column_mapping.is_identity()
            || self
                .row_changes
                .iter()
                .any(|change| change.change_type != RowChangeType::Unchanged)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableDiffer {
    columns: ColumnReorderDetector,
    rows: RowMatcher,
}

impl TableDiffer {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            columns: ColumnReorderDetector::new(),
            rows: RowMatcher::new(config),
        }
    }

    /// Compare a matched table pair.
    ///
    /// Row changes list every original data row in order (matched or
    /// deleted), followed by added rows in modified order.
    pub fn diff(&self, original: &Table, modified: &Table) -> TableDiff {
        let alignment = self.columns.detect(original, modified);
        let matching = self.rows.match_rows(original, modified, &alignment.mapping);

        let original_rows: Vec<&Row> = original.data_rows().collect();
        let modified_rows: Vec<&Row> = modified.data_rows().collect();
        let mapped = alignment.mapping.pairs_by_modified();

        let mut row_changes = Vec::with_capacity(original_rows.len() + matching.unmatched_modified.len());
        for (i, row) in original_rows.iter().enumerate() {
            let change = match matching.modified_for(i) {
                Some(found) => matched_row_change(
                    found,
                    row,
                    modified_rows[found.modified],
                    &mapped,
                    &alignment.added_columns,
                    &alignment.deleted_columns,
                ),
                None => whole_row_change(RowChangeType::Deleted, i, row),
            };
            row_changes.push(change);
        }
        for &j in &matching.unmatched_modified {
            row_changes.push(whole_row_change(RowChangeType::Added, j, modified_rows[j]));
        }

        tracing::trace!(
            original = %original.id,
            modified = %modified.id,
            rows = row_changes.len(),
            resorted = matching.is_resorted,
            "table diffed"
        );

        TableDiff {
            row_changes,
            column_mapping: alignment.mapping,
            is_resorted: matching.is_resorted,
            added_columns: alignment.added_columns,
            deleted_columns: alignment.deleted_columns,
        }
    }
}

fn matched_row_change(
    found: &RowMatch,
    original: &Row,
    modified: &Row,
    mapped: &[(usize, usize)],
    added_columns: &[usize],
    deleted_columns: &[usize],
) -> RowChange {
    let mut cells = Vec::with_capacity(mapped.len() + added_columns.len() + deleted_columns.len());

    for &(o, m) in mapped {
        let before = original.cell_text(o);
        let after = modified.cell_text(m);
        let change_type = if cells_equal(before, after) {
            CellChangeType::Unchanged
        } else {
            CellChangeType::Modified
        };
        cells.push(CellChange {
            change_type,
            original_value: Some(before.to_string()),
            modified_value: Some(after.to_string()),
            row: found.modified,
            col: m,
        });
    }
    for &m in added_columns {
        cells.push(CellChange {
            change_type: CellChangeType::Added,
            original_value: None,
            modified_value: Some(modified.cell_text(m).to_string()),
            row: found.modified,
            col: m,
        });
    }
    for &o in deleted_columns {
        cells.push(CellChange {
            change_type: CellChangeType::Deleted,
            original_value: Some(original.cell_text(o).to_string()),
            modified_value: None,
            row: found.original,
            col: o,
        });
    }

    let any_modified = cells
        .iter()
        .any(|cell| cell.change_type == CellChangeType::Modified);
    let moved = found.original != found.modified;
    let change_type = if any_modified {
        RowChangeType::Modified
    } else if moved {
        RowChangeType::Moved
    } else {
        RowChangeType::Unchanged
    };

    RowChange {
        change_type,
        original_index: Some(found.original),
        modified_index: Some(found.modified),
        cells,
        moved_from: moved.then_some(found.original),
        confidence: Some(found.confidence),
    }
}

fn whole_row_change(change_type: RowChangeType, index: usize, row: &Row) -> RowChange {
    let (cell_type, original_index, modified_index) = match change_type {
        RowChangeType::Added => (CellChangeType::Added, None, Some(index)),
        _ => (CellChangeType::Deleted, Some(index), None),
    };
    let cells = row
        .cells
        .iter()
        .enumerate()
        .map(|(col, cell)| CellChange {
            change_type: cell_type,
            original_value: original_index.map(|_| cell.text.clone()),
            modified_value: modified_index.map(|_| cell.text.clone()),
            row: index,
            col,
        })
        .collect();

    RowChange {
        change_type,
        original_index,
        modified_index,
        cells,
        moved_from: None,
        confidence: None,
    }
}
