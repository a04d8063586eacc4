//! Whole-document comparison
//!
//! [`DiffOrchestrator`] runs the paragraph differ once over both documents'
//! paragraphs and the table differ once per paired table, then aggregates
//! the counts a statistics collaborator needs. It performs no I/O and keeps
//! no state between calls, so independent document pairs can be compared
//! concurrently with a shared orchestrator.

use serde::Serialize;

use crate::config::DiffConfig;
use crate::model::{DocumentContent, ExtractionDiagnostic, Table};
use crate::paragraph::{DiffBlock, DiffOperation, ParagraphDiffer};
use crate::table::{RowChangeType, TableDiff, TableDiffer, TableMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSide {
    Original,
    Modified,
}

/// An extraction diagnostic attributed to one side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideDiagnostic {
    pub side: DocumentSide,
    pub diagnostic: ExtractionDiagnostic,
}

/// A table pairing with its diff. `diff` is present only when both sides are.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePair<'a> {
    pub original: Option<&'a Table>,
    pub modified: Option<&'a Table>,
    pub similarity: Option<f64>,
    pub diff: Option<TableDiff>,
}

impl TablePair<'_> {
    pub fn is_added(&self) -> bool {
        self.original.is_none() && self.modified.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.original.is_some() && self.modified.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub paragraphs_unchanged: usize,
    pub paragraphs_modified: usize,
    pub paragraphs_added: usize,
    pub paragraphs_deleted: usize,
    pub paragraphs_moved: usize,
    pub words_added: usize,
    pub words_deleted: usize,
    pub tables_unchanged: usize,
    pub tables_changed: usize,
    pub tables_added: usize,
    pub tables_deleted: usize,
    pub tables_resorted: usize,
    pub rows_added: usize,
    pub rows_deleted: usize,
    pub rows_modified: usize,
    pub rows_moved: usize,
    pub cells_modified: usize,
}

impl DiffStats {
    pub fn collect(paragraphs: &[DiffBlock], tables: &[TablePair<'_>]) -> Self {
        let mut stats = Self::default();

        for block in paragraphs {
            match (block.operation, block.moved) {
                (DiffOperation::Equal, _) => stats.paragraphs_unchanged += 1,
                (DiffOperation::Replace, _) => stats.paragraphs_modified += 1,
                // A move shows up on both sides; count it once, at its source.
                (DiffOperation::Delete, true) => stats.paragraphs_moved += 1,
                (DiffOperation::Insert, true) => {}
                (DiffOperation::Delete, false) => stats.paragraphs_deleted += 1,
                (DiffOperation::Insert, false) => stats.paragraphs_added += 1,
            }
            let (added, deleted) = block.word_changes();
            stats.words_added += added;
            stats.words_deleted += deleted;
        }

        for pair in tables {
            match &pair.diff {
                Some(diff) => {
                    if diff.has_changes() {
                        stats.tables_changed += 1;
                    } else {
                        stats.tables_unchanged += 1;
                    }
                    if diff.is_resorted {
                        stats.tables_resorted += 1;
                    }
                    stats.rows_added += diff.count(RowChangeType::Added);
                    stats.rows_deleted += diff.count(RowChangeType::Deleted);
                    stats.rows_modified += diff.count(RowChangeType::Modified);
                    stats.rows_moved += diff.count(RowChangeType::Moved);
                    stats.cells_modified += diff.modified_cell_count();
                }
                None if pair.is_added() => stats.tables_added += 1,
                None if pair.is_deleted() => stats.tables_deleted += 1,
                None => {}
            }
        }
        stats
    }

    /// Paragraphs that are not unchanged.
    pub fn paragraphs_changed(&self) -> usize {
        self.paragraphs_modified + self.paragraphs_added + self.paragraphs_deleted + self.paragraphs_moved
    }

    pub fn has_changes(&self) -> bool {
        self.paragraphs_changed() > 0
            || self.tables_changed > 0
            || self.tables_added > 0
            || self.tables_deleted > 0
    }
}

/// Result of comparing two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDiff<'a> {
    /// Paragraph diff in original document order.
    pub paragraphs: Vec<DiffBlock>,
    pub tables: Vec<TablePair<'a>>,
    pub stats: DiffStats,
    /// True when either input reported extraction problems.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<SideDiagnostic>,
}

impl DocumentDiff<'_> {
    pub fn is_identical(&self) -> bool {
        !self.stats.has_changes()
    }

    pub fn table_diffs(&self) -> impl Iterator<Item = &TableDiff> {
        self.tables.iter().filter_map(|pair| pair.diff.as_ref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiffOrchestrator {
    paragraphs: ParagraphDiffer,
    matcher: TableMatcher,
    tables: TableDiffer,
}

impl DiffOrchestrator {
    pub fn new(config: DiffConfig) -> Self {
        Self {
            paragraphs: ParagraphDiffer::new(&config),
            matcher: TableMatcher::new(&config),
            tables: TableDiffer::new(&config),
        }
    }

    /// Compare two documents.
    pub fn compare<'a>(&self, original: &'a DocumentContent, modified: &'a DocumentContent) -> DocumentDiff<'a> {
        tracing::debug!(
            original_paragraphs = original.paragraphs.len(),
            modified_paragraphs = modified.paragraphs.len(),
            original_tables = original.tables.len(),
            modified_tables = modified.tables.len(),
            "Comparing documents"
        );

        let diagnostics = side_diagnostics(original, modified);
        let degraded = !diagnostics.is_empty();
        if degraded {
            tracing::warn!(
                count = diagnostics.len(),
                "Input documents are degraded; content the extractor skipped is not compared"
            );
        }

        let paragraphs = self.paragraphs.diff(&original.paragraphs, &modified.paragraphs);

        let tables: Vec<TablePair<'a>> = self
            .matcher
            .match_tables(&original.tables, &modified.tables)
            .into_iter()
            .map(|found| {
                let original_table = found.original.map(|i| &original.tables[i]);
                let modified_table = found.modified.map(|j| &modified.tables[j]);
                let diff = match (original_table, modified_table) {
                    (Some(a), Some(b)) => Some(self.tables.diff(a, b)),
                    _ => None,
                };
                TablePair {
                    original: original_table,
                    modified: modified_table,
                    similarity: found.similarity,
                    diff,
                }
            })
            .collect();

        let stats = DiffStats::collect(&paragraphs, &tables);
        tracing::debug!(?stats, "Comparison complete");

        DocumentDiff {
            paragraphs,
            tables,
            stats,
            degraded,
            diagnostics,
        }
    }
}

fn side_diagnostics(original: &DocumentContent, modified: &DocumentContent) -> Vec<SideDiagnostic> {
    let tag = |side: DocumentSide, document: &DocumentContent| {
        document
            .diagnostics
            .iter()
            .cloned()
            .map(move |diagnostic| SideDiagnostic { side, diagnostic })
            .collect::<Vec<_>>()
    };
    let mut all = tag(DocumentSide::Original, original);
    all.extend(tag(DocumentSide::Modified, modified));
    all
}
