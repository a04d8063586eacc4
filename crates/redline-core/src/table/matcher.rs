//! Pairing whole tables across two documents

use std::collections::HashSet;

use serde::Serialize;

use crate::config::DiffConfig;
use crate::fingerprint::Fingerprint;
use crate::model::{Row, Table};

/// One entry of the table pairing. `None` on a side means the table was
/// added or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMatch {
    pub original: Option<usize>,
    pub modified: Option<usize>,
    pub similarity: Option<f64>,
}

/// Column-order-insensitive summary of a table, so a pair with reordered
/// columns still scores as the same table.
struct TableSignature {
    header: Option<Fingerprint>,
    page: u32,
    rows: HashSet<Fingerprint>,
}

impl TableSignature {
    fn of(table: &Table) -> Self {
        Self {
            header: table.header_row().map(unordered_fingerprint),
            page: table.position.major,
            rows: table.data_rows().map(unordered_fingerprint).collect(),
        }
    }
}

fn unordered_fingerprint(row: &Row) -> Fingerprint {
    let mut cells: Vec<Fingerprint> = row.cells.iter().map(|cell| cell.fingerprint()).collect();
    cells.sort();
    Fingerprint::of_sequence(cells)
}

#[derive(Debug, Clone)]
pub struct TableMatcher {
    threshold: f64,
    header_weight: f64,
    locator_weight: f64,
    row_overlap_weight: f64,
}

impl Default for TableMatcher {
    fn default() -> Self {
        Self::new(&DiffConfig::default())
    }
}

impl TableMatcher {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            threshold: config.table_match_threshold,
            header_weight: config.header_weight,
            locator_weight: config.locator_weight,
            row_overlap_weight: config.row_overlap_weight,
        }
    }

    /// Weighted similarity of two tables in `[0, 1]`.
    pub fn similarity(&self, original: &Table, modified: &Table) -> f64 {
        self.score(&TableSignature::of(original), &TableSignature::of(modified))
    }

    /// Greedily pair tables. Each original table, in order, takes the
    /// best-scoring unused modified table above the threshold; ties go to
    /// the earlier modified table. Unpaired modified tables follow in order.
    pub fn match_tables(&self, original: &[Table], modified: &[Table]) -> Vec<TableMatch> {
        let original_signatures: Vec<_> = original.iter().map(TableSignature::of).collect();
        let modified_signatures: Vec<_> = modified.iter().map(TableSignature::of).collect();
        let mut used = vec![false; modified.len()];
        let mut matches = Vec::with_capacity(original.len().max(modified.len()));

        for (i, signature) in original_signatures.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (j, candidate) in modified_signatures.iter().enumerate() {
                if used[j] {
                    continue;
                }
                let score = self.score(signature, candidate);
                if score > self.threshold && best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((j, score));
                }
            }

            match best {
                Some((j, score)) => {
                    used[j] = true;
                    tracing::trace!(
                        original = %original[i].id,
                        modified = %modified[j].id,
                        score,
                        "paired tables"
                    );
                    matches.push(TableMatch {
                        original: Some(i),
                        modified: Some(j),
                        similarity: Some(score),
                    });
                }
                None => {
                    tracing::trace!(original = %original[i].id, "table has no counterpart");
                    matches.push(TableMatch {
                        original: Some(i),
                        modified: None,
                        similarity: None,
                    });
                }
            }
        }

        matches.extend(
            used.iter()
                .enumerate()
                .filter(|(_, used)| !**used)
                .map(|(j, _)| TableMatch {
                    original: None,
                    modified: Some(j),
                    similarity: None,
                }),
        );
        matches
    }

    /// Signals that cannot be evaluated are left out of both the score and
    /// the weight total.
    fn score(&self, original: &TableSignature, modified: &TableSignature) -> f64 {
        let mut total = 0.0;
        let mut score = 0.0;

        if let (Some(a), Some(b)) = (original.header, modified.header) {
            total += self.header_weight;
            if a == b {
                score += self.header_weight;
            }
        }

        total += self.locator_weight;
        if original.page == modified.page {
            score += self.locator_weight;
        }

        let union = original.rows.union(&modified.rows).count();
        if union > 0 {
            let shared = original.rows.intersection(&modified.rows).count();
            total += self.row_overlap_weight;
            score += self.row_overlap_weight * shared as f64 / union as f64;
        }

        if total > 0.0 { score / total } else { 0.0 }
    }
}
