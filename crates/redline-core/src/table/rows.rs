//! Two-pass row matching and resort detection
//!
//! Row indices here are data-row ordinals: positions among a table's
//! non-header rows.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::config::DiffConfig;
use crate::fingerprint::{Fingerprint, normalize_text};
use crate::model::{Row, Table};
use crate::table::columns::ColumnMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Same content under the column mapping.
    Exact,
    /// Leading key columns agree.
    KeyColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowMatch {
    pub original: usize,
    pub modified: usize,
    pub confidence: f64,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowMatching {
    /// Matches in original row order.
    pub matches: Vec<RowMatch>,
    pub unmatched_original: Vec<usize>,
    pub unmatched_modified: Vec<usize>,
    pub is_resorted: bool,
}

impl RowMatching {
    pub fn modified_for(&self, original: usize) -> Option<&RowMatch> {
        self.matches.iter().find(|m| m.original == original)
    }
}

#[derive(Debug, Clone)]
pub struct RowMatcher {
    key_columns: usize,
    key_threshold: f64,
}

impl Default for RowMatcher {
    fn default() -> Self {
        Self::new(&DiffConfig::default())
    }
}

impl RowMatcher {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            key_columns: config.key_columns,
            key_threshold: config.row_key_threshold,
        }
    }

    pub fn match_rows(&self, original: &Table, modified: &Table, mapping: &ColumnMapping) -> RowMatching {
        let original_rows: Vec<&Row> = original.data_rows().collect();
        let modified_rows: Vec<&Row> = modified.data_rows().collect();

        let mut matched_original: Vec<Option<RowMatch>> = vec![None; original_rows.len()];
        let mut claimed = vec![false; modified_rows.len()];

        self.exact_pass(&original_rows, &modified_rows, mapping, &mut matched_original, &mut claimed);
        self.key_pass(&original_rows, &modified_rows, mapping, &mut matched_original, &mut claimed);

        let unmatched_original = matched_original
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_none())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let unmatched_modified = claimed
            .iter()
            .enumerate()
            .filter(|(_, claimed)| !**claimed)
            .map(|(j, _)| j)
            .collect();
        let matches: Vec<RowMatch> = matched_original.into_iter().flatten().collect();

        let is_resorted = !original_rows.is_empty()
            && unmatched_original.is_empty()
            && matches.windows(2).any(|pair| pair[1].modified < pair[0].modified);

        RowMatching {
            matches,
            unmatched_original,
            unmatched_modified,
            is_resorted,
        }
    }

    /// Rows whose content is identical under the column mapping, wherever
    /// they now sit. Duplicate rows pair up in order.
    fn exact_pass(
        &self,
        original_rows: &[&Row],
        modified_rows: &[&Row],
        mapping: &ColumnMapping,
        matched: &mut [Option<RowMatch>],
        claimed: &mut [bool],
    ) {
        if mapping.is_empty() {
            return;
        }
        let pairs = mapping.pairs_by_modified();

        let mut by_fingerprint: HashMap<Fingerprint, VecDeque<usize>> = HashMap::new();
        for (j, row) in modified_rows.iter().enumerate() {
            if claimed[j] {
                continue;
            }
            let fingerprint = projected_fingerprint(row, pairs.iter().map(|&(_, m)| m));
            by_fingerprint.entry(fingerprint).or_default().push_back(j);
        }

        for (i, row) in original_rows.iter().enumerate() {
            if matched[i].is_some() {
                continue;
            }
            let fingerprint = projected_fingerprint(row, pairs.iter().map(|&(o, _)| o));
            let Some(j) = by_fingerprint.get_mut(&fingerprint).and_then(VecDeque::pop_front) else {
                continue;
            };
            claimed[j] = true;
            tracing::trace!(original = i, modified = j, "exact row match");
            matched[i] = Some(RowMatch {
                original: i,
                modified: j,
                confidence: 1.0,
                kind: MatchKind::Exact,
            });
        }
    }

    /// Fallback join on the leading key columns.
    fn key_pass(
        &self,
        original_rows: &[&Row],
        modified_rows: &[&Row],
        mapping: &ColumnMapping,
        matched: &mut [Option<RowMatch>],
        claimed: &mut [bool],
    ) {
        // A key spanning every column would only repeat the exact pass, so
        // at least one column stays outside the key.
        let width = original_rows.iter().map(|row| row.len()).max().unwrap_or(0);
        let key_width = self.key_columns.min(width.saturating_sub(1).max(1)).min(width);
        if key_width == 0 {
            return;
        }
        let key_targets: Vec<Option<usize>> = (0..key_width).map(|col| mapping.get(col)).collect();
        if key_targets.iter().all(Option::is_none) {
            return;
        }

        let modified_keys: Vec<Vec<Option<String>>> = modified_rows
            .iter()
            .map(|row| {
                key_targets
                    .iter()
                    .map(|target| target.map(|col| normalize_text(row.cell_text(col))))
                    .collect()
            })
            .collect();

        for (i, row) in original_rows.iter().enumerate() {
            if matched[i].is_some() {
                continue;
            }
            let keys = row.key_values_n(key_width);

            let mut best: Option<(usize, f64)> = None;
            for (j, candidate) in modified_keys.iter().enumerate() {
                if claimed[j] {
                    continue;
                }
                let score = key_agreement(&keys, candidate);
                if score > self.key_threshold && best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((j, score));
                }
            }

            if let Some((j, score)) = best {
                claimed[j] = true;
                tracing::trace!(original = i, modified = j, score, "key-column row match");
                matched[i] = Some(RowMatch {
                    original: i,
                    modified: j,
                    confidence: score,
                    kind: MatchKind::KeyColumns,
                });
            }
        }
    }
}

fn projected_fingerprint(row: &Row, columns: impl Iterator<Item = usize>) -> Fingerprint {
    Fingerprint::of_sequence(columns.map(|col| Fingerprint::of_text(row.cell_text(col))))
}

/// Fraction of key positions holding the same non-empty value. Key
/// columns without a modified counterpart never agree.
fn key_agreement(original: &[String], modified: &[Option<String>]) -> f64 {
    if original.is_empty() {
        return 0.0;
    }
    let agreeing = original
        .iter()
        .zip(modified)
        .filter(|(value, candidate)| !value.is_empty() && candidate.as_deref() == Some(value.as_str()))
        .count();
    agreeing as f64 / original.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Locator;
    use crate::table::columns::ColumnReorderDetector;
    use pretty_assertions::assert_eq;

    fn table(rows: &[&[&str]]) -> Table {
        let mut grid = vec![vec!["Name", "Amount"]];
        grid.extend(rows.iter().map(|row| row.to_vec()));
        Table::from_grid("t", Locator::default(), true, grid)
    }

    fn run(original: &Table, modified: &Table) -> RowMatching {
        let alignment = ColumnReorderDetector::new().detect(original, modified);
        RowMatcher::default().match_rows(original, modified, &alignment.mapping)
    }

    fn pairs(matching: &RowMatching) -> Vec<(usize, usize)> {
        matching.matches.iter().map(|m| (m.original, m.modified)).collect()
    }

    #[test]
    fn swapped_rows_match_exactly_and_are_resorted() {
        let matching = run(&table(&[&["A", "10"], &["B", "20"]]), &table(&[&["B", "20"], &["A", "10"]]));

        assert_eq!(pairs(&matching), vec![(0, 1), (1, 0)]);
        assert!(matching.matches.iter().all(|m| m.kind == MatchKind::Exact && m.confidence == 1.0));
        assert!(matching.is_resorted);
    }

    #[test]
    fn edited_row_matches_on_key_columns() {
        let matching = run(&table(&[&["A", "10"]]), &table(&[&["A", "15"]]));

        assert_eq!(pairs(&matching), vec![(0, 0)]);
        assert_eq!(matching.matches[0].kind, MatchKind::KeyColumns);
        assert!(!matching.is_resorted);
    }

    #[test]
    fn default_two_key_columns_require_both_to_agree() {
        let original = Table::from_grid(
            "t",
            Locator::default(),
            true,
            [vec!["Id", "Name", "Amount"], vec!["1", "A", "10"]],
        );
        let modified = Table::from_grid(
            "t",
            Locator::default(),
            true,
            [vec!["Id", "Name", "Amount"], vec!["1", "A", "15"]],
        );
        let matching = run(&original, &modified);
        assert_eq!(pairs(&matching), vec![(0, 0)]);
        assert_eq!(matching.matches[0].confidence, 1.0);

        let half = Table::from_grid(
            "t",
            Locator::default(),
            true,
            [vec!["Id", "Name", "Amount"], vec!["1", "Z", "15"]],
        );
        let matching = run(&original, &half);
        assert!(matching.matches.is_empty());
        assert_eq!(matching.unmatched_original, vec![0]);
        assert_eq!(matching.unmatched_modified, vec![0]);
    }

    #[test]
    fn reordered_columns_do_not_break_exact_matching() {
        let original = table(&[&["A", "10"], &["B", "20"]]);
        let modified = Table::from_grid(
            "t",
            Locator::default(),
            true,
            [vec!["Amount", "Name"], vec!["10", "A"], vec!["20", "B"]],
        );
        let matching = run(&original, &modified);

        assert_eq!(pairs(&matching), vec![(0, 0), (1, 1)]);
        assert!(!matching.is_resorted);
    }

    #[test]
    fn deleted_row_prevents_resort_flag() {
        let matching = run(
            &table(&[&["A", "1"], &["B", "2"], &["C", "3"]]),
            &table(&[&["C", "3"], &["A", "1"]]),
        );

        assert_eq!(pairs(&matching), vec![(0, 1), (2, 0)]);
        assert_eq!(matching.unmatched_original, vec![1]);
        assert!(!matching.is_resorted);
    }

    #[test]
    fn duplicate_rows_pair_in_order() {
        let matching = run(&table(&[&["X", "1"], &["X", "1"]]), &table(&[&["X", "1"], &["X", "1"], &["X", "1"]]));

        assert_eq!(pairs(&matching), vec![(0, 0), (1, 1)]);
        assert_eq!(matching.unmatched_modified, vec![2]);
        assert!(!matching.is_resorted);
    }

    #[test]
    fn added_rows_are_unmatched_modified() {
        let matching = run(&table(&[&["A", "1"]]), &table(&[&["New", "9"], &["A", "1"]]));
        assert_eq!(pairs(&matching), vec![(0, 1)]);
        assert_eq!(matching.unmatched_modified, vec![0]);
        assert!(!matching.is_resorted);
    }

    #[test]
    fn empty_key_values_never_agree() {
        let matching = run(&table(&[&["", "1"]]), &table(&[&["", "2"]]));
        assert!(matching.matches.is_empty());
    }

    #[test]
    fn key_agreement_scores() {
        let keys = vec!["a".to_string(), "b".to_string()];
        assert_eq!(key_agreement(&keys, &[Some("a".into()), Some("b".into())]), 1.0);
        assert_eq!(key_agreement(&keys, &[Some("a".into()), Some("x".into())]), 0.5);
        assert_eq!(key_agreement(&keys, &[None, Some("b".into())]), 0.5);
        assert_eq!(key_agreement(&[], &[]), 0.0);
    }
}
