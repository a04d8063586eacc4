//! Column reorder detection from header text

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fingerprint::normalize_text;
use crate::model::Table;

/// Partial injective map from original column index to modified column index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<usize, usize>);

impl ColumnMapping {
    /// Identity mapping over the first `width` columns.
    pub fn identity(width: usize) -> Self {
        Self((0..width).map(|col| (col, col)).collect())
    }

    /// Build a mapping from `(original, modified)` pairs. Later pairs that
    /// would reuse an original or modified column are ignored, keeping the
    /// mapping injective.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut mapping = BTreeMap::new();
        let mut claimed = std::collections::HashSet::new();
        for (original, modified) in pairs {
            if mapping.contains_key(&original) || !claimed.insert(modified) {
                continue;
            }
            mapping.insert(original, modified);
        }
        Self(mapping)
    }

    pub fn get(&self, original: usize) -> Option<usize> {
        self.0.get(&original).copied()
    }

    /// The original column mapped onto `modified`, if any.
    pub fn original_for(&self, modified: usize) -> Option<usize> {
        self.0
            .iter()
            .find_map(|(&original, &target)| (target == modified).then_some(original))
    }

    /// Pairs in original column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&original, &modified)| (original, modified))
    }

    /// Pairs in modified column order, the layout a renderer shows.
    pub fn pairs_by_modified(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by_key(|&(_, modified)| modified);
        pairs
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every mapped column keeps its index.
    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|(original, modified)| original == modified)
    }
}

/// Result of comparing two tables' column layouts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnAlignment {
    pub mapping: ColumnMapping,
    /// Modified columns no original column maps to.
    pub added_columns: Vec<usize>,
    /// Original columns with no counterpart.
    pub deleted_columns: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnReorderDetector;

impl ColumnReorderDetector {
    pub fn new() -> Self {
        Self
    }

    /// Map original columns to modified columns by header text.
    ///
    /// Duplicate header texts claim the first unclaimed occurrence. When
    /// either table has no header row the mapping falls back to identity
    /// over the shared column range.
    pub fn detect(&self, original: &Table, modified: &Table) -> ColumnAlignment {
        let original_width = original.column_count();
        let modified_width = modified.column_count();

        let (Some(original_header), Some(modified_header)) =
            (original.header_row(), modified.header_row())
        else {
            let shared = original_width.min(modified_width);
            return ColumnAlignment {
                mapping: ColumnMapping::identity(shared),
                added_columns: (shared..modified_width).collect(),
                deleted_columns: (shared..original_width).collect(),
            };
        };

        let modified_names: Vec<String> = (0..modified_width)
            .map(|col| normalize_text(modified_header.cell_text(col)))
            .collect();
        let mut claimed = vec![false; modified_width];
        let mut pairs = Vec::new();
        let mut deleted_columns = Vec::new();

        for col in 0..original_width {
            let name = normalize_text(original_header.cell_text(col));
            let target = modified_names
                .iter()
                .enumerate()
                .find(|(target, candidate)| !claimed[*target] && **candidate == name)
                .map(|(target, _)| target);
            match target {
                Some(target) => {
                    claimed[target] = true;
                    pairs.push((col, target));
                }
                None => deleted_columns.push(col),
            }
        }

        let added_columns = claimed
            .iter()
            .enumerate()
            .filter(|(_, claimed)| !**claimed)
            .map(|(col, _)| col)
            .collect();

        ColumnAlignment {
            mapping: ColumnMapping::from_pairs(pairs),
            added_columns,
            deleted_columns,
        }
    }
}
