//! Paragraph-level sequence alignment
//!
//! Paragraphs are normalized and fingerprinted first so large documents are
//! aligned on fixed-size keys instead of raw text. Replaced paragraph pairs
//! are then re-aligned at word granularity.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use similar::{DiffOp, DiffTag};

use crate::config::{AlignmentAlgorithm, DiffConfig};
use crate::fingerprint::Fingerprint;
use crate::model::Paragraph;

/// Words and the whitespace between them, so segments concatenate back to
/// the exact input text.
static WORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+|\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOperation {
    Equal,
    Insert,
    Delete,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentOp {
    Equal,
    Insert,
    Delete,
}

/// A run of words inside a replaced paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordSegment {
    pub op: SegmentOp,
    pub text: String,
}

impl WordSegment {
    fn new(op: SegmentOp, text: String) -> Self {
        Self { op, text }
    }
}

/// One unit of the paragraph diff.
///
/// Indices refer to positions in `DocumentContent::paragraphs` of the
/// respective side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffBlock {
    pub operation: DiffOperation,
    pub original_text: Option<String>,
    pub modified_text: Option<String>,
    pub original_index: Option<usize>,
    pub modified_index: Option<usize>,
    /// Delete paired with an Insert of the same text (or the reverse) at a
    /// clearly different relative position.
    pub moved: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<WordSegment>,
}

impl DiffBlock {
    pub fn equal(original_index: usize, modified_index: usize, original: &str, modified: &str) -> Self {
        Self {
            operation: DiffOperation::Equal,
            original_text: Some(original.to_string()),
            modified_text: Some(modified.to_string()),
            original_index: Some(original_index),
            modified_index: Some(modified_index),
            moved: false,
            segments: Vec::new(),
        }
    }

    pub fn insert(modified_index: usize, text: &str) -> Self {
        Self {
            operation: DiffOperation::Insert,
            original_text: None,
            modified_text: Some(text.to_string()),
            original_index: None,
            modified_index: Some(modified_index),
            moved: false,
            segments: Vec::new(),
        }
    }

    pub fn delete(original_index: usize, text: &str) -> Self {
        Self {
            operation: DiffOperation::Delete,
            original_text: Some(text.to_string()),
            modified_text: None,
            original_index: Some(original_index),
            modified_index: None,
            moved: false,
            segments: Vec::new(),
        }
    }

    pub fn replace(
        original_index: usize,
        modified_index: usize,
        original: &str,
        modified: &str,
        segments: Vec<WordSegment>,
    ) -> Self {
        Self {
            operation: DiffOperation::Replace,
            original_text: Some(original.to_string()),
            modified_text: Some(modified.to_string()),
            original_index: Some(original_index),
            modified_index: Some(modified_index),
            moved: false,
            segments,
        }
    }

    /// Words added and deleted by this block, as `(added, deleted)`.
    ///
    /// Moved blocks contribute nothing. Replaced pairs count the words
    /// present on only one side.
    pub fn word_changes(&self) -> (usize, usize) {
        if self.moved {
            return (0, 0);
        }
        let count = |text: &Option<String>| text.as_deref().map_or(0, |t| t.split_whitespace().count());
        match self.operation {
            DiffOperation::Equal => (0, 0),
            DiffOperation::Insert => (count(&self.modified_text), 0),
            DiffOperation::Delete => (0, count(&self.original_text)),
            DiffOperation::Replace => {
                let words = |text: &Option<String>| -> HashSet<String> {
                    text.as_deref()
                        .unwrap_or("")
                        .split_whitespace()
                        .map(str::to_string)
                        .collect()
                };
                let original = words(&self.original_text);
                let modified = words(&self.modified_text);
                (
                    modified.difference(&original).count(),
                    original.difference(&modified).count(),
                )
            }
        }
    }
}

/// A maximal run of the edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Run {
    Equal { old: Range<usize>, new: Range<usize> },
    Change { old: Range<usize>, new: Range<usize> },
}

/// Collapse an edit script into alternating equal and change runs, so that
/// adjacent deletes and inserts form one replace run.
fn collect_runs(ops: &[DiffOp]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut pending: Option<(Range<usize>, Range<usize>)> = None;

    for op in ops {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                if let Some((old, new)) = pending.take() {
                    runs.push(Run::Change { old, new });
                }
                runs.push(Run::Equal { old, new });
            }
            DiffTag::Delete | DiffTag::Insert | DiffTag::Replace => {
                pending = Some(match pending.take() {
                    Some((pending_old, pending_new)) => {
                        (pending_old.start..old.end, pending_new.start..new.end)
                    }
                    None => (old, new),
                });
            }
        }
    }
    if let Some((old, new)) = pending {
        runs.push(Run::Change { old, new });
    }
    runs
}

#[derive(Debug, Clone)]
pub struct ParagraphDiffer {
    algorithm: AlignmentAlgorithm,
    word_diff: bool,
    skip_blank: bool,
    move_threshold: f64,
}

impl Default for ParagraphDiffer {
    fn default() -> Self {
        Self::new(&DiffConfig::default())
    }
}

impl ParagraphDiffer {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            algorithm: config.alignment,
            word_diff: config.word_diff,
            skip_blank: config.skip_blank_paragraphs,
            move_threshold: config.paragraph_move_threshold,
        }
    }

    /// Diff two paragraph sequences.
    pub fn diff(&self, original: &[Paragraph], modified: &[Paragraph]) -> Vec<DiffBlock> {
        let old = self.indexed(original.iter().map(|p| p.text.as_str()));
        let new = self.indexed(modified.iter().map(|p| p.text.as_str()));
        self.align(&old, &new)
    }

    /// Diff two sequences of raw paragraph texts.
    pub fn diff_texts<S: AsRef<str>>(&self, original: &[S], modified: &[S]) -> Vec<DiffBlock> {
        let old = self.indexed(original.iter().map(AsRef::as_ref));
        let new = self.indexed(modified.iter().map(AsRef::as_ref));
        self.align(&old, &new)
    }

    /// Word-level segments for a replaced pair of paragraphs.
    pub fn word_segments(&self, original: &str, modified: &str) -> Vec<WordSegment> {
        let old_tokens: Vec<&str> = WORD_TOKEN.find_iter(original).map(|m| m.as_str()).collect();
        let new_tokens: Vec<&str> = WORD_TOKEN.find_iter(modified).map(|m| m.as_str()).collect();
        let ops = similar::capture_diff_slices(self.algorithm.into(), &old_tokens, &new_tokens);

        let mut segments = Vec::new();
        for run in collect_runs(&ops) {
            match run {
                Run::Equal { old, .. } => {
                    segments.push(WordSegment::new(SegmentOp::Equal, old_tokens[old].concat()));
                }
                Run::Change { old, new } => {
                    if !old.is_empty() {
                        segments.push(WordSegment::new(SegmentOp::Delete, old_tokens[old].concat()));
                    }
                    if !new.is_empty() {
                        segments.push(WordSegment::new(SegmentOp::Insert, new_tokens[new].concat()));
                    }
                }
            }
        }
        segments
    }

    fn indexed<'a>(&self, texts: impl Iterator<Item = &'a str>) -> Vec<(usize, &'a str)> {
        texts
            .enumerate()
            .filter(|(_, text)| !(self.skip_blank && text.trim().is_empty()))
            .collect()
    }

    fn align(&self, old: &[(usize, &str)], new: &[(usize, &str)]) -> Vec<DiffBlock> {
        let old_keys: Vec<Fingerprint> = old.iter().map(|(_, text)| Fingerprint::of_text(text)).collect();
        let new_keys: Vec<Fingerprint> = new.iter().map(|(_, text)| Fingerprint::of_text(text)).collect();

        let ops = similar::capture_diff_slices(self.algorithm.into(), &old_keys, &new_keys);

        let mut blocks = Vec::with_capacity(old.len().max(new.len()));
        // (block, aligned position) of every pure delete and insert
        let mut deletes = Vec::new();
        let mut inserts = Vec::new();
        for run in collect_runs(&ops) {
            match run {
                Run::Equal { old: old_range, new: new_range } => {
                    for (i, j) in old_range.zip(new_range) {
                        blocks.push(DiffBlock::equal(old[i].0, new[j].0, old[i].1, new[j].1));
                    }
                }
                Run::Change { old: old_range, new: new_range } => {
                    let width = old_range.len().max(new_range.len());
                    for k in 0..width {
                        let i = old_range.start + k;
                        let j = new_range.start + k;
                        let block = match (old_range.contains(&i), new_range.contains(&j)) {
                            (true, true) => {
                                let segments = if self.word_diff {
                                    self.word_segments(old[i].1, new[j].1)
                                } else {
                                    Vec::new()
                                };
                                DiffBlock::replace(old[i].0, new[j].0, old[i].1, new[j].1, segments)
                            }
                            (true, false) => {
                                deletes.push((blocks.len(), i));
                                DiffBlock::delete(old[i].0, old[i].1)
                            }
                            (false, true) => {
                                inserts.push((blocks.len(), j));
                                DiffBlock::insert(new[j].0, new[j].1)
                            }
                            (false, false) => unreachable!("k < max(old, new) run length"),
                        };
                        blocks.push(block);
                    }
                }
            }
        }

        let moves = self.detect_moves(old, new, &old_keys, &new_keys, &deletes, &inserts);
        for (deleted, inserted) in moves {
            blocks[deleted].moved = true;
            blocks[inserted].moved = true;
        }
        blocks
    }

    /// Pair deleted paragraphs with inserted paragraphs of the same text.
    ///
    /// Occurrences pair up in document order, one delete per insert, so a
    /// move always shows up as exactly one flagged Delete and one flagged
    /// Insert. A pair counts as a move when its relative position shifted
    /// by more than the move threshold. Blank paragraphs never move.
    fn detect_moves(
        &self,
        old: &[(usize, &str)],
        new: &[(usize, &str)],
        old_keys: &[Fingerprint],
        new_keys: &[Fingerprint],
        deletes: &[(usize, usize)],
        inserts: &[(usize, usize)],
    ) -> Vec<(usize, usize)> {
        let mut waiting: HashMap<Fingerprint, VecDeque<(usize, usize)>> = HashMap::new();
        for &(block, j) in inserts {
            if !new[j].1.trim().is_empty() {
                waiting.entry(new_keys[j]).or_default().push_back((block, j));
            }
        }

        let old_len = old_keys.len().max(1) as f64;
        let new_len = new_keys.len().max(1) as f64;
        let mut moves = Vec::new();
        for &(deleted, i) in deletes {
            if old[i].1.trim().is_empty() {
                continue;
            }
            let Some((inserted, j)) = waiting.get_mut(&old_keys[i]).and_then(VecDeque::pop_front) else {
                continue;
            };
            let shift = (i as f64 / old_len - j as f64 / new_len).abs();
            if shift > self.move_threshold {
                tracing::trace!(original = old[i].0, modified = new[j].0, shift, "paragraph moved");
                moves.push((deleted, inserted));
            }
        }
        moves
    }
}
