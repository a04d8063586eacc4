//! Canonical content model shared by every extractor and matcher
//!
//! Extraction collaborators reduce PDFs, Word files, slide decks and
//! spreadsheets to a [`DocumentContent`]: ordered paragraphs plus ordered
//! rectangular-ish tables. The diff engine only ever reads these values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fingerprint::{Fingerprint, normalize_text};
use crate::format::SourceFormat;

/// Position of a table within its source: page/slide/sheet index plus an
/// ordinal within that unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Locator {
    pub major: u32,
    pub minor: u32,
}

impl Locator {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub text: String,
}

impl Cell {
    pub fn new(row: usize, col: usize, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: text.into(),
        }
    }

    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_text(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub is_header: bool,
}

impl Row {
    pub fn new(index: usize, cells: Vec<Cell>, is_header: bool) -> Self {
        Self {
            index,
            cells,
            is_header,
        }
    }

    /// Build a row from cell texts, numbering columns from zero.
    pub fn from_texts<I, S>(index: usize, texts: I, is_header: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = texts
            .into_iter()
            .enumerate()
            .map(|(col, text)| Cell::new(index, col, text))
            .collect();
        Self::new(index, cells, is_header)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Text of the cell at `col`, or `""` for cells a ragged row lacks.
    pub fn cell_text(&self, col: usize) -> &str {
        self.cells.get(col).map_or("", |cell| cell.text.as_str())
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_sequence(self.cells.iter().map(Cell::fingerprint))
    }

    /// Normalized text of the first two cells, the fallback join key.
    pub fn key_values(&self) -> Vec<String> {
        self.key_values_n(2)
    }

    /// Normalized text of the first `n` cells; missing cells yield `""`.
    pub fn key_values_n(&self, n: usize) -> Vec<String> {
        (0..n).map(|col| normalize_text(self.cell_text(col))).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub rows: Vec<Row>,
    #[serde(default)]
    pub position: Locator,
}

impl Table {
    pub fn new(id: impl Into<String>, rows: Vec<Row>, position: Locator) -> Self {
        Self {
            id: id.into(),
            rows,
            position,
        }
    }

    /// Build a table from a grid of texts. When `has_header` is set the
    /// first grid row becomes the header row.
    pub fn from_grid<G, R, S>(
        id: impl Into<String>,
        position: Locator,
        has_header: bool,
        grid: G,
    ) -> Self
    where
        G: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = grid
            .into_iter()
            .enumerate()
            .map(|(index, texts)| Row::from_texts(index, texts, has_header && index == 0))
            .collect();
        Self::new(id, rows, position)
    }

    /// First row, when it is flagged as a header.
    pub fn header_row(&self) -> Option<&Row> {
        self.rows.first().filter(|row| row.is_header)
    }

    pub fn header_fingerprint(&self) -> Option<Fingerprint> {
        self.header_row().map(Row::fingerprint)
    }

    /// Widest row in the table.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Row::len).max().unwrap_or(0)
    }

    /// Rows that take part in row matching. Header rows anywhere in the
    /// table (repeated headers after page breaks) are excluded.
    pub fn data_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.is_header)
    }

    pub fn data_row_count(&self) -> usize {
        self.data_rows().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    /// Page, slide, or sheet the paragraph came from.
    #[serde(default)]
    pub locator: u32,
    /// Ordinal within the locator unit.
    #[serde(default)]
    pub ordinal: u32,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, locator: u32, ordinal: u32) -> Self {
        Self {
            text: text.into(),
            locator,
            ordinal,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    PageSkipped,
    TableSkipped,
    ParagraphSkipped,
    Other,
}

/// Something an extractor could not read. The affected content is absent
/// from the document; the diagnostic keeps that absence visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDiagnostic {
    pub kind: DiagnosticKind,
    #[serde(default)]
    pub locator: Option<Locator>,
    pub message: String,
}

impl ExtractionDiagnostic {
    pub fn new(kind: DiagnosticKind, locator: Option<Locator>, message: impl Into<String>) -> Self {
        Self {
            kind,
            locator,
            message: message.into(),
        }
    }
}

/// One extracted document. Produced once per comparison, read-only after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    #[serde(default)]
    pub format: SourceFormat,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ExtractionDiagnostic>,
}

impl DocumentContent {
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_paragraphs(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.paragraphs = paragraphs;
        self
    }

    /// Paragraphs from plain texts, all on locator 0.
    pub fn with_paragraph_texts<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paragraphs = texts
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Paragraph::new(text, 0, saturating_u32(ordinal)))
            .collect();
        self.with_paragraphs(paragraphs)
    }

    pub fn with_tables(mut self, tables: Vec<Table>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: ExtractionDiagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Deserialize a document handed over by an extractor as JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// True when the extractor had to drop content.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Ordinals past `u32::MAX` are clamped rather than wrapped.
fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
