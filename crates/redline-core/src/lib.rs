//! Structured diffing for document redlines
//!
//! Compares two extracted documents (paragraphs plus tables) and produces a
//! diff precise enough to drive a visual redline: paragraph-level alignment
//! with word-level detail, and table comparison that recognises reordered
//! columns, re-sorted rows, and added or deleted rows.
//!
//! ```
//! use redline_core::{DiffConfig, DiffOrchestrator, DocumentContent, Paragraph, SourceFormat};
//!
//! let original = DocumentContent::new(SourceFormat::Word)
//!     .with_paragraphs(vec![Paragraph::new("Alpha", 0, 0), Paragraph::new("Beta", 0, 1)]);
//! let modified = DocumentContent::new(SourceFormat::Word)
//!     .with_paragraphs(vec![Paragraph::new("Alpha", 0, 0), Paragraph::new("Beta2", 0, 1)]);
//!
//! let diff = DiffOrchestrator::new(DiffConfig::default()).compare(&original, &modified);
//! assert_eq!(diff.stats.paragraphs_modified, 1);
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod format;
pub mod model;
pub mod paragraph;
pub mod table;

pub use config::{AlignmentAlgorithm, DiffConfig};
pub use diff::{DiffOrchestrator, DiffStats, DocumentDiff, DocumentSide, SideDiagnostic, TablePair};
pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, normalize_text};
pub use format::SourceFormat;
pub use model::{
    Cell, DiagnosticKind, DocumentContent, ExtractionDiagnostic, Locator, Paragraph, Row, Table,
};
pub use paragraph::{DiffBlock, DiffOperation, ParagraphDiffer, SegmentOp, WordSegment};
pub use table::{
    CellChange, CellChangeType, ColumnMapping, ColumnReorderDetector, RowChange, RowChangeType,
    RowMatch, RowMatcher, RowMatching, TableDiff, TableDiffer, TableMatch, TableMatcher,
};
