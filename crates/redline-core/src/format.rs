//! Source format of an extracted document

use serde::{Deserialize, Serialize};

/// File family a [`DocumentContent`](crate::DocumentContent) was extracted from.
///
/// Only informational for the diff engine: every format is reduced to the
/// same paragraphs-plus-tables model before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Pdf,
    Word,
    Slides,
    Spreadsheet,
    Text,
    #[default]
    Unknown,
}

impl SourceFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" | "odt" | "rtf" => Some(Self::Word),
            "pptx" | "ppt" | "odp" => Some(Self::Slides),
            "xlsx" | "xlsm" | "xls" | "ods" | "csv" => Some(Self::Spreadsheet),
            "txt" | "text" | "md" => Some(Self::Text),
            _ => None,
        }
    }

    /// Detect format from a path, falling back to `Unknown`.
    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or_default()
    }

    /// What the major component of a [`Locator`](crate::Locator) counts in
    /// this format.
    pub fn locator_unit(&self) -> &'static str {
        match self {
            Self::Pdf | Self::Word | Self::Text | Self::Unknown => "page",
            Self::Slides => "slide",
            Self::Spreadsheet => "sheet",
        }
    }
}
