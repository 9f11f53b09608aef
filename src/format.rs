//! Output-format registry.
//!
//! The service names its export formats with camelCase identifiers; several
//! of them share a file extension (three PDF flavours, two XML flavours, two
//! plain-text flavours). The registry is a closed table: anything outside it
//! is rejected before a single file is submitted.

use crate::error::OcrSdkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Export format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFormat {
    Docx,
    Pdfa,
    PdfTextAndImages,
    PdfSearchable,
    Pptx,
    Rtf,
    /// Plain text (default).
    #[default]
    Txt,
    TxtUnstructured,
    Xlsx,
    Xml,
    XmlForCorrectedImage,
}

impl OutputFormat {
    /// Every registered format, in the order they are listed in help output.
    pub const ALL: [OutputFormat; 11] = [
        OutputFormat::Docx,
        OutputFormat::Pdfa,
        OutputFormat::PdfTextAndImages,
        OutputFormat::PdfSearchable,
        OutputFormat::Pptx,
        OutputFormat::Rtf,
        OutputFormat::Txt,
        OutputFormat::TxtUnstructured,
        OutputFormat::Xlsx,
        OutputFormat::Xml,
        OutputFormat::XmlForCorrectedImage,
    ];

    /// Identifier sent to the service as `exportFormat`.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdfa => "pdfa",
            OutputFormat::PdfTextAndImages => "pdfTextAndImages",
            OutputFormat::PdfSearchable => "pdfSearchable",
            OutputFormat::Pptx => "pptx",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Txt => "txt",
            OutputFormat::TxtUnstructured => "txtUnstructured",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Xml => "xml",
            OutputFormat::XmlForCorrectedImage => "xmlForCorrectedImage",
        }
    }

    /// File extension of the downloaded result, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdfa | OutputFormat::PdfTextAndImages | OutputFormat::PdfSearchable => {
                "pdf"
            }
            OutputFormat::Pptx => "pptx",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Txt | OutputFormat::TxtUnstructured => "txt",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Xml | OutputFormat::XmlForCorrectedImage => "xml",
        }
    }

    fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OcrSdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| OcrSdkError::UnknownFormat {
                format: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

/// Look up the file extension for a format identifier.
///
/// Identifiers are matched exactly (`pdfSearchable`, not `pdfsearchable`).
pub fn extension_for(format: &str) -> Result<&'static str, OcrSdkError> {
    format.parse::<OutputFormat>().map(OutputFormat::extension)
}
