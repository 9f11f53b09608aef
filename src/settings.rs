//! What to ask the service to do with each file.
//!
//! [`ProcessingSettings`] is built once per run and shared read-only by every
//! task in the batch.

use crate::error::OcrSdkError;
use crate::format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default recognition language.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Which recognition call a file is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operation {
    /// Full-page recognition exported in the selected [`OutputFormat`].
    #[default]
    RecognizeImage,
    /// Single text-field recognition; results are always XML.
    RecognizeTextField,
}

impl Operation {
    /// Service method that starts a task for this operation.
    pub fn method(self) -> &'static str {
        match self {
            Operation::RecognizeImage => "processImage",
            Operation::RecognizeTextField => "processTextField",
        }
    }
}

/// Font / character-class hint for text-field recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextType {
    Normal,
    Typewriter,
    Matrix,
    Index,
    OcrA,
    OcrB,
    E13b,
    Cmc7,
    Gothic,
}

impl TextType {
    /// Every hint, in the order the service documents them.
    pub const ALL: [TextType; 9] = [
        TextType::Normal,
        TextType::Typewriter,
        TextType::Matrix,
        TextType::Index,
        TextType::OcrA,
        TextType::OcrB,
        TextType::E13b,
        TextType::Cmc7,
        TextType::Gothic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Normal => "normal",
            TextType::Typewriter => "typewriter",
            TextType::Matrix => "matrix",
            TextType::Index => "index",
            TextType::OcrA => "ocrA",
            TextType::OcrB => "ocrB",
            TextType::E13b => "e13b",
            TextType::Cmc7 => "cmc7",
            TextType::Gothic => "gothic",
        }
    }
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextType {
    type Err = OcrSdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| OcrSdkError::UnknownTextType {
                text_type: s.to_string(),
                supported: Self::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Ordered, de-duplicated set of [`TextType`] hints.
///
/// Renders as the comma-joined list the service expects in `textType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTypes(Vec<TextType>);

impl TextTypes {
    /// The "all types" shortcut.
    pub fn all() -> Self {
        Self(TextType::ALL.to_vec())
    }

    /// Build a set from individual hints; duplicates are dropped, order kept.
    /// An empty input yields the "all types" shortcut.
    pub fn new(types: impl IntoIterator<Item = TextType>) -> Self {
        let mut set = Vec::new();
        for t in types {
            if !set.contains(&t) {
                set.push(t);
            }
        }
        if set.is_empty() {
            return Self::all();
        }
        Self(set)
    }

    /// Parse `"ocrA"`, `"ocrA,e13b"` or `"all"`.
    pub fn parse(s: &str) -> Result<Self, OcrSdkError> {
        let mut types = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part == "all" {
                return Ok(Self::all());
            }
            types.push(part.parse::<TextType>()?);
        }
        Ok(Self::new(types))
    }

    pub fn as_slice(&self) -> &[TextType] {
        &self.0
    }
}

impl Default for TextTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for TextTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

/// Immutable description of one recognition request.
///
/// # Example
/// ```rust
/// use ocrsdk_batch::{Operation, OutputFormat, ProcessingSettings};
///
/// let settings = ProcessingSettings::builder()
///     .language("German")
///     .output_format(OutputFormat::Docx)
///     .build();
/// assert_eq!(settings.operation, Operation::RecognizeImage);
/// assert_eq!(settings.output_extension(), "docx");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    pub operation: Operation,
    /// Recognition language, passed through verbatim. Default: "English".
    pub language: String,
    /// Only meaningful for [`Operation::RecognizeImage`].
    pub output_format: OutputFormat,
    /// Only meaningful for [`Operation::RecognizeTextField`].
    pub text_type: TextTypes,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            operation: Operation::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            output_format: OutputFormat::default(),
            text_type: TextTypes::default(),
        }
    }
}

impl ProcessingSettings {
    pub fn builder() -> ProcessingSettingsBuilder {
        ProcessingSettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Format whose extension names the output file.
    ///
    /// Text-field results are always XML, whatever `output_format` says.
    pub fn effective_format(&self) -> OutputFormat {
        match self.operation {
            Operation::RecognizeImage => self.output_format,
            Operation::RecognizeTextField => OutputFormat::Xml,
        }
    }

    pub fn output_extension(&self) -> &'static str {
        self.effective_format().extension()
    }

    /// Query parameters for the submit call.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self.operation {
            Operation::RecognizeImage => vec![
                ("language", self.language.clone()),
                ("exportFormat", self.output_format.as_str().to_string()),
            ],
            Operation::RecognizeTextField => vec![
                ("language", self.language.clone()),
                ("textType", self.text_type.to_string()),
            ],
        }
    }
}

/// Builder for [`ProcessingSettings`].
#[derive(Debug)]
pub struct ProcessingSettingsBuilder {
    settings: ProcessingSettings,
}

impl ProcessingSettingsBuilder {
    pub fn operation(mut self, op: Operation) -> Self {
        self.settings.operation = op;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.settings.language = language.into();
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.settings.output_format = format;
        self
    }

    pub fn text_type(mut self, types: TextTypes) -> Self {
        self.settings.text_type = types;
        self
    }

    pub fn build(self) -> ProcessingSettings {
        self.settings
    }
}
