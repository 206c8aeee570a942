//! Output types: material kinds, formats and the results handed back to callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which application material a text or document represents.
///
/// The kind selects the alignment and spacing policy of the renderers and the
/// label used in derived file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    CoverLetter,
    Resume,
    Answers,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 3] = [
        MaterialKind::CoverLetter,
        MaterialKind::Resume,
        MaterialKind::Answers,
    ];

    /// Label appended to personalised file names.
    pub fn file_label(self) -> &'static str {
        match self {
            MaterialKind::CoverLetter => "Cover_Letter",
            MaterialKind::Resume => "Resume",
            MaterialKind::Answers => "Answers",
        }
    }

    /// File stem used when neither applicant nor company is known.
    pub fn generic_file_stem(self) -> &'static str {
        match self {
            MaterialKind::CoverLetter => "Cover_Letter",
            MaterialKind::Resume => "Improved_Resume",
            MaterialKind::Answers => "Job_Application_Answers",
        }
    }

    /// Human-readable name for messages.
    pub fn friendly_name(self) -> &'static str {
        match self {
            MaterialKind::CoverLetter => "Cover Letter",
            MaterialKind::Resume => "Improved Resume",
            MaterialKind::Answers => "Job Application Answers",
        }
    }

    /// Body paragraphs are justified for letters and resumes, left-aligned otherwise.
    pub fn justifies_body(self) -> bool {
        matches!(self, MaterialKind::CoverLetter | MaterialKind::Resume)
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.friendly_name())
    }
}

/// Target document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Docx => "DOCX",
            OutputFormat::Pdf => "PDF",
        })
    }
}

/// The cleaned results of one generation cycle.
///
/// Produced only when every generation call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMaterials {
    pub cover_letter: String,
    pub resume: String,
    /// Empty when no questions were asked.
    pub answers: String,
    /// Applicant name reported by the model, if any.
    pub applicant_name: Option<String>,
    /// Company name reported by the model, if any.
    pub company_name: Option<String>,
}

impl GeneratedMaterials {
    /// Text for the given material.
    pub fn text(&self, kind: MaterialKind) -> &str {
        match kind {
            MaterialKind::CoverLetter => &self.cover_letter,
            MaterialKind::Resume => &self.resume,
            MaterialKind::Answers => &self.answers,
        }
    }
}

/// A rendered document ready to be saved.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub kind: MaterialKind,
    pub format: OutputFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn justification_policy() {
        assert!(MaterialKind::CoverLetter.justifies_body());
        assert!(MaterialKind::Resume.justifies_body());
        assert!(!MaterialKind::Answers.justifies_body());
    }

    #[test]
    fn text_by_kind() {
        let m = GeneratedMaterials {
            cover_letter: "letter".into(),
            resume: "resume".into(),
            answers: String::new(),
            ..Default::default()
        };
        assert_eq!(m.text(MaterialKind::CoverLetter), "letter");
        assert_eq!(m.text(MaterialKind::Answers), "");
    }

    #[test]
    fn format_display_and_extension() {
        assert_eq!(OutputFormat::Pdf.to_string(), "PDF");
        assert_eq!(OutputFormat::Docx.extension(), "docx");
    }
}
