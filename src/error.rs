//! Error types for the applicraft library.
//!
//! [`MaterialsError`] is the single fatal error returned by the top-level
//! entry points ([`crate::generate::generate_materials`],
//! [`crate::export::render_material`], ...). The collaborator errors
//! ([`GenerationError`], [`ParseError`]) and the renderer error
//! ([`RenderError`]) are wrapped into it with the material or format they
//! belong to, so one failed render never hides which document failed.
//!
//! Markup that looks malformed is never an error: the tokenizer resolves it
//! with fallback rules.

use crate::output::{MaterialKind, OutputFormat};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the applicraft library.
#[derive(Debug, Error)]
pub enum MaterialsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No resume text was supplied.
    #[error("Please upload and parse a resume.")]
    MissingResume,

    /// No job description was supplied.
    #[error("Please provide a job description.")]
    MissingJobDescription,

    /// The resume file could not be turned into text.
    #[error("Failed to parse resume: {0}")]
    ResumeParse(#[from] ParseError),

    // ── Generation errors ─────────────────────────────────────────────────
    /// One of the generation calls failed; no material is kept.
    #[error("Generation failed for {material}: {source}")]
    Generation {
        material: MaterialKind,
        #[source]
        source: GenerationError,
    },

    // ── Render errors ─────────────────────────────────────────────────────
    /// Rendering was requested for a material with no text.
    #[error("No content to download for {kind}.")]
    EmptyContent { kind: MaterialKind },

    /// A renderer failed; no partial document is produced.
    #[error("Failed to generate {format} file for {kind}: {source}")]
    Render {
        kind: MaterialKind,
        format: OutputFormat,
        #[source]
        source: RenderError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure inside one of the document renderers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// Building or zipping the DOCX package failed.
    #[error("DOCX generation failed: {0}")]
    Docx(String),

    /// Serialising the PDF failed.
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// Page geometry or metrics made layout impossible.
    #[error("Layout failed: {0}")]
    Layout(String),
}

/// Failure of the generative-text collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// No API key configured.
    #[error("Gemini API Key is not configured. Cannot make API calls.")]
    ApiKeyMissing,

    /// The API rejected the key.
    #[error("The provided API Key for Gemini is not valid. Please check your configuration.")]
    ApiKeyInvalid,

    /// The key lacks permission for the model or tool.
    #[error("Gemini API request failed due to permission issues. Check API key permissions.")]
    PermissionDenied,

    /// HTTP 429 from the API.
    #[error("Gemini API rate limit exceeded")]
    RateLimited,

    /// Any other non-success response.
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("Gemini API call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection or body decoding problem.
    #[error("Gemini API transport error: {0}")]
    Transport(String),

    /// The response carried no text.
    #[error("Gemini API returned no text")]
    EmptyResponse,
}

/// Failure of the resume text-extraction collaborator.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The resume file was not found.
    #[error("Resume file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file type has no text adapter.
    #[error("Unsupported file type: '{extension}' ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file is bigger than the accepted limit.
    #[error("Resume '{path}' is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The file contained no text.
    #[error("Resume '{path}' contains no text")]
    Empty { path: PathBuf },

    /// Reading the file failed.
    #[error("Error reading resume '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_display() {
        let e = MaterialsError::EmptyContent {
            kind: MaterialKind::Answers,
        };
        assert_eq!(
            e.to_string(),
            "No content to download for Job Application Answers."
        );
    }

    #[test]
    fn render_error_display_names_kind_and_format() {
        let e = MaterialsError::Render {
            kind: MaterialKind::Resume,
            format: OutputFormat::Pdf,
            source: RenderError::Pdf("boom".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("PDF"), "got: {msg}");
        assert!(msg.contains("Improved Resume"), "got: {msg}");
        assert!(msg.contains("boom"), "got: {msg}");
    }

    #[test]
    fn generation_error_display() {
        let e = MaterialsError::Generation {
            material: MaterialKind::CoverLetter,
            source: GenerationError::Api {
                status: 500,
                message: "backend overloaded".into(),
            },
        };
        assert!(e.to_string().contains("Cover Letter"));
        assert!(e.to_string().contains("500"));
    }

    #[test]
    fn parse_error_converts() {
        let e: MaterialsError = ParseError::UnsupportedFormat {
            path: "cv.pdf".into(),
            extension: "pdf".into(),
        }
        .into();
        assert!(matches!(e, MaterialsError::ResumeParse(_)));
    }
}
