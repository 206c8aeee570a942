//! Resume source: turn an uploaded resume file into plain text.
//!
//! Text extraction is a collaborator behind [`ResumeParser`]. The built-in
//! [`PlainTextParser`] handles `.txt` files; PDF and Word resumes are
//! rejected with [`ParseError::UnsupportedFormat`] so callers can plug in
//! their own extractor.

use crate::activity::{ActivitySink, Level};
use crate::error::ParseError;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

/// Largest resume file accepted, in bytes (5 MB).
pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

/// Extracts plain text from a resume file.
pub trait ResumeParser: Send + Sync {
    fn parse(&self, path: &Path) -> impl Future<Output = Result<String, ParseError>> + Send;
}

/// Reads UTF-8 `.txt` resumes.
///
/// Invalid UTF-8 sequences are replaced rather than rejected; the text is
/// trimmed and must not be empty.
#[derive(Debug, Clone)]
pub struct PlainTextParser {
    max_bytes: u64,
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self {
            max_bytes: MAX_RESUME_BYTES,
        }
    }
}

impl PlainTextParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the size limit.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl ResumeParser for PlainTextParser {
    async fn parse(&self, path: &Path) -> Result<String, ParseError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if extension != "txt" {
            return Err(ParseError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            });
        }

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ParseError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ParseError::Read {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        if metadata.len() > self.max_bytes {
            return Err(ParseError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.max_bytes,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| ParseError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text = String::from_utf8_lossy(&bytes).trim().to_string();
        if text.is_empty() {
            return Err(ParseError::Empty {
                path: path.to_path_buf(),
            });
        }

        debug!("Read {} chars of resume text from {}", text.len(), path.display());
        Ok(text)
    }
}

/// Parse a resume and report the outcome to the activity log.
pub async fn load_resume<P: ResumeParser>(
    parser: &P,
    path: &Path,
    activity: &dyn ActivitySink,
) -> Result<String, ParseError> {
    activity.record(
        Level::Info,
        "ResumeSource",
        "load_resume",
        &format!("Parsing resume file: {}", path.display()),
        None,
    );

    match parser.parse(path).await {
        Ok(text) => {
            info!("Parsed resume {} ({} chars)", path.display(), text.len());
            activity.record(
                Level::Info,
                "ResumeSource",
                "load_resume",
                "Resume parsed successfully.",
                Some(serde_json::json!({ "textLength": text.len() })),
            );
            Ok(text)
        }
        Err(e) => {
            activity.record(
                Level::Error,
                "ResumeSource",
                "load_resume",
                "Failed to parse resume.",
                Some(serde_json::json!({ "error": e.to_string() })),
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityLog;
    use std::io::Write;

    fn temp_with(name: &str, contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn reads_and_trims_text() {
        let (_dir, path) = temp_with("cv.txt", b"\n  Jane Doe\nEngineer  \n\n");
        let text = PlainTextParser::new().parse(&path).await.unwrap();
        assert_eq!(text, "Jane Doe\nEngineer");
    }

    #[tokio::test]
    async fn extension_is_case_insensitive() {
        let (_dir, path) = temp_with("CV.TXT", b"Jane");
        assert!(PlainTextParser::new().parse(&path).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_other_formats() {
        let (_dir, path) = temp_with("cv.pdf", b"%PDF-1.7");
        let err = PlainTextParser::new().parse(&path).await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat { ref extension, .. } if extension == "pdf"));
    }

    #[tokio::test]
    async fn rejects_missing_empty_and_oversized_files() {
        let parser = PlainTextParser::with_max_bytes(8);
        let missing = parser.parse(Path::new("/definitely/not/here.txt")).await;
        assert!(matches!(missing, Err(ParseError::FileNotFound { .. })));

        let (_d1, empty) = temp_with("empty.txt", b"   \n\t");
        assert!(matches!(parser.parse(&empty).await, Err(ParseError::Empty { .. })));

        let (_d2, big) = temp_with("big.txt", b"0123456789");
        assert!(matches!(
            parser.parse(&big).await,
            Err(ParseError::TooLarge { size: 10, limit: 8, .. })
        ));
    }

    #[tokio::test]
    async fn load_resume_logs_outcome() {
        let log = ActivityLog::in_memory();
        let (_dir, path) = temp_with("cv.txt", b"Jane");
        load_resume(&PlainTextParser::new(), &path, &log).await.unwrap();
        assert!(log.format_as_text().contains("Resume parsed successfully."));

        let _ = load_resume(&PlainTextParser::new(), Path::new("cv.docx"), &log).await;
        assert!(log.format_as_text().contains("[ERROR] ResumeSource.load_resume"));
    }
}
