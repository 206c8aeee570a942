//! Export: render generated materials to DOCX or PDF and save them.
//!
//! [`render_material`] is the single entry point for one document. It checks
//! for content, tokenizes, picks the renderer for the requested
//! [`OutputFormat`] and derives the file name. Start and outcome are
//! reported to the activity log under module `DocGen`.
//!
//! [`export_materials`] renders and saves several documents one after
//! another, pausing [`ExportConfig::settle_delay`] before each write.

use crate::activity::{ActivitySink, Level};
use crate::config::ExportConfig;
use crate::error::MaterialsError;
use crate::naming::derive_file_name;
use crate::output::{GeneratedMaterials, MaterialKind, OutputFormat, RenderedDocument};
use crate::pipeline::docx::render_docx;
use crate::pipeline::pdf::{render_pdf_with_layout, PdfLayout};
use crate::pipeline::tokenize::tokenize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

const MODULE: &str = "DocGen";

/// Render one material to bytes.
///
/// # Errors
/// - [`MaterialsError::EmptyContent`] if `text` is blank.
/// - [`MaterialsError::Render`] if the renderer fails; no partial document
///   is returned.
pub fn render_material(
    text: &str,
    kind: MaterialKind,
    format: OutputFormat,
    applicant: Option<&str>,
    company: Option<&str>,
    layout: &PdfLayout,
    activity: &dyn ActivitySink,
) -> Result<RenderedDocument, MaterialsError> {
    let function = match format {
        OutputFormat::Docx => "generate_docx",
        OutputFormat::Pdf => "generate_pdf",
    };

    if text.trim().is_empty() {
        activity.record(
            Level::Error,
            MODULE,
            function,
            &format!("No content to download for {}.", kind.friendly_name()),
            None,
        );
        return Err(MaterialsError::EmptyContent { kind });
    }

    let file_name = derive_file_name(applicant, company, kind, format);
    activity.record(
        Level::Info,
        MODULE,
        function,
        &format!("Starting {} generation for {}", format, kind.friendly_name()),
        Some(serde_json::json!({ "fileName": file_name })),
    );

    let start = Instant::now();
    let doc = tokenize(text);
    debug!("Tokenized {} into {} blocks", kind, doc.len());

    let rendered = match format {
        OutputFormat::Docx => render_docx(&doc, kind),
        OutputFormat::Pdf => render_pdf_with_layout(&doc, kind, layout),
    };

    match rendered {
        Ok(bytes) => {
            info!(
                "Rendered {} as {} ({} bytes, {}ms)",
                kind,
                format,
                bytes.len(),
                start.elapsed().as_millis()
            );
            activity.record(
                Level::Info,
                MODULE,
                function,
                &format!("{} generated successfully: {}", format, file_name),
                None,
            );
            Ok(RenderedDocument {
                kind,
                format,
                file_name,
                bytes,
            })
        }
        Err(source) => {
            activity.record(
                Level::Error,
                MODULE,
                function,
                &format!("Error generating {} for {}", format, kind.friendly_name()),
                Some(serde_json::json!({ "error": source.to_string() })),
            );
            Err(MaterialsError::Render {
                kind,
                format,
                source,
            })
        }
    }
}

/// Write a rendered document into `dir` under its derived file name.
///
/// Waits `settle_delay` first, then writes to a temporary sibling and
/// renames it into place. Returns the final path.
pub async fn save_document(
    doc: &RenderedDocument,
    dir: &Path,
    settle_delay: std::time::Duration,
) -> Result<PathBuf, MaterialsError> {
    if !settle_delay.is_zero() {
        tokio::time::sleep(settle_delay).await;
    }

    let path = dir.join(&doc.file_name);
    let write_err = |source| MaterialsError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

    // Atomic write: write to temp, then rename
    let tmp_path = path.with_extension(format!("{}.tmp", doc.format.extension()));
    tokio::fs::write(&tmp_path, &doc.bytes)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(write_err)?;

    debug!("Wrote {} ({} bytes)", path.display(), doc.bytes.len());
    Ok(path)
}

/// Render and save every non-empty material in `kinds`, one at a time.
///
/// Materials without text are skipped with a log entry rather than failing
/// the batch. The first render or write failure stops the export.
pub async fn export_materials(
    materials: &GeneratedMaterials,
    kinds: &[MaterialKind],
    format: OutputFormat,
    dir: &Path,
    config: &ExportConfig,
    activity: &dyn ActivitySink,
) -> Result<Vec<PathBuf>, MaterialsError> {
    let mut written = Vec::with_capacity(kinds.len());

    for &kind in kinds {
        let text = materials.text(kind);
        if text.trim().is_empty() {
            activity.record(
                Level::Info,
                MODULE,
                "export_materials",
                &format!("Skipping {}: no content.", kind.friendly_name()),
                None,
            );
            continue;
        }

        let doc = render_material(
            text,
            kind,
            format,
            materials.applicant_name.as_deref(),
            materials.company_name.as_deref(),
            &config.pdf_layout,
            activity,
        )?;
        written.push(save_document(&doc, dir, config.settle_delay()).await?);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityLog, NoopSink};
    use crate::error::RenderError;
    use std::time::Duration;

    fn materials() -> GeneratedMaterials {
        GeneratedMaterials {
            cover_letter: "Dear Hiring Team,\n\nI would love to join.".into(),
            resume: "**EXPERIENCE**\n* Built **Rust** services\n---\n**EDUCATION**\nBSc".into(),
            answers: String::new(),
            applicant_name: Some("Jane Doe".into()),
            company_name: Some("Acme Corp".into()),
        }
    }

    #[test]
    fn renders_docx_with_derived_name() {
        let log = ActivityLog::in_memory();
        let m = materials();
        let doc = render_material(
            &m.resume,
            MaterialKind::Resume,
            OutputFormat::Docx,
            Some("Jane Doe"),
            Some("Acme Corp"),
            &PdfLayout::default(),
            &log,
        )
        .unwrap();
        assert_eq!(doc.file_name, "Acme_Corp_Jane_Doe_Resume.docx");
        assert!(doc.bytes.starts_with(b"PK"));

        let text = log.format_as_text();
        assert!(text.contains("[INFO] DocGen.generate_docx - Starting DOCX generation for Improved Resume"));
        assert!(text.contains("DOCX generated successfully: Acme_Corp_Jane_Doe_Resume.docx"));
    }

    #[test]
    fn renders_pdf() {
        let doc = render_material(
            "Hello",
            MaterialKind::CoverLetter,
            OutputFormat::Pdf,
            None,
            None,
            &PdfLayout::default(),
            &NoopSink,
        )
        .unwrap();
        assert_eq!(doc.file_name, "Cover_Letter.pdf");
        assert!(doc.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn blank_text_is_empty_content() {
        let log = ActivityLog::in_memory();
        let err = render_material(
            "  \n ",
            MaterialKind::Answers,
            OutputFormat::Pdf,
            None,
            None,
            &PdfLayout::default(),
            &log,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MaterialsError::EmptyContent {
                kind: MaterialKind::Answers
            }
        ));
        assert!(log.format_as_text().contains("[ERROR] DocGen.generate_pdf"));
    }

    #[test]
    fn renderer_failure_is_wrapped_and_logged() {
        let log = ActivityLog::in_memory();
        let broken = PdfLayout {
            margin: 400.0,
            ..PdfLayout::default()
        };
        let err = render_material(
            "Hello",
            MaterialKind::Resume,
            OutputFormat::Pdf,
            None,
            None,
            &broken,
            &log,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MaterialsError::Render {
                kind: MaterialKind::Resume,
                format: OutputFormat::Pdf,
                source: RenderError::Layout(_)
            }
        ));
        assert!(log
            .format_as_text()
            .contains("Error generating PDF for Improved Resume"));
    }

    #[tokio::test]
    async fn save_document_writes_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let doc = RenderedDocument {
            kind: MaterialKind::Answers,
            format: OutputFormat::Pdf,
            file_name: "Job_Application_Answers.pdf".into(),
            bytes: b"%PDF-1.7 test".to_vec(),
        };
        let path = save_document(&doc, dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(path, dir.path().join("Job_Application_Answers.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 test");
        assert!(!dir.path().join("Job_Application_Answers.pdf.tmp").exists());
    }

    #[tokio::test]
    async fn export_skips_empty_materials() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            settle_delay_ms: 1,
            ..ExportConfig::default()
        };
        let paths = export_materials(
            &materials(),
            &MaterialKind::ALL,
            OutputFormat::Docx,
            dir.path(),
            &config,
            &NoopSink,
        )
        .await
        .unwrap();

        let names: Vec<_> = paths
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect();
        assert_eq!(
            names,
            vec![
                "Acme_Corp_Jane_Doe_Cover_Letter.docx",
                "Acme_Corp_Jane_Doe_Resume.docx"
            ]
        );
    }
}
