//! PDF renderer.
//!
//! Rendering runs in two steps:
//!
//! 1. [`layout`]: place every block on A4 pages, producing a display list
//! 2. [`writer`]: serialise the display list with `pdf-writer`
//!
//! ## Known fidelity gap
//!
//! Paragraphs of justified kinds (cover letters, resumes) are drawn as one
//! plain string per wrapped line: bold spans and links inside them are shown
//! as regular text. Bullets keep their styling.
//!
//! Answers are not justified. Their paragraphs are left-aligned and keep
//! bold runs and clickable links. Only
//! [`MaterialKind::justifies_body`](crate::output::MaterialKind::justifies_body)
//! decides which path a paragraph takes.

pub mod layout;
pub mod metrics;
pub mod writer;

pub use layout::{lay_out, DrawOp, LaidOutDocument, LaidOutPage, PdfLayout, Rgb};
pub use metrics::FontFace;

use crate::document::Document;
use crate::error::RenderError;
use crate::output::MaterialKind;

/// Render a document to PDF bytes on A4 pages.
pub fn render_pdf(doc: &Document, kind: MaterialKind) -> Result<Vec<u8>, RenderError> {
    render_pdf_with_layout(doc, kind, &PdfLayout::default())
}

/// Render with a custom page geometry.
pub fn render_pdf_with_layout(
    doc: &Document,
    kind: MaterialKind,
    layout: &PdfLayout,
) -> Result<Vec<u8>, RenderError> {
    let laid_out = lay_out(doc, kind, layout)?;
    writer::write_pdf(&laid_out, layout, kind.friendly_name())
}
