//! Serialise a laid-out display list with `pdf-writer`.
//!
//! Object layout: catalog, page tree, the two standard fonts and the
//! document information dictionary come first, followed by one page object,
//! one content stream and any link annotations per page.

use super::layout::{DrawOp, LaidOutDocument, PdfLayout, Rgb};
use super::metrics::{encode_win_ansi, FontFace};
use crate::error::RenderError;
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

const PRODUCER: &str = concat!("applicraft ", env!("CARGO_PKG_VERSION"));

struct RefAllocator(i32);

impl RefAllocator {
    fn next(&mut self) -> Ref {
        let id = Ref::new(self.0);
        self.0 += 1;
        id
    }
}

/// Write the PDF file for `doc`.
pub fn write_pdf(
    doc: &LaidOutDocument,
    layout: &PdfLayout,
    title: &str,
) -> Result<Vec<u8>, RenderError> {
    check_finite(doc)?;

    let mut alloc = RefAllocator(1);
    let catalog_id = alloc.next();
    let tree_id = alloc.next();
    let regular_id = alloc.next();
    let bold_id = alloc.next();
    let info_id = alloc.next();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));

    for (id, face) in [(regular_id, FontFace::Regular), (bold_id, FontFace::Bold)] {
        pdf.type1_font(id)
            .base_font(Name(face.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let page_ids: Vec<Ref> = doc.pages.iter().map(|_| alloc.next()).collect();
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    let height = layout.page_height;
    for (page, &page_id) in doc.pages.iter().zip(&page_ids) {
        let content_id = alloc.next();
        let mut content = Content::new();
        let mut links = Vec::new();
        let mut word_spacing = 0.0;

        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    text,
                    face,
                    size,
                    color,
                    word_spacing: spacing,
                } => {
                    let Rgb(r, g, b) = *color;
                    content.set_fill_rgb(r, g, b);
                    content.begin_text();
                    content.set_font(Name(face.resource_name()), *size);
                    // Tw is text state and survives ET, so reset it explicitly.
                    if *spacing != word_spacing {
                        content.set_word_spacing(*spacing);
                        word_spacing = *spacing;
                    }
                    content.next_line(*x, height - *y);
                    content.show(Str(&encode_win_ansi(text)));
                    content.end_text();
                }
                DrawOp::Rule {
                    x1,
                    x2,
                    y,
                    width,
                    color,
                } => {
                    let Rgb(r, g, b) = *color;
                    content.set_stroke_rgb(r, g, b);
                    content.set_line_width(*width);
                    content.move_to(*x1, height - *y);
                    content.line_to(*x2, height - *y);
                    content.stroke();
                }
                DrawOp::Link {
                    x1,
                    y1,
                    x2,
                    y2,
                    url,
                } => {
                    links.push((
                        alloc.next(),
                        Rect::new(*x1, height - *y2, *x2, height - *y1),
                        url.as_str(),
                    ));
                }
            }
        }

        pdf.stream(content_id, &content.finish());

        for (id, rect, url) in &links {
            let mut annotation = pdf.annotation(*id);
            annotation.subtype(AnnotationType::Link).rect(*rect);
            annotation.border_style().width(0.0);
            annotation
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(url.as_bytes()));
        }

        let mut page_writer = pdf.page(page_id);
        page_writer
            .media_box(Rect::new(0.0, 0.0, layout.page_width, height))
            .parent(tree_id)
            .contents(content_id);
        page_writer
            .resources()
            .fonts()
            .pair(Name(FontFace::Regular.resource_name()), regular_id)
            .pair(Name(FontFace::Bold.resource_name()), bold_id);
        if !links.is_empty() {
            page_writer.annotations(links.iter().map(|(id, ..)| *id));
        }
    }

    Ok(pdf.finish())
}

fn check_finite(doc: &LaidOutDocument) -> Result<(), RenderError> {
    let finite = doc.ops().all(|op| match op {
        DrawOp::Text { x, y, size, word_spacing, .. } => {
            [*x, *y, *size, *word_spacing].iter().all(|v| v.is_finite())
        }
        DrawOp::Rule { x1, x2, y, width, .. } => {
            [*x1, *x2, *y, *width].iter().all(|v| v.is_finite())
        }
        DrawOp::Link { x1, y1, x2, y2, .. } => {
            [*x1, *y1, *x2, *y2].iter().all(|v| v.is_finite())
        }
    });
    if finite {
        Ok(())
    } else {
        Err(RenderError::Pdf("display list contains a non-finite coordinate".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pdf::layout::LaidOutPage;

    fn page(ops: Vec<DrawOp>) -> LaidOutPage {
        LaidOutPage { ops }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn writes_header_fonts_and_pages() {
        let doc = LaidOutDocument {
            pages: vec![page(vec![]), page(vec![])],
        };
        let bytes = write_pdf(&doc, &PdfLayout::default(), "Improved Resume").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/Times-Roman"));
        assert!(contains(&bytes, b"/Times-Bold"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
        assert!(contains(&bytes, b"/Count 2"));
    }

    #[test]
    fn writes_uri_annotation_for_links() {
        let doc = LaidOutDocument {
            pages: vec![page(vec![DrawOp::Link {
                x1: 50.0,
                y1: 40.0,
                x2: 150.0,
                y2: 52.0,
                url: "https://example.com/x".into(),
            }])],
        };
        let bytes = write_pdf(&doc, &PdfLayout::default(), "Cover Letter").unwrap();
        assert!(contains(&bytes, b"/Subtype /Link"));
        assert!(contains(&bytes, b"/URI"));
        assert!(contains(&bytes, b"(https://example.com/x)"));
        assert!(contains(&bytes, b"/Annots"));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let doc = LaidOutDocument {
            pages: vec![page(vec![DrawOp::Rule {
                x1: 0.0,
                x2: f32::NAN,
                y: 10.0,
                width: 0.5,
                color: Rgb::BLACK,
            }])],
        };
        assert!(matches!(
            write_pdf(&doc, &PdfLayout::default(), "x"),
            Err(RenderError::Pdf(_))
        ));
    }
}
