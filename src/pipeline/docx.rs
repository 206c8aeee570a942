//! Word renderer: [`Document`] → `.docx` package.
//!
//! The package is written by hand as WordprocessingML parts inside a zip
//! container. Word handles pagination and line wrapping, so this renderer
//! only maps blocks to paragraphs and runs:
//!
//! | Block | Paragraph |
//! |-------|-----------|
//! | Header | bold 14 pt run, 240/120 twips before/after |
//! | Separator | empty, bottom border, 100/200 before/after |
//! | Bullet | bullet numbering, 100 after, left |
//! | Paragraph | 100 after, justified for letters and resumes |
//! | BlankLine | empty, 120 after in cover letters, 100 otherwise |
//!
//! Hyperlink runs become `w:hyperlink` elements pointing at external
//! relationships and use the `Hyperlink` character style.

use crate::document::{Block, Document, InlineRun};
use crate::error::RenderError;
use crate::output::MaterialKind;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const FONT: &str = "Times New Roman";
const BODY_HALF_POINTS: u32 = 24;
const HEADER_HALF_POINTS: u32 = 28;
const LINK_COLOR: &str = "0563C1";
const BULLET_NUM_ID: u32 = 1;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Render a document to `.docx` bytes.
pub fn render_docx(doc: &Document, kind: MaterialKind) -> Result<Vec<u8>, RenderError> {
    let mut body = BodyWriter::new(kind);
    for block in doc {
        body.block(block);
    }
    let (document_xml, hyperlinks) = body.finish();

    let parts = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("word/document.xml", document_xml),
        ("word/_rels/document.xml.rels", document_rels_xml(&hyperlinks)),
        ("word/styles.xml", styles_xml()),
        ("word/numbering.xml", numbering_xml()),
        ("docProps/core.xml", core_xml(kind.friendly_name())),
    ];
    package(&parts)
}

fn package(parts: &[(&str, String)]) -> Result<Vec<u8>, RenderError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, xml) in parts {
        zip.start_file(*name, options).map_err(docx_error)?;
        zip.write_all(xml.as_bytes()).map_err(docx_error)?;
    }

    let cursor = zip.finish().map_err(docx_error)?;
    Ok(cursor.into_inner())
}

fn docx_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Docx(e.to_string())
}

// ── Body ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Justification {
    Left,
    Both,
}

impl Justification {
    fn as_str(self) -> &'static str {
        match self {
            Justification::Left => "left",
            Justification::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ParagraphProps {
    bullet: bool,
    bottom_border: bool,
    before: Option<u32>,
    after: u32,
    justification: Option<Justification>,
}

impl ParagraphProps {
    fn spaced(after: u32) -> Self {
        Self {
            bullet: false,
            bottom_border: false,
            before: None,
            after,
            justification: None,
        }
    }
}

struct BodyWriter {
    kind: MaterialKind,
    xml: String,
    /// Hyperlink targets; the relationship id is `rId{index + 3}`.
    hyperlinks: Vec<String>,
}

impl BodyWriter {
    fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            xml: String::new(),
            hyperlinks: Vec::new(),
        }
    }

    fn finish(self) -> (String, Vec<String>) {
        let xml = format!(
            concat!(
                "{decl}\n<w:document xmlns:w=\"{w}\" xmlns:r=\"{r}\"><w:body>{body}",
                "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>",
                "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" ",
                "w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>",
                "</w:body></w:document>"
            ),
            decl = XML_DECL,
            w = NS_W,
            r = NS_R,
            body = self.xml,
        );
        (xml, self.hyperlinks)
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Header { label } => {
                let props = ParagraphProps {
                    before: Some(240),
                    justification: Some(Justification::Left),
                    ..ParagraphProps::spaced(120)
                };
                self.open_paragraph(&props);
                self.text_run(label, true, HEADER_HALF_POINTS);
                self.close_paragraph();
            }
            Block::Separator => {
                let props = ParagraphProps {
                    bottom_border: true,
                    before: Some(100),
                    ..ParagraphProps::spaced(200)
                };
                self.open_paragraph(&props);
                self.close_paragraph();
            }
            Block::Bullet { runs, .. } => {
                let props = ParagraphProps {
                    bullet: true,
                    justification: Some(Justification::Left),
                    ..ParagraphProps::spaced(100)
                };
                self.open_paragraph(&props);
                self.runs(runs);
                self.close_paragraph();
            }
            Block::Paragraph { runs } => {
                let justification = if self.kind.justifies_body() {
                    Justification::Both
                } else {
                    Justification::Left
                };
                let props = ParagraphProps {
                    justification: Some(justification),
                    ..ParagraphProps::spaced(100)
                };
                self.open_paragraph(&props);
                self.runs(runs);
                self.close_paragraph();
            }
            Block::BlankLine => {
                let after = if self.kind == MaterialKind::CoverLetter {
                    120
                } else {
                    100
                };
                self.open_paragraph(&ParagraphProps::spaced(after));
                self.close_paragraph();
            }
        }
    }

    fn open_paragraph(&mut self, props: &ParagraphProps) {
        self.xml.push_str("<w:p><w:pPr>");
        if props.bullet {
            let _ = write!(
                self.xml,
                "<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"{BULLET_NUM_ID}\"/></w:numPr>"
            );
        }
        if props.bottom_border {
            self.xml.push_str(
                "<w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"auto\"/></w:pBdr>",
            );
        }
        match props.before {
            Some(before) => {
                let _ = write!(
                    self.xml,
                    "<w:spacing w:before=\"{before}\" w:after=\"{}\"/>",
                    props.after
                );
            }
            None => {
                let _ = write!(self.xml, "<w:spacing w:after=\"{}\"/>", props.after);
            }
        }
        if let Some(jc) = props.justification {
            let _ = write!(self.xml, "<w:jc w:val=\"{}\"/>", jc.as_str());
        }
        self.xml.push_str("</w:pPr>");
    }

    fn close_paragraph(&mut self) {
        self.xml.push_str("</w:p>");
    }

    fn runs(&mut self, runs: &[InlineRun]) {
        if runs.is_empty() {
            self.text_run("", false, BODY_HALF_POINTS);
            return;
        }
        for run in runs {
            match run.hyperlink.as_deref() {
                Some(url) => self.hyperlink(&run.text, url),
                None => self.text_run(&run.text, run.emphasis, BODY_HALF_POINTS),
            }
        }
    }

    fn text_run(&mut self, text: &str, bold: bool, half_points: u32) {
        let _ = write!(
            self.xml,
            "<w:r><w:rPr>{fonts}{bold}<w:sz w:val=\"{half_points}\"/></w:rPr>{text}</w:r>",
            fonts = run_fonts(),
            bold = if bold { "<w:b/>" } else { "" },
            text = text_element(text),
        );
    }

    fn hyperlink(&mut self, text: &str, url: &str) {
        self.hyperlinks.push(url.to_string());
        let id = self.hyperlinks.len() + 2;
        let _ = write!(
            self.xml,
            concat!(
                "<w:hyperlink r:id=\"rId{id}\" w:history=\"1\"><w:r><w:rPr>",
                "<w:rStyle w:val=\"Hyperlink\"/>{fonts}<w:color w:val=\"{color}\"/>",
                "<w:sz w:val=\"{size}\"/><w:u w:val=\"single\"/></w:rPr>{text}</w:r></w:hyperlink>"
            ),
            id = id,
            fonts = run_fonts(),
            color = LINK_COLOR,
            size = BODY_HALF_POINTS,
            text = text_element(text),
        );
    }
}

fn run_fonts() -> String {
    format!("<w:rFonts w:ascii=\"{FONT}\" w:hAnsi=\"{FONT}\" w:cs=\"{FONT}\"/>")
}

fn text_element(text: &str) -> String {
    format!("<w:t xml:space=\"preserve\">{}</w:t>", xml_escape(text))
}

/// Escape markup characters and drop code points XML 1.0 cannot carry.
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

// ── Package parts ────────────────────────────────────────────────────────────

fn content_types_xml() -> String {
    format!(
        concat!(
            "{decl}\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
            "<Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>",
            "<Override PartName=\"/word/numbering.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml\"/>",
            "<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>",
            "</Types>"
        ),
        decl = XML_DECL
    )
}

fn package_rels_xml() -> String {
    format!(
        concat!(
            "{decl}\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{base}/officeDocument\" Target=\"word/document.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        base = REL_BASE
    )
}

fn document_rels_xml(hyperlinks: &[String]) -> String {
    let mut xml = format!(
        concat!(
            "{decl}\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{base}/styles\" Target=\"styles.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"{base}/numbering\" Target=\"numbering.xml\"/>"
        ),
        decl = XML_DECL,
        base = REL_BASE
    );
    for (i, url) in hyperlinks.iter().enumerate() {
        let _ = write!(
            xml,
            "<Relationship Id=\"rId{}\" Type=\"{REL_BASE}/hyperlink\" Target=\"{}\" TargetMode=\"External\"/>",
            i + 3,
            xml_escape(url)
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn styles_xml() -> String {
    format!(
        concat!(
            "{decl}\n<w:styles xmlns:w=\"{w}\">",
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            "<w:rFonts w:ascii=\"{font}\" w:eastAsia=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>",
            "<w:sz w:val=\"{size}\"/><w:szCs w:val=\"{size}\"/><w:lang w:val=\"en-US\"/>",
            "</w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>",
            "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">",
            "<w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
            "<w:style w:type=\"character\" w:default=\"1\" w:styleId=\"DefaultParagraphFont\">",
            "<w:name w:val=\"Default Paragraph Font\"/><w:uiPriority w:val=\"1\"/>",
            "<w:semiHidden/><w:unhideWhenUsed/></w:style>",
            "<w:style w:type=\"character\" w:styleId=\"Hyperlink\">",
            "<w:name w:val=\"Hyperlink\"/><w:basedOn w:val=\"DefaultParagraphFont\"/>",
            "<w:uiPriority w:val=\"99\"/><w:unhideWhenUsed/>",
            "<w:rPr><w:color w:val=\"{link}\"/><w:u w:val=\"single\"/></w:rPr></w:style>",
            "</w:styles>"
        ),
        decl = XML_DECL,
        w = NS_W,
        font = FONT,
        size = BODY_HALF_POINTS,
        link = LINK_COLOR
    )
}

fn numbering_xml() -> String {
    format!(
        concat!(
            "{decl}\n<w:numbering xmlns:w=\"{w}\">",
            "<w:abstractNum w:abstractNumId=\"0\"><w:multiLevelType w:val=\"singleLevel\"/>",
            "<w:lvl w:ilvl=\"0\"><w:start w:val=\"1\"/><w:numFmt w:val=\"bullet\"/>",
            "<w:lvlText w:val=\"\u{2022}\"/><w:lvlJc w:val=\"left\"/>",
            "<w:pPr><w:ind w:left=\"720\" w:hanging=\"360\"/></w:pPr>",
            "<w:rPr><w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\"/></w:rPr></w:lvl>",
            "</w:abstractNum>",
            "<w:num w:numId=\"{num}\"><w:abstractNumId w:val=\"0\"/></w:num>",
            "</w:numbering>"
        ),
        decl = XML_DECL,
        w = NS_W,
        font = FONT,
        num = BULLET_NUM_ID
    )
}

fn core_xml(title: &str) -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}\n<cp:coreProperties ",
            "xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" ",
            "xmlns:dc=\"http://purl.org/dc/elements/1.1/\" ",
            "xmlns:dcterms=\"http://purl.org/dc/terms/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:title>{title}</dc:title><dc:creator>applicraft</dc:creator>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{created}</dcterms:created>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = xml_escape(title),
        created = created
    )
}
