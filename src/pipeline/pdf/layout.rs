//! Manual page layout: [`Document`] → display list.
//!
//! There is no layout engine to delegate to, so every block is placed by
//! hand: text is wrapped against the font metrics, the cursor advances one
//! line height per wrapped line, and a page break is inserted whenever the
//! next line would cross the bottom margin.
//!
//! All block kinds go through the same two primitives:
//!
//! - `ensure_room`: the single page-break rule
//! - `place_wrapped`: wrap a string and place its lines, advancing the
//!   cursor between them
//!
//! Coordinates in the display list are top-down (y grows towards the bottom
//! of the page) and `y` is the text baseline. The writer flips them into PDF
//! user space.

use super::metrics::{encode_win_ansi, text_width, FontFace};
use crate::document::{Block, Document, InlineRun};
use crate::error::RenderError;
use crate::output::MaterialKind;
use tracing::debug;

const BULLET_GLYPH: &str = "\u{2022}";
const SEPARATOR_ROOM: f32 = 15.0;
const SEPARATOR_GAP: f32 = 5.0;
const RULE_WIDTH: f32 = 0.5;
const UNDERLINE_OFFSET: f32 = 1.5;
const WIDTH_TOLERANCE: f32 = 0.01;

/// Page geometry and type sizes for PDF output.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLayout {
    /// Page width in points (A4 by default).
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Margin on all four sides.
    pub margin: f32,
    /// Body text size in points.
    pub body_size: f32,
    /// Section header size in points.
    pub header_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Distance from the bullet glyph to the bullet text.
    pub bullet_indent: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 50.0,
            body_size: 12.0,
            header_size: 14.0,
            line_height_factor: 1.2,
            bullet_indent: 25.0,
        }
    }
}

impl PdfLayout {
    pub fn body_line_height(&self) -> f32 {
        self.body_size * self.line_height_factor
    }

    pub fn header_line_height(&self) -> f32 {
        self.header_size * self.line_height_factor
    }

    /// Width between the left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Reject geometry on which no line could be placed.
    pub fn validate(&self) -> Result<(), RenderError> {
        let values = [
            self.page_width,
            self.page_height,
            self.margin,
            self.body_size,
            self.header_size,
            self.line_height_factor,
            self.bullet_indent,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RenderError::Layout(
                "page geometry must be finite and non-negative".into(),
            ));
        }
        if self.body_size == 0.0 || self.header_size == 0.0 || self.line_height_factor == 0.0 {
            return Err(RenderError::Layout(
                "font sizes and line height must be positive".into(),
            ));
        }
        if self.usable_width() <= self.bullet_indent {
            return Err(RenderError::Layout(format!(
                "usable width {:.2}pt leaves no room after the {:.2}pt bullet indent",
                self.usable_width(),
                self.bullet_indent
            )));
        }
        let tallest = self
            .header_line_height()
            .max(self.body_line_height())
            .max(SEPARATOR_ROOM);
        if self.page_height - 2.0 * self.margin < tallest {
            return Err(RenderError::Layout(format!(
                "page height {:.2}pt cannot fit a {:.2}pt line inside the margins",
                self.page_height, tallest
            )));
        }
        Ok(())
    }
}

/// Fill or stroke colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const LINK_BLUE: Rgb = Rgb(0.0, 0.0, 1.0);
}

/// One drawing instruction on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single line of text with its baseline at `y`.
    Text {
        x: f32,
        y: f32,
        text: String,
        face: FontFace,
        size: f32,
        color: Rgb,
        /// Extra space added to every space character (justification).
        word_spacing: f32,
    },
    /// A horizontal line.
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
        color: Rgb,
    },
    /// A clickable area opening `url`. `y1` is the top edge.
    Link {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        url: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaidOutPage {
    pub ops: Vec<DrawOp>,
}

/// The display list of a whole document. Always has at least one page.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub pages: Vec<LaidOutPage>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every op in page order.
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.pages.iter().flat_map(|p| p.ops.iter())
    }
}

/// Lay out `doc` for the given material kind.
pub fn lay_out(
    doc: &Document,
    kind: MaterialKind,
    layout: &PdfLayout,
) -> Result<LaidOutDocument, RenderError> {
    layout.validate()?;

    let mut engine = LayoutEngine::new(layout, kind);
    for block in doc {
        engine.block(block);
    }

    let laid_out = engine.finish();
    debug!(
        "Laid out {} blocks on {} page(s)",
        doc.len(),
        laid_out.page_count()
    );
    Ok(laid_out)
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    face: FontFace,
    size: f32,
    color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Justify,
}

struct Cursor {
    x: f32,
    y: f32,
}

struct LayoutEngine<'a> {
    layout: &'a PdfLayout,
    kind: MaterialKind,
    pages: Vec<LaidOutPage>,
    cursor: Cursor,
}

impl<'a> LayoutEngine<'a> {
    fn new(layout: &'a PdfLayout, kind: MaterialKind) -> Self {
        Self {
            layout,
            kind,
            pages: vec![LaidOutPage::default()],
            cursor: Cursor {
                x: layout.margin,
                y: layout.margin,
            },
        }
    }

    fn finish(self) -> LaidOutDocument {
        LaidOutDocument { pages: self.pages }
    }

    fn body_style(&self, bold: bool, color: Rgb) -> TextStyle {
        TextStyle {
            face: FontFace::for_emphasis(bold),
            size: self.layout.body_size,
            color,
        }
    }

    fn right_edge(&self) -> f32 {
        self.layout.page_width - self.layout.margin
    }

    fn block(&mut self, block: &Block) {
        let margin = self.layout.margin;
        let line_height = self.layout.body_line_height();

        match block {
            Block::Header { label } => {
                let style = TextStyle {
                    face: FontFace::Bold,
                    size: self.layout.header_size,
                    color: Rgb::BLACK,
                };
                let header_height = self.layout.header_line_height();
                self.start_line(margin, header_height);
                self.place_wrapped(label, style, margin, header_height, Align::Left, None);
                self.cursor.y += header_height;
            }
            Block::Separator => {
                self.ensure_room(SEPARATOR_ROOM);
                self.cursor.y += SEPARATOR_GAP;
                let y = self.cursor.y;
                let x2 = self.right_edge();
                self.push(DrawOp::Rule {
                    x1: margin,
                    x2,
                    y,
                    width: RULE_WIDTH,
                    color: Rgb::BLACK,
                });
                self.cursor.y += SEPARATOR_GAP + line_height;
            }
            Block::Bullet { runs, .. } => {
                self.start_line(margin, line_height);
                let style = self.body_style(false, Rgb::BLACK);
                self.draw_text(margin, BULLET_GLYPH, style, 0.0);
                let text_start = margin + self.layout.bullet_indent;
                self.cursor.x = text_start;
                self.flow_runs(runs, text_start);
                self.cursor.y += line_height;
            }
            Block::Paragraph { runs } => {
                self.start_line(margin, line_height);
                if self.kind.justifies_body() {
                    // Styling is flattened so the line can be justified as one string.
                    let text = block.plain_text();
                    let style = self.body_style(false, Rgb::BLACK);
                    self.place_wrapped(
                        text.trim_end(),
                        style,
                        margin,
                        line_height,
                        Align::Justify,
                        None,
                    );
                } else {
                    self.flow_runs(runs, margin);
                }
                self.cursor.y += line_height;
            }
            Block::BlankLine => {
                self.ensure_room(line_height);
                self.cursor.y += line_height;
            }
        }
    }

    /// Start a new page if content of height `needed` would cross the bottom margin.
    fn ensure_room(&mut self, needed: f32) {
        if self.cursor.y + needed > self.layout.page_height - self.layout.margin {
            self.pages.push(LaidOutPage::default());
            self.cursor.y = self.layout.margin;
            debug!("Page break, now on page {}", self.pages.len());
        }
    }

    fn start_line(&mut self, x: f32, line_height: f32) {
        self.cursor.x = x;
        self.ensure_room(line_height);
    }

    /// Place runs left to right from the cursor; wrapped lines restart at `line_start`.
    fn flow_runs(&mut self, runs: &[InlineRun], line_start: f32) {
        let line_height = self.layout.body_line_height();
        for run in runs {
            let color = if run.is_link() {
                Rgb::LINK_BLUE
            } else {
                Rgb::BLACK
            };
            let style = self.body_style(run.is_bold(), color);
            self.place_wrapped(
                &run.text,
                style,
                line_start,
                line_height,
                Align::Left,
                run.hyperlink.as_deref(),
            );
        }
    }

    /// Wrap `text` from the cursor and place each line.
    ///
    /// The first line gets whatever width is left on the current line;
    /// continuation lines start at `line_start`. The cursor moves down
    /// between lines but not after the last one, and ends just past the
    /// last line's text.
    fn place_wrapped(
        &mut self,
        text: &str,
        style: TextStyle,
        line_start: f32,
        line_height: f32,
        align: Align,
        link: Option<&str>,
    ) {
        let right = self.right_edge();
        let lines = wrap_lines(
            text,
            style.face,
            style.size,
            right - self.cursor.x,
            right - line_start,
        );
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.cursor.y += line_height;
                self.cursor.x = line_start;
            }
            self.ensure_room(line_height);

            let width = text_width(line, style.face, style.size);
            if !line.is_empty() {
                let word_spacing = if align == Align::Justify && i < last {
                    justify_spacing(line, width, right - self.cursor.x)
                } else {
                    0.0
                };
                let x = self.cursor.x;
                self.draw_text(x, line, style, word_spacing);
                if let Some(url) = link {
                    self.draw_link(x, width, style, url);
                }
            }
            self.cursor.x += width;
        }
    }

    fn draw_text(&mut self, x: f32, text: &str, style: TextStyle, word_spacing: f32) {
        let y = self.cursor.y;
        self.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            face: style.face,
            size: style.size,
            color: style.color,
            word_spacing,
        });
    }

    fn draw_link(&mut self, x: f32, width: f32, style: TextStyle, url: &str) {
        let y = self.cursor.y;
        self.push(DrawOp::Rule {
            x1: x,
            x2: x + width,
            y: y + UNDERLINE_OFFSET,
            width: RULE_WIDTH,
            color: Rgb::LINK_BLUE,
        });
        self.push(DrawOp::Link {
            x1: x,
            y1: y - style.size * 0.8,
            x2: x + width,
            y2: y + 2.0,
            url: url.to_string(),
        });
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

/// Extra space per space character that stretches `line` to `available`.
///
/// `Tw` applies to every encoded 0x20, so tabs count as gaps too.
fn justify_spacing(line: &str, natural_width: f32, available: f32) -> f32 {
    let gaps = encode_win_ansi(line).iter().filter(|&&b| b == b' ').count();
    if gaps == 0 {
        return 0.0;
    }
    ((available - natural_width) / gaps as f32).max(0.0)
}

/// Greedy word wrap against font metrics.
///
/// The first line may be narrower than the rest (a run that starts mid-line).
/// If not even the first word fits there, the first line is returned empty,
/// meaning "continue on the next line". Words wider than a whole line are
/// split between characters. Spaces at a break are dropped; the final line
/// keeps its trailing spaces so a following run starts after them.
pub fn wrap_lines(
    text: &str,
    face: FontFace,
    size: f32,
    first_width: f32,
    rest_width: f32,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for token in text.split_inclusive(' ') {
        let mut piece = token;
        loop {
            let limit = if lines.is_empty() {
                first_width
            } else {
                rest_width
            };
            let candidate = format!("{line}{piece}");
            if text_width(candidate.trim_end(), face, size) <= limit + WIDTH_TOLERANCE {
                line = candidate;
                break;
            }

            if !line.trim().is_empty() {
                lines.push(line.trim_end().to_string());
            } else if lines.is_empty() && first_width < rest_width {
                lines.push(String::new());
            } else {
                let (head, tail) = split_at_width(piece.trim_start(), face, size, limit);
                lines.push(head.trim_end().to_string());
                line.clear();
                piece = tail;
                if piece.is_empty() {
                    break;
                }
                continue;
            }

            line.clear();
            piece = piece.trim_start();
            if piece.is_empty() {
                break;
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Longest prefix of `word` that fits in `limit`, never less than one char.
fn split_at_width(word: &str, face: FontFace, size: f32, limit: f32) -> (&str, &str) {
    let mut end = 0;
    for (idx, c) in word.char_indices() {
        let next = idx + c.len_utf8();
        if end > 0 && text_width(&word[..next], face, size) > limit + WIDTH_TOLERANCE {
            break;
        }
        end = next;
    }
    word.split_at(end)
}
