//! Intermediate document model shared by every renderer.
//!
//! A [`Document`] is a flat, ordered list of [`Block`]s, one per line of the
//! generated text. Line order is the only structural signal: there is no tree
//! beyond a bullet's `level`. Documents are built fresh for each render call
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// The smallest styled unit of text inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    /// Text content. Never contains a `**` bold toggle.
    pub text: String,

    /// Bold or not. Always `false` for hyperlink runs.
    pub emphasis: bool,

    /// Target URL when this run is a link.
    pub hyperlink: Option<String>,
}

impl InlineRun {
    /// A run of regular-weight text.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
            hyperlink: None,
        }
    }

    /// A run of bold text.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
            hyperlink: None,
        }
    }

    /// A hyperlink whose visible text is the URL itself.
    pub fn link(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            text: url.clone(),
            emphasis: false,
            hyperlink: Some(url),
        }
    }

    /// A plain or bold run depending on `emphasis`.
    pub fn styled(text: impl Into<String>, emphasis: bool) -> Self {
        Self {
            text: text.into(),
            emphasis,
            hyperlink: None,
        }
    }

    /// Whether this run renders in link style.
    pub fn is_link(&self) -> bool {
        self.hyperlink.is_some()
    }

    /// Whether the run renders bold. Links never do.
    pub fn is_bold(&self) -> bool {
        self.emphasis && !self.is_link()
    }
}

/// One structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Section title, e.g. `EXPERIENCE`.
    Header { label: String },

    /// Visual section divider.
    Separator,

    /// A bulleted line. A bullet may legitimately have no runs.
    Bullet { level: u8, runs: Vec<InlineRun> },

    /// Body text.
    Paragraph { runs: Vec<InlineRun> },

    /// An empty input line, kept for vertical spacing.
    BlankLine,
}

impl Block {
    /// Inline runs carried by this block, empty for structural blocks.
    pub fn runs(&self) -> &[InlineRun] {
        match self {
            Block::Bullet { runs, .. } | Block::Paragraph { runs } => runs,
            Block::Header { .. } | Block::Separator | Block::BlankLine => &[],
        }
    }

    /// Concatenated run text with all styling dropped.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Header { label } => label.clone(),
            _ => self.runs().iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

/// An ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Build a document from blocks already in input order.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of separator blocks.
    pub fn separator_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Separator))
            .count()
    }

    /// All hyperlink targets in document order.
    pub fn links(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .flat_map(|b| b.runs())
            .filter_map(|r| r.hyperlink.as_deref())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_runs_are_never_bold() {
        let mut run = InlineRun::link("https://example.com");
        run.emphasis = true;
        assert!(run.is_link());
        assert!(!run.is_bold());
    }

    #[test]
    fn plain_text_flattens_runs() {
        let block = Block::Paragraph {
            runs: vec![
                InlineRun::plain("Visit "),
                InlineRun::link("https://example.com"),
                InlineRun::bold(" now"),
            ],
        };
        assert_eq!(block.plain_text(), "Visit https://example.com now");
    }

    #[test]
    fn structural_blocks_have_no_runs() {
        assert!(Block::Separator.runs().is_empty());
        assert!(Block::BlankLine.runs().is_empty());
        assert_eq!(
            Block::Header {
                label: "SKILLS".into()
            }
            .plain_text(),
            "SKILLS"
        );
    }

    #[test]
    fn serialises_with_kind_tag() {
        let json = serde_json::to_string(&Block::Separator).unwrap();
        assert_eq!(json, r#"{"kind":"separator"}"#);
    }

    #[test]
    fn links_in_document_order() {
        let doc = Document::new(vec![
            Block::Paragraph {
                runs: vec![InlineRun::link("https://a.example.com")],
            },
            Block::Separator,
            Block::Bullet {
                level: 0,
                runs: vec![InlineRun::link("https://b.example.com")],
            },
        ]);
        assert_eq!(
            doc.links(),
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert_eq!(doc.separator_count(), 1);
    }
}
