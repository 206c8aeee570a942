//! Markup tokenizer: lightly marked-up model output → [`Document`].
//!
//! Line vocabulary:
//!
//! | Line shape | Block |
//! |------------|-------|
//! | `---` | [`Block::Separator`] |
//! | `* item` / `- item` | [`Block::Bullet`] |
//! | `**SECTION NAME**` | [`Block::Header`] |
//! | empty | [`Block::BlankLine`] |
//! | anything else | [`Block::Paragraph`] |
//!
//! Inside bullets and paragraphs, `**` toggles bold and URLs become link runs.
//! Tokenizing never fails: an unmatched `**` simply leaves the rest of the
//! line bold.

use crate::document::{Block, Document, InlineRun};
use once_cell::sync::Lazy;
use regex::Regex;

const SEPARATOR: &str = "---";
const BOLD_DELIMITER: &str = "**";

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\*|-)\s+(.*)$").unwrap());

static RE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\*(.+?)\*\*$").unwrap());

static RE_UPPERCASE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z\s]+$").unwrap());

// scheme://host.tld[/path]; the trailing \b keeps sentence punctuation out of the link.
static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:https?|ftp)://[-A-Za-z0-9_@:%.+~#=]{1,256}\.[A-Za-z0-9()]{1,6}\b[-A-Za-z0-9_()@:%+.~#?&/=]*\b",
    )
    .unwrap()
});

/// Split raw text into lines and classify each one.
///
/// Produces exactly one block per input line, in input order.
pub fn tokenize(raw: &str) -> Document {
    Document::new(raw.split('\n').map(classify_line).collect())
}

/// Classify a single line.
pub fn classify_line(line: &str) -> Block {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let trimmed = line.trim();

    if trimmed == SEPARATOR {
        return Block::Separator;
    }

    if let Some(caps) = RE_BULLET.captures(line) {
        return Block::Bullet {
            level: 0,
            runs: parse_inline(&caps[1]),
        };
    }

    if let Some(label) = header_label(trimmed) {
        return Block::Header { label };
    }

    if trimmed.is_empty() {
        return Block::BlankLine;
    }

    Block::Paragraph {
        runs: parse_inline(line),
    }
}

fn header_label(trimmed: &str) -> Option<String> {
    let caps = RE_HEADER.captures(trimmed)?;
    let inner = &caps[1];
    RE_UPPERCASE_LABEL
        .is_match(inner)
        .then(|| inner.trim().to_string())
}

/// Parse inline content into runs with bold state and links resolved.
///
/// The first `**`-delimited segment is regular weight and every delimiter
/// flips the state. Within a segment, URLs are cut out as link runs and the
/// text around them keeps the segment's weight. Empty pieces produce no run.
pub fn parse_inline(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut bold = false;

    for segment in text.split(BOLD_DELIMITER) {
        let mut rest = segment;
        while let Some(m) = RE_URL.find(rest) {
            push_text(&mut runs, &rest[..m.start()], bold);
            runs.push(InlineRun::link(m.as_str()));
            rest = &rest[m.end()..];
        }
        push_text(&mut runs, rest, bold);
        bold = !bold;
    }

    runs
}

fn push_text(runs: &mut Vec<InlineRun>, text: &str, bold: bool) {
    if !text.is_empty() {
        runs.push(InlineRun::styled(text, bold));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs_of(block: &Block) -> &[InlineRun] {
        block.runs()
    }

    #[test]
    fn bold_parity() {
        let runs = parse_inline("a **b** c");
        assert_eq!(
            runs,
            vec![
                InlineRun::plain("a "),
                InlineRun::bold("b"),
                InlineRun::plain(" c"),
            ]
        );
    }

    #[test]
    fn unmatched_bold_runs_to_end_of_line() {
        let runs = parse_inline("plain **bold to the end");
        assert_eq!(
            runs,
            vec![InlineRun::plain("plain "), InlineRun::bold("bold to the end")]
        );
    }

    #[test]
    fn leading_bold() {
        let runs = parse_inline("**Rust** developer");
        assert_eq!(
            runs,
            vec![InlineRun::bold("Rust"), InlineRun::plain(" developer")]
        );
    }

    #[test]
    fn bold_state_does_not_leak_across_lines() {
        let doc = tokenize("start **open\nnext line");
        assert_eq!(
            runs_of(&doc.blocks()[1]),
            &[InlineRun::plain("next line")]
        );
    }

    #[test]
    fn url_extraction_preserves_every_character() {
        let input = "See https://example.com/x for more";
        let runs = parse_inline(input);
        assert_eq!(
            runs,
            vec![
                InlineRun::plain("See "),
                InlineRun::link("https://example.com/x"),
                InlineRun::plain(" for more"),
            ]
        );
        let joined: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn url_excludes_trailing_punctuation() {
        let runs = parse_inline("Profile: https://linkedin.com/in/jane.");
        assert_eq!(runs[1], InlineRun::link("https://linkedin.com/in/jane"));
        assert_eq!(runs[2], InlineRun::plain("."));
    }

    #[test]
    fn url_inside_bold_segment_is_a_plain_link() {
        let runs = parse_inline("**Portfolio https://jane.dev/work here**");
        assert_eq!(
            runs,
            vec![
                InlineRun::bold("Portfolio "),
                InlineRun::link("https://jane.dev/work"),
                InlineRun::bold(" here"),
            ]
        );
        assert!(!runs[1].emphasis);
    }

    #[test]
    fn two_urls_in_one_line() {
        let runs = parse_inline("https://a.example.com and ftp://files.example.org/x");
        assert_eq!(runs.len(), 3);
        assert!(runs[0].is_link());
        assert!(!runs[1].is_link());
        assert_eq!(runs[2].hyperlink.as_deref(), Some("ftp://files.example.org/x"));
    }

    #[test]
    fn header_detection() {
        assert_eq!(
            classify_line("**EXPERIENCE**"),
            Block::Header {
                label: "EXPERIENCE".into()
            }
        );
        assert_eq!(
            classify_line("**PERSONAL PROFILE**"),
            Block::Header {
                label: "PERSONAL PROFILE".into()
            }
        );
    }

    #[test]
    fn mixed_case_header_falls_through_to_paragraph() {
        assert_eq!(
            classify_line("**Experience**"),
            Block::Paragraph {
                runs: vec![InlineRun::bold("Experience")]
            }
        );
    }

    #[test]
    fn header_with_punctuation_is_bold_paragraph() {
        let block = classify_line("**SKILLS & TOOLS**");
        assert!(matches!(block, Block::Paragraph { .. }));
        assert_eq!(block.runs()[0], InlineRun::bold("SKILLS & TOOLS"));
    }

    #[test]
    fn separator_detection_ignores_surrounding_whitespace() {
        assert_eq!(classify_line("---"), Block::Separator);
        assert_eq!(classify_line("  ---  "), Block::Separator);
        assert_eq!(classify_line("---\r"), Block::Separator);
    }

    #[test]
    fn bullets_with_both_markers() {
        assert_eq!(
            classify_line("* Led **React** migration"),
            Block::Bullet {
                level: 0,
                runs: vec![
                    InlineRun::plain("Led "),
                    InlineRun::bold("React"),
                    InlineRun::plain(" migration"),
                ]
            }
        );
        assert_eq!(
            classify_line("- Shipped v2"),
            Block::Bullet {
                level: 0,
                runs: vec![InlineRun::plain("Shipped v2")]
            }
        );
    }

    #[test]
    fn empty_bullet_is_not_dropped() {
        assert_eq!(
            classify_line("* "),
            Block::Bullet {
                level: 0,
                runs: vec![]
            }
        );
    }

    #[test]
    fn dash_without_space_is_not_a_bullet() {
        assert!(matches!(classify_line("-5% churn"), Block::Paragraph { .. }));
    }

    #[test]
    fn blank_and_whitespace_lines() {
        assert_eq!(classify_line(""), Block::BlankLine);
        assert_eq!(classify_line("   "), Block::BlankLine);
    }

    #[test]
    fn one_block_per_line_in_order() {
        let doc = tokenize("**SKILLS**\n* Rust\n\nText\n---\n**EDUCATION**");
        let kinds: Vec<&str> = doc
            .iter()
            .map(|b| match b {
                Block::Header { .. } => "header",
                Block::Separator => "separator",
                Block::Bullet { .. } => "bullet",
                Block::Paragraph { .. } => "paragraph",
                Block::BlankLine => "blank",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["header", "bullet", "blank", "paragraph", "separator", "header"]
        );
    }

    #[test]
    fn separator_count_and_order_preserved() {
        let input = "intro\n---\n**A**\n---\ntext\n---";
        let doc = tokenize(input);
        assert_eq!(doc.separator_count(), 3);
        let positions: Vec<usize> = doc
            .iter()
            .enumerate()
            .filter(|(_, b)| matches!(b, Block::Separator))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions, vec![1, 3, 5]);
    }

    #[test]
    fn idempotent() {
        let input = "**PROFILE**\nBuilt **fast** tools, see https://x.dev/a\n* item\n---\n\nEnd";
        assert_eq!(tokenize(input), tokenize(input));
    }

    #[test]
    fn lone_delimiters_yield_empty_paragraph() {
        assert_eq!(classify_line("**"), Block::Paragraph { runs: vec![] });
    }
}
