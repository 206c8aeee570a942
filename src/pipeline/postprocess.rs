//! Post-processing: deterministic cleanup of generated text.
//!
//! Even well-prompted models occasionally wrap their answer in a
//! ```` ```markdown ```` fence, emit `\r\n` line endings or sprinkle
//! zero-width characters into names. These rules fix such quirks before the
//! text reaches the tokenizer, without touching content.
//!
//! The resume and cover-letter prompts also ask the model to start its answer
//! with `APPLICANT_NAME:` / `COMPANY_NAME:` lines. [`extract_prefix`] pulls
//! those values out and removes the lines from the body.
//!
//! ## Rule Order
//!
//! Fences are stripped before line endings are normalised so the fence regex
//! sees the raw text, and invisible characters are removed last so trimming
//! cannot leave a stray zero-width space at the end of a line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Value the prompts ask the model to use when a name is unknown.
const NOT_AVAILABLE: &str = "N/A";

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip outer markdown fences
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line, except after a bare bullet marker
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 5. Trim leading blank space and trailing blank lines of the whole text
pub fn clean_generated_text(input: &str) -> String {
    let s = strip_markdown_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = remove_invisible_chars(&s);
    s.trim_start().trim_end_matches('\n').to_string()
}

// ── Rule 1: Strip outer markdown fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md|text)?\r?\n(.*)\r?\n```\s*$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

/// A bullet marker with nothing after it. Trimming would turn it into a
/// literal `*` paragraph, so it keeps a single space.
static RE_EMPTY_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*-][ \t]+$").unwrap());

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| {
            if RE_EMPTY_BULLET.is_match(line) {
                format!("{} ", &line[..1])
            } else {
                line.trim_end().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Remove invisible Unicode ─────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| {
            !matches!(
                c,
                '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
            )
        })
        .collect()
}

// ── Prefix extraction ────────────────────────────────────────────────────────

/// A metadata value pulled from the first line of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixValue {
    /// `None` when the line was absent or said `N/A`.
    pub value: Option<String>,
    /// The text with the prefix line removed.
    pub cleaned_text: String,
}

/// The metadata lines the prompts ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `APPLICANT_NAME:`
    ApplicantName,
    /// `COMPANY_NAME:`
    CompanyName,
}

static RE_APPLICANT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^APPLICANT_NAME:[ \t]*([^\n]+)\n").unwrap());
static RE_COMPANY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^COMPANY_NAME:[ \t]*([^\n]+)\n").unwrap());

/// Extract a `PREFIX: value` line from the very start of `text`.
///
/// Matching is case-insensitive on the prefix. The line (including its
/// newline) is removed from the returned text only when it matched. A value
/// of `N/A` in any case is reported as `None`.
pub fn extract_prefix(text: &str, prefix: Prefix) -> PrefixValue {
    let re = match prefix {
        Prefix::ApplicantName => &*RE_APPLICANT_NAME,
        Prefix::CompanyName => &*RE_COMPANY_NAME,
    };

    match re.captures(text) {
        Some(caps) => {
            let value = caps[1].trim();
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
            PrefixValue {
                value: (!value.is_empty() && !value.eq_ignore_ascii_case(NOT_AVAILABLE))
                    .then(|| value.to_string()),
                cleaned_text: text[whole..].to_string(),
            }
        }
        None => PrefixValue {
            value: None,
            cleaned_text: text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let input = "```markdown\n**PROFILE**\nText\n```";
        assert_eq!(strip_markdown_fences(input), "**PROFILE**\nText");
    }

    #[test]
    fn test_no_fences_passthrough() {
        let input = "**PROFILE**\nText";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_separator_is_not_a_fence() {
        let input = "---\ntext\n---";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_trim_keeps_empty_bullet_marker() {
        assert_eq!(
            trim_trailing_whitespace("* \n-\t \n* Rust  \n*"),
            "* \n- \n* Rust\n*"
        );
    }

    #[test]
    fn test_clean_keeps_empty_bullet_a_bullet() {
        let cleaned = clean_generated_text("**SKILLS**\n*   \n* Rust");
        assert_eq!(cleaned, "**SKILLS**\n* \n* Rust");
        assert_eq!(clean_generated_text("* Rust\n* \n\n"), "* Rust\n* ");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "Jane\u{200B} Doe\u{FEFF}\u{00AD}";
        assert_eq!(remove_invisible_chars(input), "Jane Doe");
    }

    #[test]
    fn test_clean_keeps_blank_lines_between_paragraphs() {
        let input = "Dear Team,\r\n\r\nFirst paragraph.   \r\n\r\nSecond.\r\n";
        assert_eq!(
            clean_generated_text(input),
            "Dear Team,\n\nFirst paragraph.\n\nSecond."
        );
    }

    #[test]
    fn test_extract_prefix_value_and_body() {
        let text = "COMPANY_NAME: Acme Corp\nDear Hiring Team,";
        let parsed = extract_prefix(text, Prefix::CompanyName);
        assert_eq!(parsed.value.as_deref(), Some("Acme Corp"));
        assert_eq!(parsed.cleaned_text, "Dear Hiring Team,");
    }

    #[test]
    fn test_extract_prefix_is_case_insensitive() {
        let parsed = extract_prefix("company_name:   Initech  \nBody", Prefix::CompanyName);
        assert_eq!(parsed.value.as_deref(), Some("Initech"));
        assert_eq!(parsed.cleaned_text, "Body");
    }

    #[test]
    fn test_extract_prefix_not_available() {
        let parsed = extract_prefix("APPLICANT_NAME: n/a\nBody", Prefix::ApplicantName);
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.cleaned_text, "Body");
    }

    #[test]
    fn test_extract_prefix_absent() {
        let text = "Dear Hiring Team,\nCOMPANY_NAME: Late";
        let parsed = extract_prefix(text, Prefix::CompanyName);
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.cleaned_text, text);
    }

    #[test]
    fn test_extract_chained_prefixes() {
        let text = "APPLICANT_NAME: Jane Doe\nCOMPANY_NAME: Acme\n**PROFILE**";
        let applicant = extract_prefix(text, Prefix::ApplicantName);
        let company = extract_prefix(&applicant.cleaned_text, Prefix::CompanyName);
        assert_eq!(applicant.value.as_deref(), Some("Jane Doe"));
        assert_eq!(company.value.as_deref(), Some("Acme"));
        assert_eq!(company.cleaned_text, "**PROFILE**");
    }
}
