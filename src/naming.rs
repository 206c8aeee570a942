//! Output file names derived from the applicant and company names.
//!
//! ```text
//! company known      → {Company}_{Applicant|Applicant}_{Label}.{ext}
//! applicant only     → {Applicant}_{Label}.{ext}
//! neither            → {GenericStem}.{ext}
//! ```

use crate::output::{MaterialKind, OutputFormat};
use once_cell::sync::Lazy;
use regex::Regex;

/// Stand-in used when only the company is known.
const PLACEHOLDER_APPLICANT: &str = "Applicant";

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// Make a name safe for use in a file name.
///
/// Whitespace runs become `_`, then everything outside `[A-Za-z0-9_.-]` is
/// dropped. Returns `None` when nothing is left.
pub fn sanitize_for_filename(name: &str) -> Option<String> {
    let underscored = RE_WHITESPACE.replace_all(name.trim(), "_");
    let safe = RE_UNSAFE.replace_all(&underscored, "");
    (!safe.is_empty()).then(|| safe.into_owned())
}

/// File name for a rendered material.
pub fn derive_file_name(
    applicant: Option<&str>,
    company: Option<&str>,
    kind: MaterialKind,
    format: OutputFormat,
) -> String {
    let applicant = applicant.and_then(sanitize_for_filename);
    let company = company.and_then(sanitize_for_filename);
    let label = kind.file_label();

    let stem = match (company, applicant) {
        (Some(company), applicant) => format!(
            "{company}_{}_{label}",
            applicant.as_deref().unwrap_or(PLACEHOLDER_APPLICANT)
        ),
        (None, Some(applicant)) if applicant != PLACEHOLDER_APPLICANT => {
            format!("{applicant}_{label}")
        }
        _ => kind.generic_file_stem().to_string(),
    };

    format!("{stem}.{}", format.extension())
}
