//! Pipeline stages from generated text to finished documents.
//!
//! Each submodule implements one transformation step. The two renderers
//! share nothing but the [`Document`](crate::document::Document) they consume.
//!
//! ## Data Flow
//!
//! ```text
//! model text ──▶ postprocess ──▶ tokenize ──▶ docx
//!                 (cleanup)       (IDM)   └─▶ pdf
//! ```
//!
//! 1. [`postprocess`]: deterministic cleanup of model output and extraction
//!    of the `APPLICANT_NAME:` / `COMPANY_NAME:` prefix lines
//! 2. [`tokenize`]: classify each line of the light markup into a block and
//!    resolve bold spans and URLs into inline runs
//! 3. [`docx`]: map blocks onto WordprocessingML paragraphs; Word does the
//!    pagination
//! 4. [`pdf`]: wrap, justify and paginate by hand, then serialise with
//!    `pdf-writer`

pub mod docx;
pub mod pdf;
pub mod postprocess;
pub mod tokenize;
