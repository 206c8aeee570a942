//! # applicraft
//!
//! Generate a tailored cover letter, an improved resume and answers to
//! application questions with Gemini, then render them to DOCX or PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! resume + job description (+ questions)
//!  │
//!  ├─ 1. Resume    read the resume file as plain text
//!  ├─ 2. Generate  three concurrent Gemini calls, joined all-or-nothing
//!  ├─ 3. Polish    strip fences and invisible characters, pull out the
//!  │               APPLICANT_NAME / COMPANY_NAME lines
//!  ├─ 4. Tokenize  lightweight markup → Document (headers, separators,
//!  │               bullets, paragraphs, bold runs, links)
//!  ├─ 5. Render    Document → DOCX (OOXML) or PDF (manual A4 layout)
//!  └─ 6. Save      derived file name, atomic write
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use applicraft::{
//!     export_materials, generate_materials, ActivityLog, ApplicationInput, ExportConfig,
//!     GeminiClient, GenerationConfig, MaterialKind, OutputFormat,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let activity = Arc::new(ActivityLog::in_memory());
//!     let config = GenerationConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     let client = GeminiClient::new(config.clone(), activity.clone())?;
//!
//!     let input = ApplicationInput::new("Jane Doe\nRust engineer...", "Acme is hiring...")
//!         .with_questions(["Why do you want to work here?"]);
//!     let materials = generate_materials(&client, &input, &config, &*activity).await?;
//!
//!     export_materials(
//!         &materials,
//!         &MaterialKind::ALL,
//!         OutputFormat::Pdf,
//!         Path::new("out"),
//!         &ExportConfig::default(),
//!         &*activity,
//!     )
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! Rendering needs no network access: feed any text in the markup dialect to
//! [`render_material`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `applicraft` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod activity;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod generate;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod resume;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use activity::{ActivityEvent, ActivityLog, ActivitySink, JsonFileStore, Level, NoopSink};
pub use config::{ExportConfig, GenerationConfig, GenerationConfigBuilder, PdfLayout};
pub use document::{Block, Document, InlineRun};
pub use error::{GenerationError, MaterialsError, ParseError, RenderError};
pub use export::{export_materials, render_material, save_document};
pub use generate::{
    generate_materials, ApplicationInput, GeminiClient, MaterialsSession, TextGenerator,
};
pub use naming::derive_file_name;
pub use output::{GeneratedMaterials, MaterialKind, OutputFormat, RenderedDocument};
pub use pipeline::tokenize::tokenize;
pub use resume::{load_resume, PlainTextParser, ResumeParser};
