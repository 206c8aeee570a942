//! Material generation: the generative-text collaborator and the joined
//! three-call cycle that produces [`GeneratedMaterials`].
//!
//! ## Flow
//!
//! ```text
//!  ApplicationInput ──► validate ──► ┌ cover letter prompt ─► generate ─┐
//!                                    ├ resume prompt ───────► generate ─┼─► try_join ─► clean + prefixes ─► GeneratedMaterials
//!                                    └ answers prompt ──────► generate ─┘   (skipped when no questions)
//! ```
//!
//! The calls run concurrently on the current task. The first failure drops
//! the other in-flight calls and the cycle fails as a whole; no partial
//! material is ever returned.

pub mod gemini;

pub use gemini::{GeminiClient, GroundingSource};

use crate::activity::{ActivitySink, Level};
use crate::config::GenerationConfig;
use crate::error::{GenerationError, MaterialsError};
use crate::output::{GeneratedMaterials, MaterialKind};
use crate::pipeline::postprocess::{clean_generated_text, extract_prefix, Prefix};
use crate::prompts::{answers_prompt, cover_letter_prompt, resume_prompt};
use chrono::NaiveDate;
use std::future::Future;
use std::time::Instant;
use tracing::info;

const MODULE: &str = "Generate";

/// Produces text for a prompt.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        use_grounding: bool,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Everything one generation cycle needs from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInput {
    pub resume_text: String,
    pub job_description: String,
    /// Blank entries are ignored.
    pub questions: Vec<String>,
    /// Date the cover letter is written for.
    pub current_date: NaiveDate,
}

impl ApplicationInput {
    /// Input dated today (local time), with no questions.
    pub fn new(resume_text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
            questions: Vec::new(),
            current_date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_questions<I, S>(mut self, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.questions = questions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.current_date = date;
        self
    }

    /// True when at least one question is non-blank.
    pub fn has_questions(&self) -> bool {
        self.questions.iter().any(|q| !q.trim().is_empty())
    }
}

/// Run one generation cycle.
///
/// # Errors
/// - [`MaterialsError::MissingResume`] / [`MaterialsError::MissingJobDescription`]
///   before any call is made.
/// - [`MaterialsError::Generation`] naming the first material whose call failed.
pub async fn generate_materials<G: TextGenerator>(
    generator: &G,
    input: &ApplicationInput,
    config: &GenerationConfig,
    activity: &dyn ActivitySink,
) -> Result<GeneratedMaterials, MaterialsError> {
    let start = Instant::now();

    // ── Step 1: Validate input ───────────────────────────────────────────
    if input.resume_text.trim().is_empty() {
        activity.record(
            Level::Error,
            MODULE,
            "generate_materials",
            "Validation failed: Resume text is missing.",
            None,
        );
        return Err(MaterialsError::MissingResume);
    }
    if input.job_description.trim().is_empty() {
        activity.record(
            Level::Error,
            MODULE,
            "generate_materials",
            "Validation failed: Job description is missing.",
            None,
        );
        return Err(MaterialsError::MissingJobDescription);
    }

    let with_answers = input.has_questions();
    activity.record(
        Level::Info,
        MODULE,
        "generate_materials",
        "Starting generation of all materials.",
        Some(serde_json::json!({
            "resumeLength": input.resume_text.len(),
            "jobDescriptionLength": input.job_description.len(),
            "questionCount": input.questions.iter().filter(|q| !q.trim().is_empty()).count(),
            "useSearchGrounding": config.use_grounding,
        })),
    );

    // ── Step 2: Issue the calls concurrently ─────────────────────────────
    let cover = async {
        let prompt = cover_letter_prompt(
            &input.resume_text,
            &input.job_description,
            input.current_date,
        );
        let raw = run_call(generator, MaterialKind::CoverLetter, &prompt, config, activity).await?;
        let company = extract_prefix(&clean_generated_text(&raw), Prefix::CompanyName);
        Ok::<_, MaterialsError>((company.cleaned_text.trim_start().to_string(), company.value))
    };

    let resume = async {
        let prompt = resume_prompt(&input.resume_text, &input.job_description);
        let raw = run_call(generator, MaterialKind::Resume, &prompt, config, activity).await?;
        let applicant = extract_prefix(&clean_generated_text(&raw), Prefix::ApplicantName);
        let company = extract_prefix(&applicant.cleaned_text, Prefix::CompanyName);
        Ok::<_, MaterialsError>((
            company.cleaned_text.trim_start().to_string(),
            applicant.value,
            company.value,
        ))
    };

    let answers = async {
        if !with_answers {
            return Ok::<_, MaterialsError>(String::new());
        }
        let prompt = answers_prompt(
            &input.resume_text,
            &input.job_description,
            &input.questions,
        );
        let raw = run_call(generator, MaterialKind::Answers, &prompt, config, activity).await?;
        Ok(clean_generated_text(&raw))
    };

    let joined = tokio::try_join!(cover, resume, answers);

    // ── Step 3: Assemble ─────────────────────────────────────────────────
    let ((cover_letter, letter_company), (resume, applicant_name, resume_company), answers) =
        match joined {
            Ok(parts) => parts,
            Err(e) => {
                activity.record(
                    Level::Error,
                    MODULE,
                    "generate_materials",
                    "Content generation failed.",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
                return Err(e);
            }
        };

    let materials = GeneratedMaterials {
        cover_letter,
        resume,
        answers,
        applicant_name,
        company_name: resume_company.or(letter_company),
    };

    info!(
        "Generated materials in {}ms (answers: {})",
        start.elapsed().as_millis(),
        with_answers
    );
    activity.record(
        Level::Info,
        MODULE,
        "generate_materials",
        "All materials generated successfully.",
        Some(serde_json::json!({
            "applicantName": materials.applicant_name.as_deref().unwrap_or("N/A"),
            "companyName": materials.company_name.as_deref().unwrap_or("N/A"),
        })),
    );

    Ok(materials)
}

async fn run_call<G: TextGenerator>(
    generator: &G,
    kind: MaterialKind,
    prompt: &str,
    config: &GenerationConfig,
    activity: &dyn ActivitySink,
) -> Result<String, MaterialsError> {
    activity.record(
        Level::Info,
        MODULE,
        "generate_materials",
        &format!("Generating {}...", kind.friendly_name()),
        None,
    );
    generator
        .generate(prompt, config.use_grounding)
        .await
        .map_err(|source| MaterialsError::Generation {
            material: kind,
            source,
        })
}

/// Holds the materials of the last successful cycle.
#[derive(Debug, Default)]
pub struct MaterialsSession {
    materials: Option<GeneratedMaterials>,
}

impl MaterialsSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn materials(&self) -> Option<&GeneratedMaterials> {
        self.materials.as_ref()
    }

    /// Run a cycle. On failure the previous materials are discarded too.
    pub async fn generate<G: TextGenerator>(
        &mut self,
        generator: &G,
        input: &ApplicationInput,
        config: &GenerationConfig,
        activity: &dyn ActivitySink,
    ) -> Result<&GeneratedMaterials, MaterialsError> {
        match generate_materials(generator, input, config, activity).await {
            Ok(materials) => Ok(self.materials.insert(materials)),
            Err(e) => {
                self.materials = None;
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.materials = None;
    }
}
