//! CLI binary for applicraft.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig` / `ExportConfig` and prints results.

use anyhow::{bail, Context, Result};
use applicraft::activity::{ActivityLog, JsonFileStore, Level};
use applicraft::{
    export_materials, load_resume, render_material, save_document, ApplicationInput,
    ExportConfig, GeminiClient, GeneratedMaterials, GenerationConfig, MaterialKind,
    MaterialsSession, OutputFormat, PlainTextParser,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Cover letter + resume as PDF in ./out
  applicraft generate --resume cv.txt --job job.txt -o out

  # Also answer application questions, Word output
  applicraft generate --resume cv.txt --job job.txt \
      -Q "Why do you want to work here?" -Q "Describe a hard project." --format docx

  # Skip web search grounding
  applicraft generate --resume cv.txt --job job.txt --no-grounding

  # Render existing marked-up text (no API key needed)
  applicraft render resume.txt --kind resume --format pdf --applicant "Jane Doe" --company Acme

  # Show the persisted activity log
  applicraft --log-file activity.json logs

MARKUP (one construct per line):
  **SECTION**       all-caps header between double asterisks
  ---               horizontal separator
  * item / - item   bullet
  **bold**          bold span inside any line
  https://...       link

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key
  APPLICRAFT_MODEL        Override model ID
  APPLICRAFT_ENDPOINT     Override API base URL
  APPLICRAFT_LOG_FILE     Persist the activity log to this JSON file
  RUST_LOG                tracing filter (overrides -v / -q)
"#;

/// Generate tailored application materials with Gemini and render them to DOCX or PDF.
#[derive(Parser, Debug)]
#[command(
    name = "applicraft",
    version,
    about = "Generate tailored cover letters, resumes and application answers",
    long_about = "Generate a cover letter, an improved resume and answers to application \
questions from a resume and a job description using Google Gemini, then render them \
to Word (DOCX) or PDF documents.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Persist the activity log to this JSON file.
    #[arg(long, global = true, env = "APPLICRAFT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "APPLICRAFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "APPLICRAFT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate materials from a resume and a job description.
    Generate(GenerateArgs),
    /// Render a marked-up text file to DOCX or PDF.
    Render(RenderArgs),
    /// Print or clear the persisted activity log.
    Logs(LogsArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Resume as a UTF-8 .txt file.
    #[arg(long)]
    resume: PathBuf,

    /// File containing the job description.
    #[arg(long = "job")]
    job_description: PathBuf,

    /// Application question (repeatable).
    #[arg(short = 'Q', long = "question")]
    questions: Vec<String>,

    /// File with one application question per line.
    #[arg(long)]
    questions_file: Option<PathBuf>,

    /// Output directory.
    #[arg(short, long, env = "APPLICRAFT_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Document format.
    #[arg(long, value_enum, default_value = "pdf")]
    format: FormatArg,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model ID.
    #[arg(long, env = "APPLICRAFT_MODEL")]
    model: Option<String>,

    /// API base URL.
    #[arg(long, env = "APPLICRAFT_ENDPOINT")]
    endpoint: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "APPLICRAFT_TEMPERATURE", default_value_t = 0.6)]
    temperature: f32,

    /// Nucleus sampling cut-off (0.0–1.0).
    #[arg(long, default_value_t = 0.9)]
    top_p: f32,

    /// Top-k sampling cut-off.
    #[arg(long, default_value_t = 40)]
    top_k: u32,

    /// Do not let the model search the web for company context.
    #[arg(long)]
    no_grounding: bool,

    /// Per-call API timeout in seconds.
    #[arg(long, env = "APPLICRAFT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Date written on the cover letter (YYYY-MM-DD). Default: today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Print the generated materials as JSON instead of writing documents.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "APPLICRAFT_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Text file in the markup dialect.
    input: PathBuf,

    /// Which material the text is.
    #[arg(long, value_enum)]
    kind: KindArg,

    /// Document format.
    #[arg(long, value_enum, default_value = "pdf")]
    format: FormatArg,

    /// Applicant name used in the file name.
    #[arg(long)]
    applicant: Option<String>,

    /// Company name used in the file name.
    #[arg(long)]
    company: Option<String>,

    /// Output directory.
    #[arg(short, long, env = "APPLICRAFT_OUTPUT", default_value = ".")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct LogsArgs {
    /// Remove every stored entry.
    #[arg(long)]
    clear: bool,

    /// Print entries as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Docx,
    Pdf,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [OutputFormat] {
        match self {
            FormatArg::Docx => &[OutputFormat::Docx],
            FormatArg::Pdf => &[OutputFormat::Pdf],
            FormatArg::Both => &[OutputFormat::Docx, OutputFormat::Pdf],
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    CoverLetter,
    Resume,
    Answers,
}

impl From<KindArg> for MaterialKind {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::CoverLetter => MaterialKind::CoverLetter,
            KindArg::Resume => MaterialKind::Resume,
            KindArg::Answers => MaterialKind::Answers,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the feedback during generation; keep library INFO
    // logs out of its way unless asked for.
    let spinner_active = match &cli.command {
        Command::Generate(args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || spinner_active {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let activity = Arc::new(match &cli.log_file {
        Some(path) => {
            ActivityLog::with_store(JsonFileStore::new(path), ActivityLog::DEFAULT_CAPACITY)
        }
        None => ActivityLog::in_memory(),
    });

    match cli.command {
        Command::Generate(ref args) => run_generate(&cli, args, activity).await,
        Command::Render(ref args) => run_render(&cli, args, &*activity).await,
        Command::Logs(ref args) => run_logs(&cli, args, &*activity),
    }
}

async fn run_generate(cli: &Cli, args: &GenerateArgs, activity: Arc<ActivityLog>) -> Result<()> {
    // ── Gather input ─────────────────────────────────────────────────────
    let resume_text = load_resume(&PlainTextParser::new(), &args.resume, &*activity)
        .await
        .context("Failed to read resume")?;
    let job_description = tokio::fs::read_to_string(&args.job_description)
        .await
        .with_context(|| {
            format!(
                "Failed to read job description from {:?}",
                args.job_description
            )
        })?;

    let mut questions = args.questions.clone();
    if let Some(ref path) = args.questions_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read questions from {:?}", path))?;
        questions.extend(text.lines().map(str::to_string));
    }

    let mut input = ApplicationInput::new(resume_text, job_description).with_questions(questions);
    if let Some(date) = args.date {
        input = input.with_date(date);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(args)?;
    let client = GeminiClient::new(config.clone(), activity.clone())
        .context("Failed to create Gemini client")?;

    // ── Generate ─────────────────────────────────────────────────────────
    let spinner = (!cli.quiet && !args.no_progress && !args.json).then(|| {
        new_spinner(if input.has_questions() {
            "Writing cover letter, resume and answers…"
        } else {
            "Writing cover letter and resume…"
        })
    });

    let start = Instant::now();
    let mut session = MaterialsSession::new();
    let result = session
        .generate(&client, &input, &config, &*activity)
        .await;

    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }
    let materials = match result {
        Ok(materials) => materials,
        Err(e) => {
            if !cli.quiet {
                eprintln!("{} {}", red("✘"), red(&e.to_string()));
            }
            return Err(e).context("Generation failed");
        }
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(materials).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        eprintln!(
            "{} Materials generated in {:.1}s  {}",
            green("✔"),
            start.elapsed().as_secs_f64(),
            dim(&describe_names(materials)),
        );
    }

    // ── Export ───────────────────────────────────────────────────────────
    let export_config = ExportConfig::default();
    for &format in args.format.formats() {
        let paths = export_materials(
            materials,
            &MaterialKind::ALL,
            format,
            &args.output,
            &export_config,
            &*activity,
        )
        .await
        .with_context(|| format!("Failed to export {format} documents"))?;

        if !cli.quiet {
            for path in paths {
                eprintln!("  {} {}", cyan("→"), bold(&path.display().to_string()));
            }
        }
    }

    Ok(())
}

async fn run_render(cli: &Cli, args: &RenderArgs, activity: &ActivityLog) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {:?}", args.input))?;
    let export_config = ExportConfig::default();

    for &format in args.format.formats() {
        let doc = render_material(
            &text,
            args.kind.into(),
            format,
            args.applicant.as_deref(),
            args.company.as_deref(),
            &export_config.pdf_layout,
            activity,
        )
        .context("Render failed")?;
        let path = save_document(&doc, &args.output, Duration::ZERO)
            .await
            .context("Failed to save document")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}  {}",
                green("✔"),
                bold(&path.display().to_string()),
                dim(&format!("{} bytes", doc.bytes.len())),
            );
        }
    }
    Ok(())
}

fn run_logs(cli: &Cli, args: &LogsArgs, activity: &ActivityLog) -> Result<()> {
    if cli.log_file.is_none() {
        bail!("No activity log file configured; pass --log-file or set APPLICRAFT_LOG_FILE");
    }

    if args.clear {
        activity.clear();
        if !cli.quiet {
            eprintln!("{} Activity log cleared", green("✔"));
        }
        return Ok(());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&activity.entries())
            .context("Failed to serialise activity log")?;
        println!("{json}");
        return Ok(());
    }

    for event in activity.entries() {
        let line = event.format_line();
        match event.level {
            Level::Error => println!("{}", red(&line)),
            Level::Debug => println!("{}", dim(&line)),
            Level::Info => println!("{line}"),
        }
    }
    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_config(args: &GenerateArgs) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .temperature(args.temperature)
        .top_p(args.top_p)
        .top_k(args.top_k)
        .use_grounding(!args.no_grounding)
        .api_timeout_secs(args.api_timeout);

    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref endpoint) = args.endpoint {
        builder = builder.endpoint(endpoint.trim_end_matches('/'));
    }
    match args.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => builder = builder.api_key(key),
        _ => bail!("Gemini API key is not set; pass --api-key or set GEMINI_API_KEY"),
    }

    builder.build().context("Invalid configuration")
}

fn new_spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Generating");
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn describe_names(materials: &GeneratedMaterials) -> String {
    format!(
        "applicant: {}  company: {}",
        materials.applicant_name.as_deref().unwrap_or("N/A"),
        materials.company_name.as_deref().unwrap_or("N/A"),
    )
}
