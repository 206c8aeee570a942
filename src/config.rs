//! Configuration types for material generation and export.
//!
//! Generation behaviour is controlled through [`GenerationConfig`], built via
//! its [`GenerationConfigBuilder`]. Export behaviour lives in
//! [`ExportConfig`]; PDF page geometry in [`PdfLayout`].
//!
//! Ranges are validated once, in [`GenerationConfigBuilder::build`].

use crate::error::MaterialsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use crate::pipeline::pdf::PdfLayout;

/// Default Gemini text model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Default Generative Language API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the generative-text calls.
///
/// Built via [`GenerationConfig::builder()`] or using
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use applicraft::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gemini-2.0-flash")
///     .temperature(0.4)
///     .use_grounding(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.top_k, 40);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Range: 0.0–2.0. Default: 0.6.
    ///
    /// Letters and resumes benefit from some variety in phrasing; much above
    /// 1.0 the model starts inventing experience that is not in the resume.
    pub temperature: f32,

    /// Nucleus sampling cut-off. Range: 0.0–1.0. Default: 0.9.
    pub top_p: f32,

    /// Top-k sampling cut-off. Must be ≥ 1. Default: 40.
    pub top_k: u32,

    /// Let the model search the web for company context. Default: true.
    ///
    /// Sources found by search are logged to the activity log, never
    /// appended to the generated text.
    pub use_grounding: bool,

    /// API key. When `None` every call fails with
    /// [`GenerationError::ApiKeyMissing`](crate::error::GenerationError::ApiKeyMissing).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Per-call HTTP timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.6,
            top_p: 0.9,
            top_k: 40,
            use_grounding: true,
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("use_grounding", &self.use_grounding)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p;
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn use_grounding(mut self, v: bool) -> Self {
        self.config.use_grounding = v;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, MaterialsError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(MaterialsError::InvalidConfig("Model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(MaterialsError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if !(0.0..=1.0).contains(&c.top_p) {
            return Err(MaterialsError::InvalidConfig(format!(
                "top_p must be 0.0–1.0, got {}",
                c.top_p
            )));
        }
        if c.top_k == 0 {
            return Err(MaterialsError::InvalidConfig("top_k must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(MaterialsError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if !(c.endpoint.starts_with("https://") || c.endpoint.starts_with("http://")) {
            return Err(MaterialsError::InvalidConfig(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                c.endpoint
            )));
        }
        Ok(self.config)
    }
}

/// Settings for writing rendered documents to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Pause before each write in milliseconds. Default: 100.
    ///
    /// Exports run one after another; the pause keeps back-to-back downloads
    /// from being merged or dropped by file-system watchers.
    pub settle_delay_ms: u64,

    /// PDF page geometry.
    #[serde(skip)]
    pub pdf_layout: PdfLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 100,
            pdf_layout: PdfLayout::default(),
        }
    }
}

impl ExportConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
