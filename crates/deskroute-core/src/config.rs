//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys), then applies the legacy
//! provider variables (`OPENAI_API_KEY`, `DISABLE_LLM`, ...) once.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Domain;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub root: String,
    pub hr_dir: String,
    pub tech_dir: String,
    pub finance_dir: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            root: "./data".to_string(),
            hr_dir: "hr_docs".to_string(),
            tech_dir: "tech_docs".to_string(),
            finance_dir: "finance_docs".to_string(),
        }
    }
}

impl DataSettings {
    /// Corpus directory for `domain`, expanded and resolved against `root`.
    pub fn dir_for(&self, domain: Domain) -> PathBuf {
        let dir = match domain {
            Domain::Hr => &self.hr_dir,
            Domain::Tech => &self.tech_dir,
            Domain::Finance => &self.finance_dir,
        };
        resolve_with_base(&expand_path(&self.root), dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub min_chunks_warning: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5, min_chunks_warning: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    pub max_line_chars: usize,
    pub max_lines_per_section: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self { max_line_chars: 240, max_lines_per_section: 6 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub use_model_classifier: bool,
    /// Replaces the built-in trigger list of each listed domain.
    pub keywords: BTreeMap<Domain, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            model: "openrouter/auto".to_string(),
            temperature: 0.0,
            max_tokens: 800,
            timeout_secs: 15,
            max_retries: 2,
        }
    }
}

impl LlmSettings {
    /// True when the model collaborators can be constructed at all.
    pub fn is_available(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_BASE_URL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    pub enabled: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub parallel_domains: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { parallel_domains: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub synthesis: SynthesisSettings,
    pub routing: RoutingSettings,
    pub llm: LlmSettings,
    pub evaluation: EvaluationSettings,
    pub pipeline: PipelineSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be > 0".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be >= 1".to_string()));
        }
        if self.synthesis.max_line_chars < 16 {
            return Err(Error::InvalidConfig(format!(
                "synthesis.max_line_chars must be >= 16, got {}",
                self.synthesis.max_line_chars
            )));
        }
        Ok(())
    }

    /// Applies the provider variables the CLI has always honoured. `lookup`
    /// is `std::env::var` in production.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let openrouter_key = lookup("OPENROUTER_API_KEY").filter(|v| !v.is_empty());
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()).or_else(|| openrouter_key.clone());
        }
        if self.llm.base_url.is_none() {
            self.llm.base_url = lookup("OPENAI_BASE_URL")
                .or_else(|| lookup("OPENROUTER_BASE_URL"))
                .filter(|v| !v.is_empty())
                .or_else(|| openrouter_key.as_ref().map(|_| OPENROUTER_BASE_URL.to_string()));
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.is_empty()) {
            self.llm.model = model;
        }
        if lookup("DISABLE_LLM").as_deref() == Some("1") {
            self.llm.enabled = false;
        }
        if lookup("DISABLE_EVALUATION").as_deref() == Some("1") {
            self.evaluation.enabled = false;
        }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings with legacy env fallbacks applied and validated.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = self.settings_without_env()?;
        settings.apply_legacy_env(|k| env::var(k).ok());
        Ok(settings)
    }

    /// Typed settings from the figment layers only.
    pub fn settings_without_env(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
