/*!
 * Application configuration module.
 *
 * This module handles the application configuration including loading,
 * validating and saving configuration settings.
 */

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation service config
    pub translation: TranslationConfig,

    /// Extraction config
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Chunking config
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Pricing table, model id -> per-million-token prices
    #[serde(default = "default_pricing_table")]
    pub pricing: PricingTable,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL (optional, for self-hosted gateways)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Number of concurrent translation workers
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Retry count for transient failures, per chunk
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            worker_count: default_worker_count(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

/// PDF extraction configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Corruption score above which the primary engine's output is
    /// discarded and the fallback engine is used instead (0.0 to 1.0)
    #[serde(default = "default_corruption_threshold")]
    pub corruption_threshold: f32,

    /// Whether to extract embedded images
    #[serde(default = "default_true")]
    pub extract_images: bool,

    /// Minimum pixel dimension below which images are dropped as icons
    #[serde(default = "default_min_image_dimension")]
    pub min_image_dimension: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            corruption_threshold: default_corruption_threshold(),
            extract_images: default_true(),
            min_image_dimension: default_min_image_dimension(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Target words per translation batch
    #[serde(default = "default_word_budget")]
    pub word_budget: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            word_budget: default_word_budget(),
        }
    }
}

/// Per-model pricing in USD per million tokens
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Price per million input tokens
    pub input_per_mtok: f64,

    /// Price per million output tokens
    pub output_per_mtok: f64,
}

/// Pricing table mapping model identifiers to unit prices.
/// Loaded once from configuration and read-only afterwards.
pub type PricingTable = HashMap<String, ModelPricing>;

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_worker_count() -> usize {
    8
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.3
}

fn default_corruption_threshold() -> f32 {
    0.2
}

fn default_min_image_dimension() -> u32 {
    50
}

fn default_word_budget() -> usize {
    5000
}

fn default_true() -> bool {
    true
}

fn default_pricing_table() -> PricingTable {
    let mut table = HashMap::new();
    table.insert(
        "claude-sonnet-4-5-20250929".to_string(),
        ModelPricing {
            input_per_mtok: 3.00,
            output_per_mtok: 15.00,
        },
    );
    table.insert(
        "claude-opus-4-6".to_string(),
        ModelPricing {
            input_per_mtok: 15.00,
            output_per_mtok: 75.00,
        },
    );
    table.insert(
        "claude-haiku-4-5-20251001".to_string(),
        ModelPricing {
            input_per_mtok: 0.80,
            output_per_mtok: 4.00,
        },
    );
    table
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Checks required before a run that will call the translation
    /// service. Offline commands (inspect, estimate) only need
    /// [`Config::validate`], which does not demand an API key.
    pub fn validate_for_translation(&self) -> Result<()> {
        self.validate()?;

        if self.translation.api_key.is_empty() {
            return Err(anyhow!("Translation API key is required"));
        }

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages against the supported set, so a run cannot
        // spend money on a language the builder will later reject
        if !crate::language_utils::is_supported(&self.source_language) {
            return Err(anyhow!(
                "Unsupported source language: {}",
                self.source_language
            ));
        }
        if !crate::language_utils::is_supported(&self.target_language) {
            return Err(anyhow!(
                "Unsupported target language: {}",
                self.target_language
            ));
        }

        if self.translation.worker_count == 0 {
            return Err(anyhow!("Worker count must be at least 1"));
        }

        if !self.translation.endpoint.is_empty() {
            url::Url::parse(&self.translation.endpoint).with_context(|| {
                format!("Invalid endpoint URL: {}", self.translation.endpoint)
            })?;
        }

        if self.chunking.word_budget == 0 {
            return Err(anyhow!("Word budget must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.extraction.corruption_threshold) {
            return Err(anyhow!(
                "Corruption threshold must be between 0.0 and 1.0, got {}",
                self.extraction.corruption_threshold
            ));
        }

        Ok(())
    }

    /// Look up pricing for the configured model
    pub fn model_pricing(&self) -> Option<ModelPricing> {
        self.pricing.get(&self.translation.model).copied()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            translation: TranslationConfig::default(),
            extraction: ExtractionConfig::default(),
            chunking: ChunkingConfig::default(),
            pricing: default_pricing_table(),
            log_level: LogLevel::default(),
        }
    }
}
