/*!
 * Provider client for the remote translation service.
 *
 * This module contains the transport-level client used by the translation
 * core. The trait is object-safe so the orchestrator can hold an
 * `Arc<dyn Provider>` and tests can substitute the mock implementation.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single translation call, already rendered into prompts
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// System prompt carrying the translation instructions
    pub system_prompt: String,

    /// The chunk text to translate
    pub text: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// The service's answer to a translation call
#[derive(Debug, Clone)]
pub struct TranslationResponse {
    /// The translated text
    pub text: String,

    /// Input tokens billed, when the service reports them
    pub input_tokens: Option<u64>,

    /// Output tokens billed, when the service reports them
    pub output_tokens: Option<u64>,
}

/// Transport client for the translation service
///
/// Implementations own connection details and HTTP status classification;
/// retry policy lives in the orchestrator, not here.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Perform one translation call. A single attempt: no retries here.
    async fn translate(&self, request: TranslationRequest)
        -> Result<TranslationResponse, ProviderError>;

    /// Query the account's remaining credit in USD.
    async fn remaining_credit(&self) -> Result<f64, ProviderError>;

    /// Cheap connectivity and credential check.
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod anthropic;
pub mod mock;
