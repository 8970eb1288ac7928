/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which renders chunks
 * into prompts and performs single translation attempts against the
 * provider. Retry and concurrency policy belong to the orchestrator.
 */

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::app_config::Config;
use crate::chunker::Chunk;
use crate::errors::ProviderError;
use crate::language_utils::get_language_name;
use crate::providers::{Provider, TranslationRequest};

/// Floor and ceiling for the per-request generation budget
const MIN_MAX_TOKENS: u32 = 1024;
const MAX_MAX_TOKENS: u32 = 64_000;

/// A chunk that came back from the service, still carrying the position
/// and chapter metadata the builder needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedChunk {
    /// Position in the output ordering, copied from the source chunk
    pub sequence_index: usize,

    /// The translated text
    pub text: String,

    /// Whether the source chunk opened a new chapter
    pub starts_chapter: bool,

    /// Chapter the source chunk belonged to
    pub chapter_index: usize,

    /// Heading of the owning chapter, when it has one
    pub chapter_label: Option<String>,

    /// First source page covered
    pub start_page: usize,

    /// Last source page covered
    pub end_page: usize,
}

/// Main translation service: prompt construction plus single-attempt calls
#[derive(Clone)]
pub struct TranslationService {
    /// Provider client
    provider: Arc<dyn Provider>,

    /// System prompt, rendered once per run
    system_prompt: String,

    /// Sampling temperature
    temperature: f32,
}

impl TranslationService {
    /// Create a new translation service for the configured language pair
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Result<Self> {
        let source = get_language_name(&config.source_language)?;
        let target = get_language_name(&config.target_language)?;

        Ok(Self {
            provider,
            system_prompt: build_system_prompt(&source, &target),
            temperature: config.translation.temperature,
        })
    }

    /// The provider this service talks to
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Translate one chunk. A single attempt with no retries; an empty
    /// response body counts as a parse failure.
    pub async fn translate_chunk(&self, chunk: &Chunk) -> Result<TranslatedChunk, ProviderError> {
        let request = TranslationRequest {
            system_prompt: self.system_prompt.clone(),
            text: chunk.text(),
            max_tokens: max_tokens_for(chunk.word_count),
            temperature: self.temperature,
        };

        let response = self.provider.translate(request).await?;

        if response.text.trim().is_empty() {
            return Err(ProviderError::Parse(format!(
                "empty response for chunk {}",
                chunk.sequence_index
            )));
        }

        Ok(TranslatedChunk {
            sequence_index: chunk.sequence_index,
            text: response.text,
            starts_chapter: chunk.starts_chapter,
            chapter_index: chunk.chapter_index,
            chapter_label: chunk.chapter_label.clone(),
            start_page: chunk.start_page,
            end_page: chunk.end_page,
        })
    }
}

/// Generation budget for a chunk: roughly two tokens per source word,
/// clamped so small chunks still have headroom
fn max_tokens_for(word_count: usize) -> u32 {
    ((word_count as u64 * 2).min(MAX_MAX_TOKENS as u64) as u32).max(MIN_MAX_TOKENS)
}

fn build_system_prompt(source: &str, target: &str) -> String {
    format!(
        "You are a professional literary translator. Translate the text provided \
         by the user from {source} to {target}.\n\
         \n\
         Rules:\n\
         - Preserve paragraph breaks and the order of the text.\n\
         - Keep chapter and section headings on their own lines.\n\
         - Translate idioms into natural {target} equivalents rather than literally.\n\
         - Keep proper names unchanged unless a conventional {target} form exists.\n\
         - Do not add notes, commentary, or explanations.\n\
         - Output only the translated text."
    )
}
