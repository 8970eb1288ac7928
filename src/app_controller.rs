/*!
 * Pipeline controller.
 *
 * Wires the stages end to end: extraction, chunking, cost estimation and
 * credit pre-flight, orchestrated translation, and document assembly.
 * Insufficient credit is advisory (warn and proceed); partial translation
 * failure is surfaced as a structured report instead of a built document.
 */

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::app_config::Config;
use crate::builder::{self, DocumentMetadata, OutputDocument};
use crate::chunker;
use crate::estimator::{self, CostEstimate, CreditStatus};
use crate::extraction::{DocumentInfo, Engine};
use crate::providers::anthropic::AnthropicProvider;
use crate::providers::Provider;
use crate::translation::{
    Orchestrator, PartialFailureReport, TranslatedChunk, TranslationOutcome, TranslationService,
};

/// Result of a full pipeline run
pub enum RunOutcome {
    /// Every chunk translated and the document assembled
    Complete {
        document: OutputDocument,
        estimate: CostEstimate,
    },

    /// Some chunks failed: the survivors and the failure report, so the
    /// caller can re-submit the missing indices
    Partial {
        translated: Vec<TranslatedChunk>,
        report: PartialFailureReport,
        estimate: CostEstimate,
    },
}

/// Main application controller for the translation pipeline
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    fn provider(&self) -> Arc<dyn Provider> {
        Arc::new(AnthropicProvider::new(
            &self.config.translation.api_key,
            &self.config.translation.endpoint,
            &self.config.translation.model,
            self.config.translation.timeout_secs,
        ))
    }

    /// Run the full pipeline on a PDF file.
    ///
    /// The progress callback receives (done, total) chunk counts as
    /// translations complete.
    pub async fn run(
        &self,
        input_file: &Path,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<RunOutcome> {
        let provider = self.provider();
        self.run_with_provider(input_file, provider, progress_callback)
            .await
    }

    /// Pipeline run against an explicit provider, used directly by tests.
    pub async fn run_with_provider(
        &self,
        input_file: &Path,
        provider: Arc<dyn Provider>,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<RunOutcome> {
        let start_time = Instant::now();

        // Connection pre-flight: bad credentials fail every later call
        // identically, so abort before any extraction work. Transient
        // failures are left to the orchestrator's retry policy.
        info!("Translation provider: {}", provider.name());
        if let Err(e) = provider.test_connection().await {
            if e.is_fatal() {
                return Err(anyhow::Error::new(e)
                    .context("Translation service rejected the credentials"));
            }
            warn!("Connection pre-flight failed, proceeding: {}", e);
        }

        let bytes = std::fs::read(input_file)
            .with_context(|| format!("Failed to read input file: {:?}", input_file))?;

        let engine = Engine::new(self.config.extraction.clone());
        let document = engine.extract(&bytes)?;
        info!(
            "Extracted {} words across {} chapters ({:?} engine)",
            document.word_count(),
            document.chapters.len(),
            document.engine
        );

        let chunks = chunker::chunk(&document, self.config.chunking.word_budget)?;
        info!("Split into {} chunks", chunks.len());

        let estimate = estimator::estimate(
            document.word_count(),
            &self.config.translation.model,
            &self.config.pricing,
        )?;
        info!(
            "Estimated cost: ${:.2} ({} input / {} output tokens, {})",
            estimate.total_cost, estimate.input_tokens, estimate.output_tokens, estimate.model
        );

        // Credit check is advisory: the balance endpoint being down or the
        // balance running low should not block a run the user asked for
        match estimator::check_credit(provider.as_ref(), &estimate).await {
            Ok(CreditStatus::Sufficient { remaining }) => {
                info!("Credit check passed ({:.2} USD will remain)", remaining);
            }
            Ok(CreditStatus::Insufficient {
                required,
                available,
            }) => {
                warn!(
                    "Credit may be insufficient: {:.2} USD required, {:.2} available",
                    required, available
                );
            }
            Err(e) => {
                warn!("Credit check unavailable, proceeding: {}", e);
            }
        }

        let service = TranslationService::new(Arc::clone(&provider), &self.config)?;
        let orchestrator = Orchestrator::new(
            service,
            self.config.translation.worker_count,
            self.config.translation.retry_count,
            self.config.translation.retry_backoff_ms,
            self.config.translation.timeout_secs,
        );

        let outcome = orchestrator.run(&chunks, progress_callback).await;

        match outcome {
            TranslationOutcome::Complete(translated) => {
                let metadata = self.metadata_for(&document.info);
                let output = builder::build(&translated, &document.images, metadata)?;
                info!(
                    "Pipeline completed in {:.1}s: {} chapters, {} blocks",
                    start_time.elapsed().as_secs_f64(),
                    output.chapters.len(),
                    output.block_count()
                );
                Ok(RunOutcome::Complete {
                    document: output,
                    estimate,
                })
            }
            TranslationOutcome::Partial { translated, report } => {
                warn!(
                    "Translation incomplete: {}/{} chunks failed{}",
                    report.failures.len(),
                    report.total_chunks,
                    if report.halted {
                        " (run halted by a fatal error)"
                    } else {
                        ""
                    }
                );
                Ok(RunOutcome::Partial {
                    translated,
                    report,
                    estimate,
                })
            }
        }
    }

    /// Inspect a PDF without translating it: metadata plus page, word, and
    /// image counts.
    pub fn inspect(&self, input_file: &Path) -> Result<DocumentInfo> {
        let bytes = std::fs::read(input_file)
            .with_context(|| format!("Failed to read input file: {:?}", input_file))?;
        let engine = Engine::new(self.config.extraction.clone());
        Ok(engine.inspect(&bytes)?)
    }

    /// Extract and estimate without spending anything.
    pub fn estimate(&self, input_file: &Path) -> Result<CostEstimate> {
        let bytes = std::fs::read(input_file)
            .with_context(|| format!("Failed to read input file: {:?}", input_file))?;
        let engine = Engine::new(self.config.extraction.clone());
        let document = engine.extract(&bytes)?;
        Ok(estimator::estimate(
            document.word_count(),
            &self.config.translation.model,
            &self.config.pricing,
        )?)
    }

    fn metadata_for(&self, info: &DocumentInfo) -> DocumentMetadata {
        DocumentMetadata::new(
            info.title.clone().unwrap_or_else(|| "Translated Document".to_string()),
            info.author.clone(),
            &self.config.source_language,
            &self.config.target_language,
            &self.config.translation.model,
        )
    }
}
