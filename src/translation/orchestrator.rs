/*!
 * Concurrent translation orchestration.
 *
 * Dispatches chunks to the translation service under a bounded worker
 * pool, retries transient failures with exponential backoff, and restores
 * output ordering through a pre-sized slot table. A fatal provider error
 * (bad credentials) halts dispatch: in-flight chunks drain, undispatched
 * ones are marked as such, and the run reports a partial result.
 */

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::chunker::Chunk;
use crate::errors::{ProviderError, TranslationError};

use super::core::{TranslatedChunk, TranslationService};

/// One chunk's terminal failure, with the retry budget it consumed
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    /// Position of the failed chunk in the output ordering
    pub sequence_index: usize,

    /// The terminal error
    pub error: TranslationError,
}

/// Aggregate account of a run that did not translate every chunk
#[derive(Debug, Clone)]
pub struct PartialFailureReport {
    /// Total chunks submitted
    pub total_chunks: usize,

    /// Chunks that failed or were never dispatched, in sequence order
    pub failures: Vec<ChunkFailure>,

    /// Whether a fatal error stopped dispatch early
    pub halted: bool,
}

impl PartialFailureReport {
    /// Sequence indices of every chunk missing from the output
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.sequence_index).collect()
    }
}

/// Result of an orchestrated run
#[derive(Debug)]
pub enum TranslationOutcome {
    /// Every chunk translated, in sequence order
    Complete(Vec<TranslatedChunk>),

    /// Some chunks missing: the survivors in sequence order plus the report
    Partial {
        /// Successfully translated chunks, ordered by sequence index
        translated: Vec<TranslatedChunk>,
        /// What went missing and why
        report: PartialFailureReport,
    },
}

/// Orchestrator for concurrent chunk translation
pub struct Orchestrator {
    /// The translation service performing single attempts
    service: TranslationService,

    /// Maximum number of in-flight requests
    worker_count: usize,

    /// Retries per chunk for transient failures
    retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    retry_backoff_ms: u64,

    /// Per-attempt timeout in seconds
    timeout_secs: u64,
}

impl Orchestrator {
    pub fn new(
        service: TranslationService,
        worker_count: usize,
        retry_count: u32,
        retry_backoff_ms: u64,
        timeout_secs: u64,
    ) -> Self {
        Self {
            service,
            // A zero worker pool would deadlock the semaphore
            worker_count: worker_count.max(1),
            retry_count,
            retry_backoff_ms,
            timeout_secs,
        }
    }

    /// Translate all chunks, preserving output ordering regardless of
    /// completion order. The progress callback receives (done, total)
    /// after every terminal chunk result.
    pub async fn run(
        &self,
        chunks: &[Chunk],
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> TranslationOutcome {
        let total = chunks.len();
        if total == 0 {
            return TranslationOutcome::Complete(Vec::new());
        }

        // One slot per chunk, indexed by sequence, so completion order
        // never touches output order
        let slots: Arc<Mutex<Vec<Option<Result<TranslatedChunk, TranslationError>>>>> =
            Arc::new(Mutex::new(vec![None; total]));

        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let halt = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicUsize::new(0));

        stream::iter(chunks.iter().cloned())
            .map(|chunk| {
                let slots = Arc::clone(&slots);
                let semaphore = Arc::clone(&semaphore);
                let halt = Arc::clone(&halt);
                let done = Arc::clone(&done);
                let progress_callback = progress_callback.clone();

                async move {
                    let index = chunk.sequence_index;

                    let result = if halt.load(Ordering::SeqCst) {
                        Err(TranslationError::NotDispatched)
                    } else {
                        // Semaphore poisoning is impossible here; the permit
                        // is held for the whole attempt loop
                        let _permit = semaphore.acquire().await.expect("semaphore closed");
                        if halt.load(Ordering::SeqCst) {
                            Err(TranslationError::NotDispatched)
                        } else {
                            let result = self.translate_with_retry(&chunk).await;
                            if let Err(e) = &result {
                                if e.halts_run() {
                                    warn!("Fatal provider error, halting dispatch: {}", e);
                                    halt.store(true, Ordering::SeqCst);
                                }
                            }
                            result
                        }
                    };

                    slots.lock()[index] = Some(result);
                    let current = done.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total);
                }
            })
            .buffer_unordered(self.worker_count)
            .collect::<Vec<()>>()
            .await;

        let slots = Arc::try_unwrap(slots)
            .expect("all workers finished")
            .into_inner();

        let mut translated = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(chunk)) => translated.push(chunk),
                Some(Err(error)) => failures.push(ChunkFailure {
                    sequence_index: index,
                    error,
                }),
                // Unreachable: every chunk writes its slot exactly once
                None => failures.push(ChunkFailure {
                    sequence_index: index,
                    error: TranslationError::NotDispatched,
                }),
            }
        }

        if failures.is_empty() {
            TranslationOutcome::Complete(translated)
        } else {
            let halted = halt.load(Ordering::SeqCst);
            TranslationOutcome::Partial {
                translated,
                report: PartialFailureReport {
                    total_chunks: total,
                    failures,
                    halted,
                },
            }
        }
    }

    /// One chunk's full attempt loop: initial try plus up to `retry_count`
    /// retries for transient errors, with exponential backoff between
    /// attempts. An attempt that outlives the timeout counts as transient.
    async fn translate_with_retry(&self, chunk: &Chunk) -> Result<TranslatedChunk, TranslationError> {
        let attempt_budget = Duration::from_secs(self.timeout_secs);
        let mut last_error = None;

        for attempt in 0..=self.retry_count {
            if attempt > 0 {
                let backoff = backoff_ms(self.retry_backoff_ms, attempt);
                debug!(
                    "Retrying chunk {} (attempt {}/{}) after {}ms",
                    chunk.sequence_index, attempt, self.retry_count, backoff
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let error = match timeout(attempt_budget, self.service.translate_chunk(chunk)).await {
                Ok(Ok(translated)) => return Ok(translated),
                Ok(Err(e)) => e,
                Err(_) => ProviderError::Timeout(self.timeout_secs),
            };

            if !error.is_transient() {
                return Err(TranslationError::Fatal { source: error });
            }
            warn!(
                "Chunk {} attempt {} failed: {}",
                chunk.sequence_index,
                attempt + 1,
                error
            );
            last_error = Some(error);
        }

        // Loop always sets last_error before falling through
        Err(TranslationError::Transient {
            source: last_error.unwrap_or_else(|| ProviderError::Timeout(self.timeout_secs)),
            retries_used: self.retry_count,
        })
    }
}

// Ceiling for a single backoff sleep, whatever the configuration says
const MAX_BACKOFF_MS: u64 = 60_000;

/// Exponential backoff for retry `attempt` (1-based). Both inputs are
/// user configuration, so the doubling saturates instead of overflowing
/// and the result is capped.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    let factor = 1u64 << (attempt - 1).min(32);
    base.saturating_mul(factor).min(MAX_BACKOFF_MS)
}
