/*!
 * Concurrency, retry, and ordering tests for the translation orchestrator
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pdflingo::app_config::Config;
use pdflingo::chunker::{chunk, Chunk};
use pdflingo::errors::TranslationError;
use pdflingo::providers::mock::MockProvider;
use pdflingo::providers::Provider;
use pdflingo::translation::{
    Orchestrator, TranslationOutcome, TranslationService,
};

use crate::common::{synthetic_document, FlakyNeedleProvider, JitterProvider};

fn chunks(n: usize) -> Vec<Chunk> {
    // One paragraph per chunk under a tight budget
    let document = synthetic_document(1, n, 80);
    let chunks = chunk(&document, 80).unwrap();
    assert_eq!(chunks.len(), n);
    chunks
}

fn orchestrator(provider: Arc<dyn Provider>, workers: usize) -> Orchestrator {
    let service = TranslationService::new(provider, &Config::default()).unwrap();
    Orchestrator::new(service, workers, 3, 1, 30)
}

#[tokio::test]
async fn test_ordering_survives_random_latency_at_any_worker_count() {
    for workers in [1, 4, 8, 32] {
        let provider = Arc::new(JitterProvider::new(20));
        let outcome = orchestrator(provider, workers).run(&chunks(24), |_, _| {}).await;

        let TranslationOutcome::Complete(translated) = outcome else {
            panic!("expected complete outcome at {} workers", workers);
        };
        let indices: Vec<usize> = translated.iter().map(|t| t.sequence_index).collect();
        assert_eq!(
            indices,
            (0..24).collect::<Vec<_>>(),
            "order broke at {} workers",
            workers
        );
        // Each chunk's translation corresponds to its own source text
        for t in &translated {
            assert!(t.text.contains(&format!("c0p{}w0", t.sequence_index)));
        }
    }
}

#[tokio::test]
async fn test_single_chunk_transient_failures_retry_to_success() {
    // Chunk 7 fails twice, inside the retry budget of 3; everything else
    // succeeds on the first attempt
    let source = chunks(20);
    let needle = "c0p7w0";
    assert!(source[7].text().contains(needle));

    let provider = Arc::new(FlakyNeedleProvider::new(needle, 2));
    let outcome = orchestrator(provider, 8).run(&source, |_, _| {}).await;

    let TranslationOutcome::Complete(translated) = outcome else {
        panic!("expected complete outcome");
    };
    assert_eq!(translated.len(), 20);
    assert!(translated[7].text.contains(needle));
}

#[tokio::test]
async fn test_retry_budget_exhaustion_fails_only_that_chunk() {
    // Chunk 7 fails more times than the retry budget allows
    let source = chunks(20);
    let provider = Arc::new(FlakyNeedleProvider::new("c0p7w0", 50));
    let outcome = orchestrator(provider, 8).run(&source, |_, _| {}).await;

    let TranslationOutcome::Partial { translated, report } = outcome else {
        panic!("expected partial outcome");
    };
    assert_eq!(translated.len(), 19);
    assert_eq!(report.failed_indices(), vec![7]);
    assert!(!report.halted);
    assert!(matches!(
        report.failures[0].error,
        TranslationError::Transient { retries_used: 3, .. }
    ));

    // Survivors keep their dense ordering minus the hole
    let indices: Vec<usize> = translated.iter().map(|t| t.sequence_index).collect();
    let expected: Vec<usize> = (0..20).filter(|&i| i != 7).collect();
    assert_eq!(indices, expected);
}

#[tokio::test]
async fn test_auth_failure_stops_dispatching_new_chunks() {
    let provider = Arc::new(MockProvider::auth_failing());
    let call_counter = provider.clone();
    let outcome = orchestrator(provider, 4).run(&chunks(40), |_, _| {}).await;

    let TranslationOutcome::Partial { translated, report } = outcome else {
        panic!("expected partial outcome");
    };
    assert!(translated.is_empty());
    assert!(report.halted);
    assert_eq!(report.failures.len(), 40);

    // Fatal errors are not retried, and the halt keeps most chunks from
    // ever reaching the provider
    assert!(call_counter.call_count() < 40);
    let not_dispatched = report
        .failures
        .iter()
        .filter(|f| matches!(f.error, TranslationError::NotDispatched))
        .count();
    assert!(not_dispatched > 0);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_complete() {
    let progress = Arc::new(std::sync::Mutex::new(Vec::new()));
    let progress_cb = Arc::clone(&progress);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_cb = Arc::clone(&calls);

    let provider = Arc::new(JitterProvider::new(10));
    orchestrator(provider, 8)
        .run(&chunks(15), move |done, total| {
            assert_eq!(total, 15);
            calls_cb.fetch_add(1, Ordering::SeqCst);
            progress_cb.lock().unwrap().push(done);
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 15);
    let mut seen = progress.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, (1..=15).collect::<Vec<_>>());
}
