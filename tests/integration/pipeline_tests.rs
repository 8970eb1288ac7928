/*!
 * End-to-end pipeline tests: extraction through document assembly
 */

use std::sync::Arc;

use pdflingo::app_config::Config;
use pdflingo::app_controller::{Controller, RunOutcome};
use pdflingo::builder::{self, DocumentMetadata};
use pdflingo::chunker::chunk;
use pdflingo::extraction::{Engine, EngineKind};
use pdflingo::providers::mock::MockProvider;
use pdflingo::translation::{Orchestrator, TranslationOutcome, TranslationService};

use crate::common::{create_temp_dir, sample_pdf_bytes, synthetic_document};

#[test]
fn test_extraction_reads_text_and_metadata_from_real_pdf() {
    let bytes = sample_pdf_bytes(
        &["Chapter 1 An Opening Page", "The second page continues the story."],
        Some("A Test Book"),
    );
    let engine = Engine::new(Config::default().extraction);
    let document = engine.extract(&bytes).unwrap();

    assert_eq!(document.engine, EngineKind::Primary);
    assert_eq!(document.info.title.as_deref(), Some("A Test Book"));
    assert_eq!(document.info.author.as_deref(), Some("Test Author"));
    assert_eq!(document.info.page_count, 2);
    assert!(document.full_text().contains("second page"));
    assert!(document.word_count() > 5);
}

#[test]
fn test_extraction_rejects_garbage_input() {
    let engine = Engine::new(Config::default().extraction);
    assert!(engine.extract(b"this is not a pdf at all").is_err());
}

#[tokio::test]
async fn test_stage_wiring_from_chunks_to_document() {
    let document = synthetic_document(3, 8, 150);
    let chunks = chunk(&document, 400).unwrap();
    assert!(chunks.len() > 3);

    let config = Config::default();
    let service =
        TranslationService::new(Arc::new(MockProvider::working()), &config).unwrap();
    let orchestrator = Orchestrator::new(service, 4, 2, 1, 30);

    let outcome = orchestrator.run(&chunks, |_, _| {}).await;
    let TranslationOutcome::Complete(translated) = outcome else {
        panic!("expected complete outcome");
    };

    let metadata = DocumentMetadata::new(
        "Synthetic Book",
        None,
        &config.source_language,
        &config.target_language,
        &config.translation.model,
    );
    let output = builder::build(&translated, &document.images, metadata).unwrap();

    assert_eq!(output.chapters.len(), 3);
    assert!(output.block_count() > 0);
    // Every chapter body came through the translation service
    for chapter in &output.chapters {
        assert!(!chapter.blocks.is_empty());
    }
}

#[tokio::test]
async fn test_controller_runs_full_pipeline_on_pdf_file() {
    let dir = create_temp_dir().unwrap();
    let pdf_path = dir.path().join("book.pdf");
    std::fs::write(
        &pdf_path,
        sample_pdf_bytes(
            &["The opening page of the book.", "And a closing page."],
            Some("Controller Test Book"),
        ),
    )
    .unwrap();

    let controller = Controller::with_config(Config::default()).unwrap();
    let outcome = controller
        .run_with_provider(&pdf_path, Arc::new(MockProvider::working()), |_, _| {})
        .await
        .unwrap();

    let RunOutcome::Complete { document, estimate } = outcome else {
        panic!("expected complete outcome");
    };
    assert_eq!(document.metadata.title, "Controller Test Book");
    assert_eq!(document.metadata.author.as_deref(), Some("Test Author"));
    assert_eq!(document.metadata.target_language, "es");
    assert!(document.block_count() > 0);
    assert!(estimate.total_cost > 0.0);
    // The mock's marker proves the text went through translation
    let serialized = serde_json::to_string(&document).unwrap();
    assert!(serialized.contains("[TRANSLATED]"));
}

#[tokio::test]
async fn test_controller_rejects_bad_credentials_before_extracting() {
    let dir = create_temp_dir().unwrap();
    let pdf_path = dir.path().join("book.pdf");
    std::fs::write(&pdf_path, sample_pdf_bytes(&["Page text."], None)).unwrap();

    let provider = Arc::new(MockProvider::auth_failing());
    let call_counter = provider.clone();

    let controller = Controller::with_config(Config::default()).unwrap();
    let result = controller
        .run_with_provider(&pdf_path, provider, |_, _| {})
        .await;

    // The pre-flight stops the run before any translation is dispatched
    assert!(result.is_err());
    assert_eq!(call_counter.call_count(), 0);
}

#[tokio::test]
async fn test_controller_surfaces_partial_failure_report() {
    let dir = create_temp_dir().unwrap();
    let pdf_path = dir.path().join("book.pdf");
    std::fs::write(
        &pdf_path,
        sample_pdf_bytes(&["Some page text to translate."], None),
    )
    .unwrap();

    let mut config = Config::default();
    // Keep the retry loop fast
    config.translation.retry_count = 1;
    config.translation.retry_backoff_ms = 1;

    let controller = Controller::with_config(config).unwrap();
    let outcome = controller
        .run_with_provider(&pdf_path, Arc::new(MockProvider::failing()), |_, _| {})
        .await
        .unwrap();

    let RunOutcome::Partial {
        translated, report, ..
    } = outcome
    else {
        panic!("expected partial outcome");
    };
    assert!(translated.is_empty());
    assert_eq!(report.failures.len(), report.total_chunks);
    assert!(!report.failed_indices().is_empty());
}
