/*!
 * Chunking invariant tests against randomized documents
 */

use rand::{Rng, SeedableRng};

use pdflingo::chunker::chunk;
use pdflingo::extraction::SourceDocument;

use crate::common::synthetic_document;

fn rebuild(document: &SourceDocument, word_budget: usize) -> String {
    chunk(document, word_budget)
        .unwrap()
        .iter()
        .map(|c| c.text())
        .collect()
}

#[test]
fn test_round_trip_holds_across_budgets() {
    let document = synthetic_document(3, 10, 120);
    let original = document.full_text();

    for budget in [1, 50, 300, 1000, 100_000] {
        assert_eq!(
            rebuild(&document, budget),
            original,
            "round trip broke at budget {}",
            budget
        );
    }
}

#[test]
fn test_budget_and_ordering_invariants_on_random_documents() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let chapters = rng.random_range(1..=5);
        let paragraphs = rng.random_range(1..=12);
        let words = rng.random_range(1..=250);
        let budget = rng.random_range(10..=2000);

        let document = synthetic_document(chapters, paragraphs, words);
        let chunks = chunk(&document, budget).unwrap();

        let rebuilt: String = chunks.iter().map(|c| c.text()).collect();
        assert_eq!(rebuilt, document.full_text());

        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.sequence_index, i, "sequence indices must be dense");
            // A chunk over budget is only legal when it is a single
            // unsplittable run
            if c.word_count > budget {
                assert_eq!(c.runs.len(), 1);
            }
            // No chunk mixes chapters
            let first_chapter = c.runs[0].chapter_index;
            assert!(c.runs.iter().all(|r| r.chapter_index == first_chapter));
        }
    }
}

#[test]
fn test_chapter_first_chunks_carry_boundary_flags() {
    let document = synthetic_document(4, 6, 200);
    let chunks = chunk(&document, 500).unwrap();

    let flagged: Vec<usize> = chunks
        .iter()
        .filter(|c| c.starts_chapter)
        .map(|c| c.chapter_index)
        .collect();
    assert_eq!(flagged, vec![0, 1, 2, 3]);

    // Boundary chunks carry the chapter heading for the builder
    for c in chunks.iter().filter(|c| c.starts_chapter) {
        assert_eq!(
            c.chapter_label.as_deref(),
            Some(format!("Chapter {}", c.chapter_index + 1).as_str())
        );
    }
}

#[test]
fn test_single_word_budget_still_reconstructs() {
    // Degenerate budget: every paragraph is oversized relative to it
    let document = synthetic_document(1, 3, 40);
    let chunks = chunk(&document, 1).unwrap();

    let rebuilt: String = chunks.iter().map(|c| c.text()).collect();
    assert_eq!(rebuilt, document.full_text());
    for c in &chunks {
        assert!(c.word_count >= 1);
    }
}
