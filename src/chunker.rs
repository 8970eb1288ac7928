/*!
 * Chapter-aware chunking of the extracted text stream.
 *
 * Walks the ordered run stream and produces bounded-size, ordered batches
 * for translation. Chunk boundaries respect chapter boundaries, prefer
 * paragraph boundaries within a tolerance window of the budget, and never
 * drop or duplicate text: concatenating all chunks in order reconstructs
 * the extracted stream exactly.
 */

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::errors::ChunkingError;
use crate::extraction::{SourceDocument, TextRun};

// Fraction of the budget below which a paragraph-boundary close is
// considered wasteful and the run is split mid-paragraph instead
const TOLERANCE_DIVISOR: usize = 10;

/// An ordered, contiguous slice of text runs submitted as one
/// translation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Dense, zero-based position defining the required output ordering
    pub sequence_index: usize,

    /// The runs making up this chunk, in stream order
    pub runs: Vec<TextRun>,

    /// Cached word count across all runs
    pub word_count: usize,

    /// Whether this chunk opens a new chapter (used for reassembly)
    pub starts_chapter: bool,

    /// Chapter this chunk belongs to
    pub chapter_index: usize,

    /// Heading of the owning chapter, when it has one
    pub chapter_label: Option<String>,

    /// First source page covered by this chunk
    pub start_page: usize,

    /// Last source page covered by this chunk
    pub end_page: usize,
}

impl Chunk {
    /// The chunk's text as sent to the translation service.
    /// Runs carry their own paragraph breaks, so plain concatenation
    /// preserves formatting.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Split a document's run stream into translation-ready chunks.
pub fn chunk(document: &SourceDocument, word_budget: usize) -> Result<Vec<Chunk>, ChunkingError> {
    if word_budget == 0 {
        return Err(ChunkingError::InvalidBudget(word_budget));
    }

    let tolerance_floor = word_budget - word_budget / TOLERANCE_DIVISOR;

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut current_words = 0usize;

    let mut close = |current: &mut Vec<TextRun>, current_words: &mut usize, chunks: &mut Vec<Chunk>| {
        if current.is_empty() {
            return;
        }
        let runs = std::mem::take(current);
        let chapter_index = runs[0].chapter_index;
        let starts_chapter = chunks
            .last()
            .map(|prev: &Chunk| prev.chapter_index != chapter_index)
            .unwrap_or(true);
        let chapter_label = document
            .chapters
            .get(chapter_index)
            .and_then(|c| c.label.clone());
        chunks.push(Chunk {
            sequence_index: chunks.len(),
            word_count: *current_words,
            starts_chapter,
            chapter_index,
            chapter_label,
            start_page: runs.first().map(|r| r.page_index).unwrap_or(0),
            end_page: runs.last().map(|r| r.page_index).unwrap_or(0),
            runs,
        });
        *current_words = 0;
    };

    let mut pending: VecDeque<TextRun> = document.runs.iter().cloned().collect();

    while let Some(run) = pending.pop_front() {
        // A chapter boundary always closes the open chunk, even under
        // budget, so no chunk straddles two chapters
        let crosses_chapter = current
            .last()
            .map(|last| last.chapter_index != run.chapter_index)
            .unwrap_or(false);
        if crosses_chapter {
            close(&mut current, &mut current_words, &mut chunks);
        }

        let run_words = run.word_count();

        if current_words + run_words <= word_budget {
            current_words += run_words;
            current.push(run);
            continue;
        }

        if current.is_empty() {
            // Pathological single run larger than the whole budget:
            // emitted as its own oversized chunk, never truncated
            current_words = run_words;
            current.push(run);
            close(&mut current, &mut current_words, &mut chunks);
            continue;
        }

        if current_words >= tolerance_floor {
            // Paragraph boundary within the tolerance window: close here
            close(&mut current, &mut current_words, &mut chunks);
            pending.push_front(run);
            continue;
        }

        // No acceptable paragraph boundary: close exactly at the budget
        // by splitting the run at a word boundary. Both halves keep the
        // original bytes so the stream still round-trips.
        let remaining = word_budget - current_words;
        let (head, tail) = split_run_at(run, remaining);
        current_words += head.word_count();
        current.push(head);
        close(&mut current, &mut current_words, &mut chunks);
        pending.push_front(tail);
    }

    close(&mut current, &mut current_words, &mut chunks);

    Ok(chunks)
}

/// Split a run after its `words`-th word. The two halves concatenate to
/// the original text exactly. Caller guarantees `0 < words < run words`.
fn split_run_at(run: TextRun, words: usize) -> (TextRun, TextRun) {
    let mut seen = 0usize;
    let mut in_word = false;
    let mut split_at = run.text.len();

    for (idx, ch) in run.text.char_indices() {
        if ch.is_whitespace() {
            if in_word {
                seen += 1;
                in_word = false;
                if seen == words {
                    split_at = idx;
                    break;
                }
            }
        } else {
            in_word = true;
        }
    }

    let head = TextRun {
        sequence_index: run.sequence_index,
        page_index: run.page_index,
        chapter_index: run.chapter_index,
        text: run.text[..split_at].to_string(),
    };
    let tail = TextRun {
        sequence_index: run.sequence_index,
        page_index: run.page_index,
        chapter_index: run.chapter_index,
        text: run.text[split_at..].to_string(),
    };
    (head, tail)
}
