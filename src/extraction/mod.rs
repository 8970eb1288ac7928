/*!
 * PDF extraction engine.
 *
 * Produces an ordered, structured representation of the source document:
 * text runs tagged with page and chapter, plus embedded images. A primary
 * strategy (structured, via lopdf) is tried first; when its output looks
 * corrupted a plain-text fallback (pdf-extract) is used instead. Selection
 * is all-or-nothing per run, so downstream chapter and index numbering
 * stays self-consistent.
 */

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app_config::ExtractionConfig;
use crate::errors::ExtractionError;

pub mod fallback;
pub mod primary;

use fallback::PdfExtractStrategy;
use primary::LopdfStrategy;

// Patterns that indicate chapter headings (multi-language)
static CHAPTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    let patterns = [
        r"^(?:chapter|cap[íi]tulo|chapitre|kapitel|capitolo)\s+\d+",
        r"^(?:part|parte|partie|teil)\s+[IVXLCDM\d]+",
        r"^(?:appendix|ap[ée]ndice|annexe|anhang|appendice)\s+[A-Z\d]",
        r"^(?:introduction|introducci[óo]n|epilogue|ep[íi]logo)",
        r"^(?:bibliography|bibliograf[íi]a|references|referencias)",
        r"^(?:prologue|pr[óo]logo|preface|prefacio)",
    ];
    Regex::new(&format!("(?i){}", patterns.join("|"))).expect("invalid chapter pattern")
});

// How many lines at the top of a page are scanned for a heading
const HEADING_SCAN_LINES: usize = 10;

/// A contiguous paragraph of source text with its position in the stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// Stable position in the document-wide run stream
    pub sequence_index: usize,

    /// Zero-based index of the owning page
    pub page_index: usize,

    /// Index into the document's chapter list
    pub chapter_index: usize,

    /// Paragraph text, exactly as extracted
    pub text: String,
}

impl TextRun {
    /// Word count of this run
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Chapter tag derived from heading heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Zero-based chapter index
    pub index: usize,

    /// Heading text, or None for the implicit untitled chapter
    pub label: Option<String>,

    /// Page on which the chapter starts
    pub first_page: usize,
}

/// Encoded format of an extracted image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Jpeg,
    Png,
    /// Raw stream bytes whose encoding could not be identified
    Raw,
}

/// An embedded image with its position in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Zero-based index of the owning page
    pub page_index: usize,

    /// Pixel width
    pub width: u32,

    /// Pixel height
    pub height: u32,

    /// Encoded format of `data`
    pub encoding: ImageEncoding,

    /// Raw image bytes, base64-encoded in the serialized artifact so a
    /// downstream renderer can re-embed them
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Document-level metadata surfaced before translation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Title from the PDF info dictionary, if any
    pub title: Option<String>,

    /// Author from the PDF info dictionary, if any
    pub author: Option<String>,

    /// Number of pages
    pub page_count: usize,

    /// Total word count of extracted text
    pub word_count: usize,

    /// Number of extracted images
    pub image_count: usize,
}

/// The structured output of extraction, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document metadata
    pub info: DocumentInfo,

    /// Chapters in reading order; never empty (untitled chapter as floor)
    pub chapters: Vec<Chapter>,

    /// All text runs in reading order
    pub runs: Vec<TextRun>,

    /// All extracted images, ordered by page
    pub images: Vec<ImageAsset>,

    /// Which engine produced the text
    pub engine: EngineKind,
}

impl SourceDocument {
    /// Total word count across all runs
    pub fn word_count(&self) -> usize {
        self.runs.iter().map(|r| r.word_count()).sum()
    }

    /// Full text stream, used by the round-trip invariant
    pub fn full_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Which extraction strategy produced the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Primary,
    Fallback,
}

/// Raw per-page text handed back by a strategy
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Extracted page text; empty when the page yielded nothing
    pub text: String,
}

/// A single extraction strategy. Strategies only extract; the engine
/// owns selection between them.
pub trait ExtractionStrategy {
    /// Human-readable strategy name for logs and error reports
    fn name(&self) -> &'static str;

    /// Extract per-page text from raw PDF bytes
    fn extract_pages(&self, bytes: &[u8]) -> anyhow::Result<Vec<RawPage>>;
}

/// Dual-engine extraction with corruption-based fallback
pub struct Engine {
    config: ExtractionConfig,
    primary: LopdfStrategy,
    fallback: PdfExtractStrategy,
}

impl Engine {
    /// Create an engine with the given extraction configuration
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            primary: LopdfStrategy,
            fallback: PdfExtractStrategy,
        }
    }

    /// Extract a structured document from raw PDF bytes.
    ///
    /// Tries the primary engine, scores its output, and re-runs with the
    /// fallback when the corruption score exceeds the configured threshold.
    /// The two engines' outputs are never mixed.
    pub fn extract(&self, bytes: &[u8]) -> Result<SourceDocument, ExtractionError> {
        let primary_failure;

        match self.primary.extract_pages(bytes) {
            Ok(pages) if pages.is_empty() => return Err(ExtractionError::EmptyDocument),
            Ok(pages) => {
                let score = corruption_score(&pages);
                if score <= self.config.corruption_threshold {
                    debug!(
                        "Primary extraction accepted (corruption score {:.3} <= {:.3})",
                        score, self.config.corruption_threshold
                    );
                    let images = if self.config.extract_images {
                        primary::extract_images(bytes, self.config.min_image_dimension)
                    } else {
                        Vec::new()
                    };
                    let info = primary::extract_info(bytes);
                    let outline = primary::extract_outline(bytes);
                    return Ok(assemble(pages, images, info, EngineKind::Primary, &outline));
                }
                warn!(
                    "Primary extraction looks corrupted (score {:.3} > {:.3}), falling back",
                    score, self.config.corruption_threshold
                );
                primary_failure = format!("corruption score {:.3} above threshold", score);
            }
            Err(e) => {
                warn!("Primary extraction failed: {}, falling back", e);
                primary_failure = e.to_string();
            }
        }

        // Fallback run: all-or-nothing, no partial reuse of the primary
        let pages = match self.fallback.extract_pages(bytes) {
            Ok(pages) if !pages.is_empty() => pages,
            Ok(_) => {
                return Err(ExtractionError::BothEnginesFailed {
                    primary: primary_failure,
                    fallback: "no pages extracted".to_string(),
                })
            }
            Err(e) => {
                return Err(ExtractionError::BothEnginesFailed {
                    primary: primary_failure,
                    fallback: e.to_string(),
                })
            }
        };

        let score = corruption_score(&pages);
        if score > self.config.corruption_threshold {
            return Err(ExtractionError::BothEnginesFailed {
                primary: primary_failure,
                fallback: format!("corruption score {:.3} above threshold", score),
            });
        }

        info!("Fallback extraction selected ({} pages)", pages.len());
        // The fallback is plain-text only; images and the info dictionary
        // would come from the primary engine, and mixing is not allowed.
        Ok(assemble(
            pages,
            Vec::new(),
            DocumentInfo::default(),
            EngineKind::Fallback,
            &[],
        ))
    }

    /// Inspect a PDF without full extraction: page/word/image counts and
    /// the info dictionary, for pre-flight display and cost estimation.
    pub fn inspect(&self, bytes: &[u8]) -> Result<DocumentInfo, ExtractionError> {
        let document = self.extract(bytes)?;
        let mut info = document.info.clone();
        info.page_count = document
            .runs
            .iter()
            .map(|r| r.page_index + 1)
            .max()
            .unwrap_or(info.page_count);
        info.word_count = document.word_count();
        info.image_count = document.images.len();
        Ok(info)
    }
}

/// Fraction of extracted output that looks corrupted.
///
/// Two signals, the worse one wins: the ratio of garbled glyphs
/// (replacement characters, stray control characters, private-use
/// codepoints from broken custom font tables) to all characters, and the
/// ratio of empty-text pages to all pages.
pub fn corruption_score(pages: &[RawPage]) -> f32 {
    if pages.is_empty() {
        return 1.0;
    }

    let mut total_chars = 0usize;
    let mut garbled_chars = 0usize;
    let mut empty_pages = 0usize;

    for page in pages {
        if page.text.trim().is_empty() {
            empty_pages += 1;
            continue;
        }
        for ch in page.text.chars() {
            total_chars += 1;
            if is_garbled(ch) {
                garbled_chars += 1;
            }
        }
    }

    let garbled_ratio = if total_chars > 0 {
        garbled_chars as f32 / total_chars as f32
    } else {
        1.0
    };
    let empty_ratio = empty_pages as f32 / pages.len() as f32;

    garbled_ratio.max(empty_ratio)
}

fn is_garbled(ch: char) -> bool {
    if ch == '\u{FFFD}' {
        return true;
    }
    // Private Use Area codepoints are what unmapped custom-font glyphs
    // decode to
    if ('\u{E000}'..='\u{F8FF}').contains(&ch) {
        return true;
    }
    ch.is_control() && !matches!(ch, '\n' | '\r' | '\t' | '\u{c}')
}

/// Turn raw page text into the structured run/chapter representation.
///
/// Chapter boundaries come from the document outline when one was read;
/// otherwise heading heuristics on each page's first lines are used.
fn assemble(
    pages: Vec<RawPage>,
    images: Vec<ImageAsset>,
    mut info: DocumentInfo,
    engine: EngineKind,
    outline: &[(String, usize)],
) -> SourceDocument {
    let mut chapters: Vec<Chapter> = outline_chapters(outline, pages.len());
    let mut runs: Vec<TextRun> = Vec::new();

    for (page_index, page) in pages.iter().enumerate() {
        if outline.is_empty() {
            if let Some(label) = detect_heading(&page.text) {
                chapters.push(Chapter {
                    index: chapters.len(),
                    label: Some(label),
                    first_page: page_index,
                });
            } else if chapters.is_empty() {
                // Graceful degradation: everything before the first detected
                // heading lives in a single untitled chapter
                chapters.push(Chapter {
                    index: 0,
                    label: None,
                    first_page: page_index,
                });
            }
        }
        let chapter_index = chapters
            .iter()
            .rposition(|c| c.first_page <= page_index)
            .unwrap_or(0);

        for paragraph in split_paragraphs(&page.text) {
            runs.push(TextRun {
                sequence_index: runs.len(),
                page_index,
                chapter_index,
                text: paragraph,
            });
        }
    }

    if chapters.is_empty() {
        chapters.push(Chapter {
            index: 0,
            label: None,
            first_page: 0,
        });
    }

    info.page_count = pages.len();
    info.image_count = images.len();
    info.word_count = runs.iter().map(|r| r.word_count()).sum();

    SourceDocument {
        info,
        chapters,
        runs,
        images,
        engine,
    }
}

/// Build the chapter list from outline entries, which are already sorted
/// by page. Entries pointing past the document and duplicate pages are
/// dropped; text before the first entry gets an untitled chapter.
fn outline_chapters(outline: &[(String, usize)], page_count: usize) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();

    for (title, first_page) in outline {
        if *first_page >= page_count {
            continue;
        }
        if chapters.last().map(|c| c.first_page) == Some(*first_page) {
            continue;
        }
        if chapters.is_empty() && *first_page > 0 {
            chapters.push(Chapter {
                index: 0,
                label: None,
                first_page: 0,
            });
        }
        chapters.push(Chapter {
            index: chapters.len(),
            label: Some(title.clone()),
            first_page: *first_page,
        });
    }

    chapters
}

/// Scan the top of a page for a chapter heading.
fn detect_heading(page_text: &str) -> Option<String> {
    for line in page_text.lines().take(HEADING_SCAN_LINES) {
        let stripped = line.trim();
        if !stripped.is_empty() && CHAPTER_REGEX.is_match(stripped) {
            let label: String = stripped.chars().take(80).collect();
            return Some(label);
        }
    }
    None
}

/// Split page text into paragraph runs, preserving the text exactly:
/// the concatenation of the returned strings equals the input.
fn split_paragraphs(text: &str) -> Vec<String> {
    static PARAGRAPH_BREAK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\n\s*\n").expect("invalid paragraph pattern"));

    if text.is_empty() {
        return Vec::new();
    }

    let mut paragraphs = Vec::new();
    let mut last_end = 0;
    for m in PARAGRAPH_BREAK.find_iter(text) {
        // The break itself stays attached to the preceding paragraph so
        // no bytes are dropped
        paragraphs.push(text[last_end..m.end()].to_string());
        last_end = m.end();
    }
    if last_end < text.len() {
        paragraphs.push(text[last_end..].to_string());
    }
    paragraphs
}
