/*!
 * Output document assembly.
 *
 * Takes the ordered translated chunks, re-inserts extracted images near
 * their source pages, parses the translated text into structural blocks,
 * and produces the serializable output artifact with cover metadata and a
 * table of contents.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::BuildError;
use crate::extraction::ImageAsset;
use crate::language_utils::script_family;
use crate::translation::TranslatedChunk;

pub use self::model::{
    Block, DocumentMetadata, FontSelection, OutputChapter, OutputDocument, TocEntry,
};

pub mod model;

static HEADING_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(.*)").unwrap());

static SECTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^##\s+(.*)").unwrap());

static BOLD_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\*([^*]+)\*\*\s*$").unwrap());

static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s+.*").unwrap());

/// Chapter-like announcements the translator tends to leave on their own
/// line, across the supported languages
static CHAPTER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^#?\s*(CAP[IÍ]TULO|CHAPTER|CHAPITRE|KAPITEL|CAPITOLO|EP[IÍ]LOGO|EPILOGUE|PR[OÓ]LOGO|PROLOGUE|AP[EÉ]NDICE|APPENDIX|ANNEXE)\b",
    )
    .unwrap()
});

/// Assemble the output document from ordered translated chunks.
///
/// The input must be the dense, zero-based sequence the orchestrator
/// produced; any gap or duplicate is rejected rather than silently
/// papered over.
pub fn build(
    translated: &[TranslatedChunk],
    images: &[ImageAsset],
    metadata: DocumentMetadata,
) -> Result<OutputDocument, BuildError> {
    if translated.is_empty() {
        return Err(BuildError::EmptyInput);
    }
    for (expected, chunk) in translated.iter().enumerate() {
        if chunk.sequence_index != expected {
            return Err(BuildError::IncompleteInput {
                expected,
                found: chunk.sequence_index,
            });
        }
    }

    let script = script_family(&metadata.target_language)
        .map_err(|_| BuildError::UnsupportedScript(metadata.target_language.clone()))?;
    let font = FontSelection::from(script);

    let mut sorted_images: Vec<ImageAsset> = images.to_vec();
    sorted_images.sort_by_key(|img| img.page_index);
    let mut next_image = 0;

    let mut chapters: Vec<OutputChapter> = Vec::new();
    for chunk in translated {
        if chunk.starts_chapter || chapters.is_empty() {
            chapters.push(OutputChapter {
                index: chapters.len(),
                title: chunk.chapter_label.clone(),
                blocks: Vec::new(),
            });
        }
        if let Some(chapter) = chapters.last_mut() {
            chapter.blocks.extend(parse_blocks(&chunk.text));

            // Images are placed after the chunk covering their source page,
            // preserving their relative order
            while next_image < sorted_images.len()
                && sorted_images[next_image].page_index <= chunk.end_page
            {
                chapter.blocks.push(Block::Image {
                    asset: sorted_images[next_image].clone(),
                });
                next_image += 1;
            }
        }
    }

    // Images past the last covered page land at the end of the final chapter
    if let Some(chapter) = chapters.last_mut() {
        for asset in &sorted_images[next_image..] {
            chapter.blocks.push(Block::Image {
                asset: asset.clone(),
            });
        }
    }

    // A chapter without a detected heading adopts its leading heading block
    for chapter in &mut chapters {
        if chapter.title.is_none() {
            if let Some(Block::Heading { text }) = chapter.blocks.first() {
                chapter.title = Some(text.clone());
            }
        }
    }

    let toc = chapters
        .iter()
        .filter_map(|c| {
            c.title.as_ref().map(|title| TocEntry {
                chapter_index: c.index,
                title: title.clone(),
            })
        })
        .collect();

    Ok(OutputDocument {
        metadata,
        font,
        toc,
        chapters,
    })
}

/// Whether a line opens a new structural element, ending any paragraph or
/// list item being accumulated
fn is_structural(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("**")
        || line.starts_with("====")
        || NUMBERED_LINE.is_match(line)
}

fn is_epigraph(line: &str) -> bool {
    line.starts_with("*\"")
        || line.starts_with("*«")
        || ((line.starts_with('"') || line.starts_with('«') || line.starts_with('\u{201c}'))
            && (line.contains('\u{2014}') || line.contains('\u{2013}')))
}

/// Parse a translated chunk's text into structural blocks.
///
/// Reduced markdown-ish parsing: chapter-like lines and `#` headings,
/// `##` sections and standalone bold lines, numbered items, quoted
/// epigraphs, and plain paragraphs with continuation lines joined.
fn parse_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // Horizontal rules and blank separators carry no content
        if line.is_empty() || line.starts_with("====") || line == "---" {
            i += 1;
            continue;
        }

        if CHAPTER_LINE.is_match(line) {
            let text = line.trim_start_matches('#').trim().trim_matches('*').trim();
            blocks.push(Block::Heading {
                text: text.to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(caps) = SECTION_LINE.captures(line) {
            blocks.push(Block::Subheading {
                text: caps[1].trim().to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(caps) = HEADING_LINE.captures(line) {
            blocks.push(Block::Heading {
                text: caps[1].trim().to_string(),
            });
            i += 1;
            continue;
        }

        if let Some(caps) = BOLD_LINE.captures(line) {
            blocks.push(Block::Subheading {
                text: caps[1].trim().to_string(),
            });
            i += 1;
            continue;
        }

        if is_epigraph(line) {
            let mut quote = line.trim_matches('*').trim().to_string();
            // Attribution on the following line belongs to the quote
            if i + 1 < lines.len() && lines[i + 1].starts_with('\u{2014}') {
                quote.push(' ');
                quote.push_str(lines[i + 1]);
                i += 1;
            }
            blocks.push(Block::Epigraph { text: quote });
            i += 1;
            continue;
        }

        if NUMBERED_LINE.is_match(line) {
            let mut item = line.to_string();
            let mut j = i + 1;
            while j < lines.len() && !is_structural(lines[j]) {
                item.push(' ');
                item.push_str(lines[j]);
                j += 1;
            }
            blocks.push(Block::Numbered { text: item });
            i = j;
            continue;
        }

        // Plain paragraph, joining continuation lines
        let mut paragraph = line.to_string();
        let mut j = i + 1;
        while j < lines.len() && !is_structural(lines[j]) && !is_epigraph(lines[j]) {
            paragraph.push(' ');
            paragraph.push_str(lines[j]);
            j += 1;
        }
        blocks.push(Block::Paragraph { text: paragraph });
        i = j;
    }

    blocks
}
