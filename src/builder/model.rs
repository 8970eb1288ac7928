/*!
 * Structural model of the output document.
 *
 * The builder produces this serde-serializable artifact; rendering it to a
 * file format is left to the caller.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::ImageAsset;
use crate::language_utils::ScriptFamily;

/// Front-matter metadata for the output document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title, from the source PDF or supplied by the caller
    pub title: String,

    /// Author, when the source PDF carried one
    pub author: Option<String>,

    /// Optional subtitle shown on the cover
    pub subtitle: Option<String>,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Model that produced the translation
    pub model: String,

    /// When the document was generated
    pub generated_at: DateTime<Utc>,
}

impl DocumentMetadata {
    pub fn new(
        title: impl Into<String>,
        author: Option<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author,
            subtitle: None,
            source_language: source_language.into(),
            target_language: target_language.into(),
            model: model.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Typography choice for the target language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSelection {
    /// Script family the target language belongs to
    pub script: ScriptFamily,

    /// Font family name covering that script
    pub family: String,

    /// Whether the text direction is right to left
    pub rtl: bool,
}

impl From<ScriptFamily> for FontSelection {
    fn from(script: ScriptFamily) -> Self {
        Self {
            family: script.font_name().to_string(),
            rtl: script.is_rtl(),
            script,
        }
    }
}

/// One structural element of a chapter body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Block {
    /// Top-level heading inside the text flow
    Heading { text: String },

    /// Section or bold-line subheading
    Subheading { text: String },

    /// Plain body paragraph
    Paragraph { text: String },

    /// Numbered list item, marker included
    Numbered { text: String },

    /// Quoted epigraph, usually with attribution
    Epigraph { text: String },

    /// Image re-inserted near its source position
    Image { asset: ImageAsset },
}

/// A chapter of the output document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputChapter {
    /// Zero-based chapter index
    pub index: usize,

    /// Chapter title, when the source had a detectable heading
    pub title: Option<String>,

    /// Body blocks in reading order
    pub blocks: Vec<Block>,
}

/// Table-of-contents entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocEntry {
    /// Index of the chapter this entry points at
    pub chapter_index: usize,

    /// Displayed title
    pub title: String,
}

/// The assembled output artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDocument {
    /// Cover and provenance metadata
    pub metadata: DocumentMetadata,

    /// Typography for the target script
    pub font: FontSelection,

    /// Table of contents derived from chapter titles
    pub toc: Vec<TocEntry>,

    /// Chapters in order
    pub chapters: Vec<OutputChapter>,
}

impl OutputDocument {
    /// Total number of blocks across all chapters
    pub fn block_count(&self) -> usize {
        self.chapters.iter().map(|c| c.blocks.len()).sum()
    }
}
