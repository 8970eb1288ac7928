/*!
 * Fallback extraction strategy: plain-text extraction with pdf-extract.
 *
 * Used when the primary engine fails to load the document or its output
 * trips the corruption heuristic. Text only: no info dictionary and no
 * image support, by design of the all-or-nothing selection.
 */

use anyhow::{Context, Result};

use super::{ExtractionStrategy, RawPage};

/// Plain-text extraction backed by pdf-extract
pub struct PdfExtractStrategy;

impl ExtractionStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<RawPage>> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .context("Failed to extract text from PDF")?;

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        // pdf-extract separates pages with form feeds when it can; a
        // document without them is treated as one page
        let pages: Vec<RawPage> = text
            .split('\u{c}')
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| RawPage {
                text: segment.to_string(),
            })
            .collect();

        Ok(pages)
    }
}
