/*!
 * Language utilities for ISO language code handling.
 *
 * This module provides functions for validating and normalizing ISO 639
 * language codes, plus the script-family classification used to pick a
 * font resource for the output document. No single typeface reliably
 * covers all supported languages, so the builder selects one per family.
 */

use anyhow::{anyhow, Result};
use isolang::Language;

/// The languages the pipeline officially supports, as ISO 639-1 codes.
pub const SUPPORTED_LANGUAGES: [&str; 16] = [
    "es", "en", "fr", "de", "it", "pt", "zh", "ja", "ko", "ar", "ru", "hi", "nl", "sv", "pl", "tr",
];

/// Writing-system family of a target language
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFamily {
    /// Latin-script languages (most European languages, Turkish)
    Latin,
    /// Chinese, Japanese, Korean
    Cjk,
    /// Right-to-left scripts (Arabic)
    Rtl,
    /// Cyrillic-script languages (Russian)
    Cyrillic,
    /// Devanagari-script languages (Hindi)
    Devanagari,
}

impl ScriptFamily {
    /// Whether text in this family runs right to left
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Rtl)
    }

    /// The bundled font family capable of rendering this script
    pub fn font_name(&self) -> &'static str {
        match self {
            // DejaVu covers Latin and Cyrillic including full diacritics
            Self::Latin | Self::Cyrillic => "DejaVu Sans",
            Self::Cjk => "Noto Sans CJK SC",
            Self::Rtl => "Noto Naskh Arabic",
            Self::Devanagari => "Noto Sans Devanagari",
        }
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format
pub fn normalize_to_part1(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        if let Some(lang) = Language::from_639_3(&normalized_code) {
            if let Some(part1) = lang.to_639_1() {
                return Ok(part1.to_string());
            }
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check whether a language code is one of the supported languages
pub fn is_supported(code: &str) -> bool {
    normalize_to_part1(code)
        .map(|c| SUPPORTED_LANGUAGES.contains(&c.as_str()))
        .unwrap_or(false)
}

/// Get the script family for a target language code
pub fn script_family(code: &str) -> Result<ScriptFamily> {
    let part1 = normalize_to_part1(code)?;

    match part1.as_str() {
        "zh" | "ja" | "ko" => Ok(ScriptFamily::Cjk),
        "ar" => Ok(ScriptFamily::Rtl),
        "ru" => Ok(ScriptFamily::Cyrillic),
        "hi" => Ok(ScriptFamily::Devanagari),
        other if SUPPORTED_LANGUAGES.contains(&other) => Ok(ScriptFamily::Latin),
        other => Err(anyhow!("Unsupported target language: {}", other)),
    }
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part1(code1), normalize_to_part1(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code, for prompt construction
pub fn get_language_name(code: &str) -> Result<String> {
    let part1 = normalize_to_part1(code)?;
    let lang = Language::from_639_1(&part1)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part1))?;

    Ok(lang.to_name().to_string())
}
