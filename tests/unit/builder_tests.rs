/*!
 * Output document assembly tests
 */

use pdflingo::builder::{build, Block, DocumentMetadata};
use pdflingo::extraction::{ImageAsset, ImageEncoding};
use pdflingo::translation::TranslatedChunk;

fn translated(seq: usize, starts_chapter: bool, label: Option<&str>, text: &str) -> TranslatedChunk {
    TranslatedChunk {
        sequence_index: seq,
        text: text.to_string(),
        starts_chapter,
        chapter_index: if starts_chapter { seq } else { seq.saturating_sub(1) },
        chapter_label: label.map(String::from),
        start_page: seq,
        end_page: seq,
    }
}

fn metadata(target: &str) -> DocumentMetadata {
    DocumentMetadata::new(
        "La Sombra del Viento",
        Some("Carlos Ruiz Zafón".to_string()),
        "es",
        target,
        "claude-sonnet-4-5-20250929",
    )
}

#[test]
fn test_build_produces_cover_metadata_and_toc() {
    let chunks = vec![
        translated(0, true, Some("Chapter 1"), "CHAPTER 1: The Beginning\n\nFirst paragraph."),
        translated(1, true, Some("Chapter 2"), "CHAPTER 2: The Middle\n\nSecond paragraph."),
    ];
    let doc = build(&chunks, &[], metadata("en")).unwrap();

    assert_eq!(doc.metadata.title, "La Sombra del Viento");
    assert_eq!(doc.metadata.author.as_deref(), Some("Carlos Ruiz Zafón"));
    assert_eq!(doc.metadata.target_language, "en");
    assert_eq!(doc.toc.len(), 2);
    assert_eq!(doc.toc[0].title, "Chapter 1");
    assert_eq!(doc.chapters.len(), 2);
}

#[test]
fn test_output_document_serializes_to_json() {
    let chunks = vec![translated(
        0,
        true,
        Some("Chapter 1"),
        "A paragraph.\n\n1. An item\n\n*\"A quote.\"*",
    )];
    let image = ImageAsset {
        page_index: 0,
        width: 800,
        height: 600,
        encoding: ImageEncoding::Png,
        data: vec![1, 2, 3],
    };
    let doc = build(&chunks, &[image], metadata("fr")).unwrap();

    let json = serde_json::to_string(&doc).unwrap();
    assert!(json.contains("\"kind\":\"paragraph\""));
    assert!(json.contains("\"kind\":\"numbered\""));
    assert!(json.contains("\"kind\":\"epigraph\""));
    assert!(json.contains("\"kind\":\"image\""));
    // Image bytes ride along base64-encoded so a renderer can re-embed
    // them: [1, 2, 3] encodes to "AQID"
    assert!(json.contains("\"data\":\"AQID\""));
    assert!(json.contains("\"generated_at\""));

    // And they survive a round trip through the artifact
    let parsed: pdflingo::builder::OutputDocument = serde_json::from_str(&json).unwrap();
    let restored = parsed.chapters.iter().flat_map(|c| &c.blocks).find_map(|b| match b {
        Block::Image { asset } => Some(asset.data.clone()),
        _ => None,
    });
    assert_eq!(restored.as_deref(), Some(&[1u8, 2, 3][..]));
}

#[test]
fn test_blocks_keep_reading_order_within_a_chapter() {
    let chunks = vec![
        translated(0, true, Some("Chapter 1"), "First paragraph."),
        translated(1, false, Some("Chapter 1"), "Second paragraph."),
    ];
    // Continuation chunk belongs to the same chapter
    let mut chunks = chunks;
    chunks[1].chapter_index = 0;

    let doc = build(&chunks, &[], metadata("de")).unwrap();
    assert_eq!(doc.chapters.len(), 1);

    let texts: Vec<&str> = doc.chapters[0]
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Paragraph { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["First paragraph.", "Second paragraph."]);
}

#[test]
fn test_rtl_target_gets_rtl_font_selection() {
    let chunks = vec![translated(0, true, None, "نص مترجم.")];
    let doc = build(&chunks, &[], metadata("ar")).unwrap();
    assert!(doc.font.rtl);
    assert_eq!(doc.font.family, "Noto Naskh Arabic");
}
