//! Custom assertions for PDF redaction testing.
//!
//! Provides domain-specific assertions that make tests more readable
//! and provide better error messages.

use lopdf::Document;

use super::pdf_helpers::streams_contain;

/// Asserts that a pattern is gone from a PDF: absent from the extracted
/// text and from every (decompressed) stream in the file.
///
/// # Panics
/// Panics if the pattern is still found.
pub fn assert_redacted(pdf: &[u8], pattern: &str) {
    let text = extract_text_or_panic(pdf);
    assert!(
        !text.contains(pattern),
        "Pattern '{}' should be redacted but was found in extracted text ({} chars)",
        pattern,
        text.len()
    );

    let doc = Document::load_mem(pdf).expect("Failed to parse output PDF");
    assert!(
        !streams_contain(&doc, pattern),
        "Pattern '{}' should be redacted but survives in a stream",
        pattern
    );
}

/// Asserts that a pattern has been preserved in a PDF's text.
///
/// # Panics
/// Panics if the pattern is not found.
pub fn assert_preserved(pdf: &[u8], pattern: &str) {
    let text = extract_text_or_panic(pdf);
    assert!(
        text.contains(pattern),
        "Pattern '{}' should be preserved but was not found in extracted text",
        pattern
    );
}

/// Asserts that every sanitized Info field is present and empty.
///
/// # Panics
/// Panics on a missing Info dictionary or a non-empty field.
pub fn assert_metadata_sanitized(pdf: &[u8]) {
    let doc = Document::load_mem(pdf).expect("Failed to parse output PDF");
    for field in redactor::redaction::SANITIZED_INFO_FIELDS {
        let value = super::pdf_helpers::info_field(&doc, field)
            .unwrap_or_else(|e| panic!("Info field '{}' missing: {}", field, e));
        assert!(
            value.is_empty(),
            "Info field '{}' should be empty, got '{}'",
            field,
            value
        );
    }
}

fn extract_text_or_panic(pdf: &[u8]) -> String {
    redactor::extract_text(pdf)
        .unwrap_or_else(|e| panic!("Failed to extract text from PDF: {}", e))
}
