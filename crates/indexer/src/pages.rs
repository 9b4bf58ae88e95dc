/// Page separator emitted by `pdftotext`
pub const PAGE_BREAK: char = '\x0c';

/// Split a text dump into pages, 0-based in order.
///
/// A trailing form feed does not open an extra empty page.
pub fn split_pages(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let text = text.strip_suffix(PAGE_BREAK).unwrap_or(text);
    text.split(PAGE_BREAK).collect()
}

/// Decode raw file bytes, replacing invalid UTF-8 sequences
pub fn decode_document(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
