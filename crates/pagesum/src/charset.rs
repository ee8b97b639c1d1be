//! Character set detection for fetched HTML
//!
//! Order of precedence: byte order mark, `Content-Type` charset, `<meta>`
//! declaration in the first 1024 bytes, then valid UTF-8, then a statistical
//! guess.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// How far into the document to look for a `<meta>` charset
const META_PRESCAN_BYTES: usize = 1024;

/// Decode `raw` into text using the best known encoding
pub fn decode_html(raw: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(raw, content_type);
    let (text, used, had_errors) = encoding.decode(raw);
    if had_errors {
        tracing::debug!(encoding = used.name(), "Replaced malformed byte sequences");
    }
    text.into_owned()
}

/// Pick the encoding for `raw`
pub fn detect_encoding(raw: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(raw) {
        return encoding;
    }
    if let Some(encoding) = content_type.and_then(header_charset) {
        return encoding;
    }
    if let Some(encoding) = meta_charset(raw) {
        return encoding;
    }
    if std::str::from_utf8(raw).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(raw, true);
    detector.guess(None, true)
}

/// Charset parameter of a `Content-Type` value
fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

/// `charset=` declared by a `<meta>` tag near the start of the document
///
/// UTF-16 declarations are read as UTF-8, since a document that parsed as
/// ASCII up to here cannot really be UTF-16.
fn meta_charset(raw: &[u8]) -> Option<&'static Encoding> {
    let head = &raw[..raw.len().min(META_PRESCAN_BYTES)];
    let head = head.to_ascii_lowercase();

    let mut offset = 0;
    while let Some(pos) = find(&head[offset..], b"<meta") {
        let start = offset + pos;
        let end = head[start..]
            .iter()
            .position(|&b| b == b'>')
            .map_or(head.len(), |p| start + p);
        let tag = &head[start..end];

        if let Some(at) = find(tag, b"charset") {
            let rest = &tag[at + b"charset".len()..];
            let rest = trim_ascii_start(rest);
            if let Some(rest) = rest.strip_prefix(b"=") {
                let rest = trim_ascii_start(rest);
                let rest = rest
                    .strip_prefix(b"\"")
                    .or_else(|| rest.strip_prefix(b"'"))
                    .unwrap_or(rest);
                let label_end = rest
                    .iter()
                    .position(|&b| {
                        matches!(b, b'"' | b'\'' | b';' | b'/') || b.is_ascii_whitespace()
                    })
                    .unwrap_or(rest.len());
                if let Some(encoding) = Encoding::for_label(&rest[..label_end]) {
                    return Some(encoding.output_encoding());
                }
            }
        }
        offset = end;
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}
