//! HTML to title/body text extraction

use crate::charset::decode_html;
use crate::error::ExtractionError;
use scraper::{ElementRef, Html};

/// Title used when the document has no `<title>` element
pub const NO_TITLE: &str = "No title found";

/// Elements removed from the body, together with everything inside them
const STRIPPED_TAGS: &[&str] = &["script", "style", "img", "input"];

/// Title and readable body text of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: String,
    pub body_text: String,
}

/// Parse raw HTML and pull out its title and visible body text
///
/// Bytes are decoded with the charset declared by a BOM or a `<meta>` tag,
/// falling back to UTF-8 or a guess. The body text is the concatenation of
/// every text node left in `<body>` after stripping non-content elements;
/// whitespace is kept as the parser produced it.
pub fn extract(raw: &[u8]) -> Result<Extracted, ExtractionError> {
    extract_with_content_type(raw, None)
}

/// Like [`extract`], with the response `Content-Type` taking priority over
/// any `<meta>` charset
pub fn extract_with_content_type(
    raw: &[u8],
    content_type: Option<&str>,
) -> Result<Extracted, ExtractionError> {
    let html = decode_html(raw, content_type);
    let mut document = Html::parse_document(&html);

    let title = find_title(&document).unwrap_or_else(|| NO_TITLE.to_string());
    let body_id = find_body(&document)
        .ok_or(ExtractionError::MissingBody)?
        .id();

    let stripped: Vec<_> = document
        .tree
        .get(body_id)
        .map(|body| {
            body.descendants()
                .filter(|node| {
                    node.value()
                        .as_element()
                        .is_some_and(|el| STRIPPED_TAGS.contains(&el.name()))
                })
                .map(|node| node.id())
                .collect()
        })
        .unwrap_or_default();

    for id in stripped {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let body_text = document
        .tree
        .get(body_id)
        .and_then(ElementRef::wrap)
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default();

    tracing::trace!(title = %title, chars = body_text.len(), "Extracted page content");

    Ok(Extracted { title, body_text })
}

/// Text of the first `<title>` element, if any
fn find_title(document: &Html) -> Option<String> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "title")
        .map(|el| el.text().collect())
}

/// The `<body>` child of `<html>`; frameset documents have none
fn find_body(document: &Html) -> Option<ElementRef<'_>> {
    document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
}
