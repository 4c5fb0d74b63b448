//! Content Combiner: fold selected chapters into one combined document.

use tracing::{info, warn};

use crate::chapter::ChapterFile;
use crate::dom;

/// Parse each chapter, normalize its text, extract the `body` subtree, and
/// concatenate the serialized bodies in file order, each followed by one
/// separator line.
///
/// A chapter without a body contributes an empty segment and logs a warning;
/// the pipeline continues. Segments are buffered and joined once at the end
/// so ordering stays explicit and large intermediate strings are not copied
/// repeatedly.
pub fn combine_chapters(chapters: &[ChapterFile]) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(chapters.len());

    for chapter in chapters {
        info!(file = %chapter.name, "including chapter");
        segments.push(extract_body_markup(&chapter.text, &chapter.name));
    }

    if segments.is_empty() {
        String::new()
    } else {
        let mut combined = segments.join("\n");
        combined.push('\n');
        combined
    }
}

/// Normalized markup of one chapter's `body` subtree (wrapper included), or
/// an empty string when the chapter has no body.
fn extract_body_markup(text: &str, file_name: &str) -> String {
    let nodes = dom::parse_document(text);
    let nodes = dom::strip_text_newlines(&nodes);
    let nodes = dom::clean_alt_attrs(&nodes);

    match dom::find_element(&nodes, "body") {
        Some(body) => dom::serialize(&[dom::Node::Element(body.clone())]),
        None => {
            warn!(file = %file_name, "chapter has no body content");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn chapter(name: &str, html: &str) -> ChapterFile {
        ChapterFile {
            path: PathBuf::from(name),
            name: name.to_string(),
            text: html.to_string(),
        }
    }

    #[test]
    fn test_bodies_concatenate_in_order() {
        let combined = combine_chapters(&[
            chapter("a.html", "<html><body><p>first</p></body></html>"),
            chapter("b.html", "<html><body><p>second</p></body></html>"),
        ]);
        assert_eq!(
            combined,
            "<body><p>first</p></body>\n<body><p>second</p></body>\n"
        );
    }

    #[test]
    fn test_paragraph_newlines_are_stripped() {
        let combined = combine_chapters(&[chapter(
            "a.html",
            "<body><p>multi\nline\nprose</p></body>",
        )]);
        assert_eq!(combined, "<body><p>multilineprose</p></body>\n");
    }

    #[test]
    fn test_pre_content_survives_untouched() {
        let combined = combine_chapters(&[chapter(
            "a.html",
            "<body><pre>line one\nline two</pre></body>",
        )]);
        assert!(combined.contains("line one\nline two"));
    }

    #[test]
    fn test_missing_body_contributes_empty_segment() {
        let combined = combine_chapters(&[
            chapter("a.html", "<html><head/></html>"),
            chapter("b.html", "<body><p>kept</p></body>"),
        ]);
        assert_eq!(combined, "\n<body><p>kept</p></body>\n");
    }

    #[test]
    fn test_empty_selection_is_empty_document() {
        assert_eq!(combine_chapters(&[]), "");
    }

    #[test]
    fn test_alt_attribute_newlines_become_spaces() {
        let combined = combine_chapters(&[chapter(
            "a.html",
            "<body><img src=\"images/a.png\" alt=\"two\nlines\"/></body>",
        )]);
        assert!(combined.contains("alt=\"two lines\""));
    }
}
