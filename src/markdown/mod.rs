//! Markdown Transformer.
//!
//! Converts the combined document into the hosting platform's Markdown
//! layout. The pipeline is staged: tree passes first (wrapper removal,
//! marker-paragraph promotion), then rendering, then text passes
//! (blank-line collapse, heading-remnant normalization, section-break
//! markers, navigation blocks, image URL rewriting), and finally the
//! navigation placeholder resolution. Each stage takes the previous stage's
//! output and nothing else, so they are testable in isolation.

mod nav;
mod render;
mod slugify;

pub use nav::{NAV_PLACEHOLDER, NavEntry, collect_entries, resolve_navigation};
pub use render::render_nodes;
pub use slugify::heading_slug;

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{self, Element, Node};

/// Section-break marker line separating independently navigable sections.
pub const SECTION_BREAK: &str = "===";

/// Hosting location image URLs are anchored at, parameterized by course id.
const IMAGE_HOST: &str = "https://raw.githubusercontent.com/WebucatorTraining/skillable/main";

/// Paragraphs whose trimmed text starts like this become level-1 headings.
static MARKER_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:Exercise \d+|Lab [A-Z0-9]+)").expect("valid pattern"));

static WHITESPACE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t\r]+$").expect("valid pattern"));

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid pattern"));

static EXERCISE_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(# Exercise \d)").expect("valid pattern"));

static LAB_HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(# Lab [A-Z0-9])").expect("valid pattern"));

static ADJACENT_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"===\n+===").expect("valid pattern"));

static BREAK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^===$").expect("valid pattern"));

/// Transform the combined document into the final Markdown text.
pub fn transform(combined: &str, course_id: &str) -> String {
    let nodes = dom::parse_document(combined);
    let nodes = unwrap_bodies(&nodes);
    let nodes = promote_marker_paragraphs(&nodes);

    let mut text = preamble(course_id);
    text.push_str(&render_nodes(&nodes));

    let text = collapse_blank_lines(&text);
    let text = normalize_heading_remnants(&text);
    let text = insert_section_breaks(&text);
    let text = insert_nav_blocks(&text);
    let text = rewrite_image_urls(&text, course_id);
    resolve_navigation(&text)
}

/// Fixed preamble: course-title line, legal/onboarding block, first
/// section break, and the onboarding section with its "Home" backlink.
fn preamble(course_id: &str) -> String {
    format!(
        r#"# Home
## COURSE_NAME ({course_id})

<img src="https://static.webucator.com/media/public/materials/cover_images/PATH_TO_IMAGE.png"
  alt="Courseware Cover" />

---

*This lab environment was created for courseware purchased on www.coursewarestore.com.*

<link rel="stylesheet" href="https://raw.githubusercontent.com/WebucatorTraining/skillable/combined-knowledge/stylesheet.css">
===

# Activating Your Software for Class
[Home](#home)

[!include [Finding Your Password](https://raw.githubusercontent.com/WebucatorTraining/skillable/main/365-password.md)]

Please note the following differences between this virtual desktop and the course manual:

1. Your lab files can be found on **C:\Labs**.
2. We will skip labs 0 and 1 in the manual as they relate to setting up the environment. Your environment is already
set up.

Proceed to Lab 2 to begin your first exercise, noting that Power BI is already open in your browser, you are not
required to use the app launcher to navigate there.

===

"#
    )
}

/// Remove structural `body` wrappers without touching their children.
fn unwrap_bodies(nodes: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) if el.name == "body" => {
                out.extend(unwrap_bodies(&el.children));
            }
            Node::Element(el) => out.push(Node::Element(Element {
                name: el.name.clone(),
                attrs: el.attrs.clone(),
                children: unwrap_bodies(&el.children),
            })),
            Node::Text(text) => out.push(Node::Text(text.clone())),
        }
    }
    out
}

/// Promote marker paragraphs (`Exercise <digits>` / `Lab <letter-or-digits>`
/// at the start of their trimmed text) into level-1 headings carrying the
/// identical text.
fn promote_marker_paragraphs(nodes: &[Node]) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Element(el) if el.name == "p" => {
                let text = dom::inner_text(el);
                let trimmed = text.trim();
                if MARKER_PARAGRAPH.is_match(trimmed) {
                    Node::Element(Element {
                        name: "h1".to_string(),
                        attrs: Vec::new(),
                        children: vec![Node::Text(trimmed.to_string())],
                    })
                } else {
                    Node::Element(el.clone())
                }
            }
            Node::Element(el) => Node::Element(Element {
                name: el.name.clone(),
                attrs: el.attrs.clone(),
                children: promote_marker_paragraphs(&el.children),
            }),
            Node::Text(text) => Node::Text(text.clone()),
        })
        .collect()
}

/// Collapse whitespace-only lines to empty lines, then collapse runs of
/// three or more consecutive newlines to exactly two (one blank line).
fn collapse_blank_lines(text: &str) -> String {
    let text = WHITESPACE_LINE.replace_all(text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Normalize literal heading-tag remnants into the `# ` Markdown prefix.
/// Synthetically inserted headings are not always rendered when the source
/// carries them as escaped text.
fn normalize_heading_remnants(text: &str) -> String {
    text.replace("<h1>", "# ").replace("</h1>", "")
}

/// Insert a section-break marker and a "Home" backlink before every marker
/// heading line, then collapse adjacent duplicate markers so a heading
/// already preceded by a break does not gain a second one.
fn insert_section_breaks(text: &str) -> String {
    let text = EXERCISE_HEADING_LINE.replace_all(text, "===\n[Home](#home)\n${1}");
    let mut text = LAB_HEADING_LINE
        .replace_all(&text, "===\n[Home](#home)\n${1}")
        .into_owned();
    loop {
        let collapsed = ADJACENT_BREAKS.replace_all(&text, "===").into_owned();
        if collapsed == text {
            return collapsed;
        }
        text = collapsed;
    }
}

/// Immediately after every section-break marker, insert the navigation
/// block: the fixed introductory link followed by one placeholder token.
fn insert_nav_blocks(text: &str) -> String {
    let block = format!(
        "{SECTION_BREAK}\n\n>[+] Exercise List (Click to Open)\n> 1. [Activating Your Software for Class](#activating-your-software-for-class)\n{NAV_PLACEHOLDER}"
    );
    BREAK_LINE.replace_all(text, block.as_str()).into_owned()
}

/// Rewrite relative `images/` paths into absolute URLs at the hosting
/// location, in both Markdown image references and raw `src` remnants.
fn rewrite_image_urls(text: &str, course_id: &str) -> String {
    let base = format!("{IMAGE_HOST}/{course_id}/epub/images/");
    text.replace("](images/", &format!("]({base}"))
        .replace("src=\"images/", &format!("src=\"{base}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_marker_paragraphs_become_headings() {
        let nodes = dom::parse_document("<body><p> Lab 2: Getting Started </p><p>prose</p></body>");
        let nodes = promote_marker_paragraphs(&unwrap_bodies(&nodes));
        let Node::Element(h1) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(h1.name, "h1");
        assert_eq!(dom::inner_text(h1), "Lab 2: Getting Started");
        let Node::Element(p) = &nodes[1] else {
            panic!("expected element");
        };
        assert_eq!(p.name, "p");
    }

    #[test]
    fn test_exercise_paragraph_promotion_requires_digits() {
        let nodes = dom::parse_document("<p>Exercise caution</p>");
        let nodes = promote_marker_paragraphs(&nodes);
        let Node::Element(el) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(el.name, "p");
    }

    #[test]
    fn test_unwrap_bodies_keeps_children() {
        let nodes = dom::parse_document("<body><p>a</p></body>\n<body><p>b</p></body>");
        let unwrapped = unwrap_bodies(&nodes);
        let rendered = render_nodes(&unwrapped);
        assert!(rendered.contains("a"));
        assert!(rendered.contains("b"));
        assert!(!dom::serialize(&unwrapped).contains("<body>"));
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n   \nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("  \na\nb\n"), "a\nb");
    }

    #[test]
    fn test_heading_remnants_normalized() {
        assert_eq!(
            normalize_heading_remnants("<h1>Lab 2: Start</h1>"),
            "# Lab 2: Start"
        );
    }

    #[test]
    fn test_section_break_inserted_before_marker_heading() {
        let text = "intro\n# Lab 2: Start\nbody";
        assert_eq!(
            insert_section_breaks(text),
            "intro\n===\n[Home](#home)\n# Lab 2: Start\nbody"
        );
    }

    #[test]
    fn test_no_duplicate_breaks_when_one_precedes() {
        let text = "===\n\n# Exercise 3: Queries\n";
        let out = insert_section_breaks(text);
        assert_eq!(out.matches("===").count(), 1);
        assert!(out.contains("===\n[Home](#home)\n# Exercise 3: Queries"));
    }

    #[test]
    fn test_nav_block_follows_every_break() {
        let out = insert_nav_blocks("===\nx\n===\ny");
        assert_eq!(out.matches(NAV_PLACEHOLDER).count(), 2);
        assert!(out.starts_with("===\n\n>[+] Exercise List (Click to Open)\n"));
    }

    #[test]
    fn test_image_urls_rewritten() {
        let out = rewrite_image_urls("![d](images/diagram.png)", "PBI101");
        assert_eq!(
            out,
            "![d](https://raw.githubusercontent.com/WebucatorTraining/skillable/main/PBI101/epub/images/diagram.png)"
        );
    }

    #[test]
    fn test_transform_end_to_end_resolves_placeholder() {
        let combined =
            "<body><p>Lab 2: Getting Started</p><p>Open the app.</p><img src=\"images/a.png\" alt=\"a\"/></body>\n";
        let out = transform(combined, "PBI101");
        assert!(out.starts_with("# Home\n## COURSE_NAME (PBI101)\n"));
        assert!(!out.contains(NAV_PLACEHOLDER));
        assert!(out.contains("===\n\n>[+] Exercise List (Click to Open)"));
        assert!(out.contains("> 1. [Lab 2: Getting Started](#lab-2-getting-started)"));
        assert!(out.contains("[Home](#home)\n# Lab 2: Getting Started"));
        assert!(out.contains("/PBI101/epub/images/a.png"));
        assert!(!out.contains("<body>"));
    }

    #[test]
    fn test_transform_empty_combined_document_still_produces_preamble() {
        let out = transform("", "PBI101");
        assert!(out.starts_with("# Home"));
        assert!(!out.contains(NAV_PLACEHOLDER));
        // Preamble carries two section breaks, each with a nav block.
        assert_eq!(out.matches(">[+] Exercise List (Click to Open)").count(), 2);
    }

    proptest! {
        /// Blank-line collapse never leaves three consecutive newlines and
        /// never removes a paragraph boundary entirely.
        #[test]
        fn prop_no_triple_newline_survives(parts in proptest::collection::vec("[ab ]{0,3}", 0..8), gaps in proptest::collection::vec(1usize..6, 0..8)) {
            let mut text = String::new();
            for (part, gap) in parts.iter().zip(gaps.iter()) {
                text.push_str(part);
                text.push_str(&"\n".repeat(*gap));
            }
            let collapsed = collapse_blank_lines(&text);
            prop_assert!(!collapsed.contains("\n\n\n"));
        }
    }
}
