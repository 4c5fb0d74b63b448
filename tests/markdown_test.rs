//! Transformer scenario tests over a realistic combined document.

use coursemd::markdown::{collect_entries, transform};

const COMBINED: &str = concat!(
    "<body><p>Lab 2 : Getting Started</p>",
    "<p>Welcome to the <b>first</b> lab.</p>",
    "<ol><li>Open the app.</li><li>Sign in.</li></ol>",
    "<img src=\"images/login.png\" alt=\"Login\"/></body>\n",
    "<body><p>Exercise 10: Data Cleanup</p>",
    "<p>Use <code>trim()</code> on every column.</p>",
    "<pre>let x = 1;\nlet y = 2;</pre></body>\n",
    "<body><p>Lab 3 : Formatting Data</p>",
    "<p>See <a href=\"https://example.com\">the docs</a>.</p></body>\n",
);

#[test]
fn test_every_marker_heading_gets_one_break_and_one_entry() {
    let out = transform(COMBINED, "PBI101");

    for heading in [
        "# Lab 2 : Getting Started",
        "# Exercise 10: Data Cleanup",
        "# Lab 3 : Formatting Data",
    ] {
        assert_eq!(out.matches(heading).count(), 1, "heading: {heading}");
        // Preceded by a Home backlink, which in turn follows a break.
        let backlinked = format!("[Home](#home)\n{heading}");
        assert!(out.contains(&backlinked), "missing backlink for {heading}");
    }

    // One navigation entry per marker heading, repeated once per break.
    let entries = collect_entries(&out);
    let breaks = out.matches("===").count();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        out.matches("> 1. [Lab 3 : Formatting Data](#lab-3-formatting-data)")
            .count(),
        breaks
    );
}

#[test]
fn test_navigation_order_follows_document_order() {
    let out = transform(COMBINED, "PBI101");
    let entries = collect_entries(&out);
    let slugs: Vec<&str> = entries.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(
        slugs,
        [
            "lab-2-getting-started",
            "exercise-10-data-cleanup",
            "lab-3-formatting-data"
        ]
    );
}

#[test]
fn test_element_mappings_and_code_preservation() {
    let out = transform(COMBINED, "PBI101");
    assert!(out.contains("Welcome to the **first** lab."));
    assert!(out.contains("1. Open the app.\n2. Sign in."));
    assert!(out.contains("Use `trim()` on every column."));
    assert!(out.contains("```\nlet x = 1;\nlet y = 2;\n```"));
    assert!(out.contains("[the docs](https://example.com)"));
    assert!(out.contains(
        "![Login](https://raw.githubusercontent.com/WebucatorTraining/skillable/main/PBI101/epub/images/login.png)"
    ));
}

#[test]
fn test_no_placeholder_and_no_triple_blank_lines_survive() {
    let out = transform(COMBINED, "PBI101");
    assert!(!out.contains("REPLACENAV"));
    assert!(!out.contains("\n\n\n"));
}

#[test]
fn test_transform_is_stable_across_course_ids() {
    let a = transform(COMBINED, "PBI101");
    let b = transform(COMBINED, "SQL202");
    assert!(a.contains("(PBI101)"));
    assert!(b.contains("(SQL202)"));
    assert!(b.contains("/SQL202/epub/images/login.png"));
}
