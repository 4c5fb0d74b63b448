//! Navigation Synthesizer.
//!
//! Scans the transformed text for top-level marker headings, derives one
//! navigation entry per heading in document order, and substitutes the
//! joined list into every occurrence of the placeholder token. Entries are
//! never de-duplicated or reordered.

use std::sync::LazyLock;

use regex::Regex;

use super::slugify::heading_slug;

/// Sentinel replaced by the synthesized navigation list. Any occurrence
/// surviving past [`resolve_navigation`] indicates a pipeline defect.
pub const NAV_PLACEHOLDER: &str = "REPLACENAV";

/// Marker-heading lines: `# Lab <digits>`, `# Lab <letter>`, or
/// `# Exercise <digits>`, each followed by trailing title text. Emitted
/// navigation lines start with `> 1. [` and can never re-match.
static MARKER_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(# Lab \d+|# Lab [A-Z]|# Exercise \d+)(.+)$").expect("valid pattern")
});

/// One navigation entry derived from a marker heading.
#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub prefix: String,
    pub title: String,
    pub slug: String,
}

impl NavEntry {
    fn to_line(&self) -> String {
        format!("> 1. [{}{}](#{})", self.prefix, self.title, self.slug)
    }
}

/// Collect navigation entries from marker headings, in document order.
pub fn collect_entries(text: &str) -> Vec<NavEntry> {
    MARKER_HEADING
        .captures_iter(text)
        .map(|cap| {
            let prefix = cap[1][2..].to_string();
            let title = cap[2].to_string();
            let slug = heading_slug(&prefix, &title);
            NavEntry { prefix, title, slug }
        })
        .collect()
}

/// Replace every placeholder token with the synthesized navigation list.
pub fn resolve_navigation(text: &str) -> String {
    let lines: Vec<String> = collect_entries(text)
        .iter()
        .map(NavEntry::to_line)
        .collect();
    text.replace(NAV_PLACEHOLDER, &lines.join("\n"))
}
