//! Anchor slug derivation for marker headings.

/// Derive the URL-anchor slug for a marker heading split into prefix
/// ("Lab 3") and title (" : Formatting Data").
///
/// Both halves are lowercased and hyphen-joined word by word, the joined
/// halves are hyphenated together, any `-:-` sequence left by a colon
/// separator collapses to a single hyphen, and literal bracket characters
/// are stripped.
///
/// # Examples
///
/// ```
/// use coursemd::markdown::heading_slug;
///
/// assert_eq!(heading_slug("Lab 3", " : Formatting Data"), "lab-3-formatting-data");
/// assert_eq!(heading_slug("Exercise 12", ": Joins [Optional]"), "exercise-12-joins-optional");
/// ```
pub fn heading_slug(prefix: &str, title: &str) -> String {
    let slug = format!("{}-{}", join_words_lower(prefix), join_words_lower(title));
    slug.replace("-:-", "-").replace(['[', ']'], "")
}

fn join_words_lower(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
