//! Chapter file discovery, decoding, and selection.
//!
//! Chapter files are ordered by filename; lexical order equals reading
//! order. Selection returns the ordered suffix of chapters beginning at the
//! first one whose body's first paragraph starts a lab ("Lab 2" or "Lab B"),
//! skipping front matter such as cover pages and environment-setup labs.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use tracing::{debug, info, warn};

use crate::dom::{self, Node};
use crate::error::{Error, Result};

/// Ordered encoding fallback used when reading chapter bytes.
///
/// The first encoding that decodes without replacement characters wins; no
/// content-level validation is attempted beyond that. The default list
/// matches what the source template's authoring tool has historically
/// produced.
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "iso-8859-1", "cp1252"];

/// One chapter file, already decoded.
#[derive(Debug, Clone)]
pub struct ChapterFile {
    pub path: PathBuf,
    pub name: String,
    pub text: String,
}

/// Resolve encoding labels to [`Encoding`] handles.
///
/// Unknown labels are a [`Error::Decode`]: a typo in the fallback policy
/// should fail loudly rather than silently shrink the list.
pub fn resolve_encodings(labels: &[&str]) -> Result<Vec<&'static Encoding>> {
    labels
        .iter()
        .map(|label| {
            Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| Error::Decode(format!("unknown encoding label: {label}")))
        })
        .collect()
}

/// List chapter files in `dir`, sorted by filename.
pub fn list_chapter_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingInput(dir.display().to_string()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("xhtml")
                    })
        })
        .collect();
    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

/// Read and decode one chapter file through the encoding fallback chain.
pub fn read_chapter(path: &Path, encodings: &[&'static Encoding]) -> Result<ChapterFile> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::MissingInput(path.display().to_string()),
        _ => Error::Io(e),
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for encoding in encodings {
        let (text, actual, malformed) = encoding.decode(&bytes);
        if !malformed {
            debug!(file = %name, encoding = actual.name(), "decoded chapter");
            return Ok(ChapterFile {
                path: path.to_path_buf(),
                name,
                text: text.into_owned(),
            });
        }
    }

    Err(Error::Decode(format!(
        "{} did not decode under any configured encoding",
        path.display()
    )))
}

/// Content Selector: return the ordered suffix of `chapters` beginning at
/// the first one satisfying [`starts_lab_content`]. Everything after that
/// point is included unconditionally; earlier chapters are skipped with a
/// logged notice. No match yields an empty result and a run-level warning.
pub fn select_chapters(chapters: Vec<ChapterFile>) -> Vec<ChapterFile> {
    let mut start = None;
    for (i, chapter) in chapters.iter().enumerate() {
        if starts_lab_content(&chapter.text) {
            start = Some(i);
            break;
        }
        info!(file = %chapter.name, "skipping front-matter chapter");
    }

    match start {
        Some(i) => chapters.into_iter().skip(i).collect(),
        None => {
            warn!("no chapter matched the lab-content predicate; output will be empty");
            Vec::new()
        }
    }
}

/// Inclusion predicate: does the body's first paragraph begin with "Lab 2"
/// or "Lab B"?
///
/// Only the paragraph's direct text children are inspected, so leading
/// inline formatting elements are stepped over but text wrapped entirely
/// inside them does not match.
pub fn starts_lab_content(text: &str) -> bool {
    let nodes = dom::parse_document(text);
    let Some(body) = dom::find_element(&nodes, "body") else {
        return false;
    };
    let Some(first_p) = dom::find_element(&body.children, "p") else {
        return false;
    };
    first_p.children.iter().any(|child| {
        if let Node::Text(text) = child {
            let trimmed = text.trim();
            trimmed.starts_with("Lab 2") || trimmed.starts_with("Lab B")
        } else {
            false
        }
    })
}
