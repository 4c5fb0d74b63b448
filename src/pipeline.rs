//! End-to-end conversion: unpack, select, combine, reconcile, transform.
//!
//! One pass, strictly sequential. Chapter order is semantically significant,
//! and the images directory is touched exactly once, after the combined
//! document is fully materialized.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use tracing::info;

use crate::error::Result;
use crate::{archive, assets, chapter, combine, markdown};

/// Conversion policy knobs.
pub struct ConvertOptions {
    /// Ordered encoding fallback for chapter files.
    pub encodings: Vec<&'static Encoding>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            encodings: chapter::resolve_encodings(chapter::DEFAULT_ENCODINGS)
                .expect("default encoding labels resolve"),
        }
    }
}

/// Where the conversion artifacts ended up.
#[derive(Debug)]
pub struct ConvertOutput {
    pub course_id: String,
    /// Combined intermediate document (`<course>.html`).
    pub combined_path: PathBuf,
    /// Final Markdown document (`<course>.md`).
    pub markdown_path: PathBuf,
    /// Unreferenced images removed by the reconciler.
    pub deleted_images: Vec<PathBuf>,
}

/// Convert one courseware archive to Markdown.
///
/// Fatal only on missing required inputs or I/O failure; content-level
/// anomalies degrade to warnings and empty contributions.
pub fn convert_epub(epub_path: &Path, options: &ConvertOptions) -> Result<ConvertOutput> {
    let course = archive::unpack_epub(epub_path)?;

    let files = chapter::list_chapter_files(&course.chapters_dir)?;
    let mut chapters = Vec::with_capacity(files.len());
    for path in &files {
        chapters.push(chapter::read_chapter(path, &options.encodings)?);
    }
    let selected = chapter::select_chapters(chapters);
    let combined = combine::combine_chapters(&selected);

    let combined_path = course.out_dir.join(format!("{}.html", course.course_id));
    fs::write(&combined_path, &combined)?;
    info!(file = %combined_path.display(), "wrote combined document");

    let deleted_images = assets::reconcile_images(&combined, &course.images_dir)?;

    let rendered = markdown::transform(&combined, &course.course_id);
    let markdown_path = course.out_dir.join(format!("{}.md", course.course_id));
    fs::write(&markdown_path, &rendered)?;
    info!(file = %markdown_path.display(), "wrote markdown document");

    Ok(ConvertOutput {
        course_id: course.course_id,
        combined_path,
        markdown_path,
        deleted_images,
    })
}
