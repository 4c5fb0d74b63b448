//! Courseware archive unpacking.
//!
//! An `.epub` is a ZIP file. Unpacking copies the archive to `<base>.zip`
//! beside itself (the publisher workflow expects the renamed copy to stick
//! around), then extracts everything into `<dir>/<base>/epub/`. The course
//! identifier is the archive's base name and parameterizes both generated
//! URLs and the preamble heading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Paths and identity of an unpacked courseware archive.
#[derive(Debug, Clone)]
pub struct UnpackedCourse {
    /// Course identifier, derived from the archive's base name.
    pub course_id: String,
    /// Directory the output documents are written beside.
    pub out_dir: PathBuf,
    /// Directory holding the chapter files (`<dir>/<base>/epub/`).
    pub chapters_dir: PathBuf,
    /// Sibling images directory (`<chapters_dir>/images/`).
    pub images_dir: PathBuf,
}

/// Unpack `epub_path` and return the resulting course layout.
///
/// A missing archive is the one fatal error in the pipeline: nothing has
/// been written yet, so the run aborts with no partial output.
pub fn unpack_epub(epub_path: &Path) -> Result<UnpackedCourse> {
    if !epub_path.is_file() {
        return Err(Error::MissingInput(epub_path.display().to_string()));
    }

    let course_id = epub_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| Error::MissingInput(epub_path.display().to_string()))?;

    let out_dir = match epub_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let zip_path = out_dir.join(format!("{course_id}.zip"));
    fs::copy(epub_path, &zip_path)?;
    info!(from = %epub_path.display(), to = %zip_path.display(), "copied archive");

    let chapters_dir = out_dir.join(&course_id).join("epub");
    fs::create_dir_all(&chapters_dir)?;

    let file = fs::File::open(&zip_path)?;
    let mut archive = ZipArchive::new(file)?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Entries with traversal components are silently skipped.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let dest = chapters_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&dest)?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&dest)?;
        io::copy(&mut entry, &mut out)?;
    }
    info!(dir = %chapters_dir.display(), entries = archive.len(), "extracted archive");

    let images_dir = chapters_dir.join("images");
    Ok(UnpackedCourse {
        course_id,
        out_dir,
        chapters_dir,
        images_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_epub(path: &Path) {
        let file = fs::File::create(path).expect("create epub");
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("ch01.html", options).expect("start entry");
        zip.write_all(b"<html><body><p>Lab 2: Start</p></body></html>")
            .expect("write entry");
        zip.start_file("images/diagram.png", options)
            .expect("start entry");
        zip.write_all(b"png-bytes").expect("write entry");
        zip.finish().expect("finish zip");
    }

    #[test]
    fn test_unpack_creates_course_layout() {
        let dir = TempDir::new().expect("tempdir");
        let epub = dir.path().join("PBI101.epub");
        write_epub(&epub);

        let course = unpack_epub(&epub).expect("unpack");
        assert_eq!(course.course_id, "PBI101");
        assert_eq!(course.out_dir, dir.path());
        assert_eq!(course.chapters_dir, dir.path().join("PBI101").join("epub"));
        assert!(course.chapters_dir.join("ch01.html").is_file());
        assert!(course.images_dir.join("diagram.png").is_file());
        assert!(dir.path().join("PBI101.zip").is_file());
    }

    #[test]
    fn test_missing_archive_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("nope.epub");
        assert!(matches!(
            unpack_epub(&missing),
            Err(Error::MissingInput(_))
        ));
    }
}
