//! Asset Reconciler: delete image files the combined document never uses.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use tracing::{debug, info};

use crate::dom::{self, Element, Node};
use crate::error::{Error, Result};

/// Image extensions considered during reconciliation.
const BITMAP_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Cross-reference image references in `combined` against files in
/// `images_dir`; delete every file not referenced. Returns the deleted
/// paths.
///
/// Referenced-but-missing files are never flagged. The asymmetry is
/// accepted: a dangling reference renders as a broken image on the hosting
/// platform and is caught in review, while an unreferenced file bloats the
/// published archive forever.
pub fn reconcile_images(combined: &str, images_dir: &Path) -> Result<Vec<PathBuf>> {
    if !images_dir.is_dir() {
        return Err(Error::MissingInput(images_dir.display().to_string()));
    }

    let nodes = dom::parse_tolerant(combined);
    let mut referenced = HashSet::new();
    collect_image_names(&nodes, &mut referenced);

    let mut deleted = Vec::new();
    for entry in fs::read_dir(images_dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() || !has_bitmap_extension(&path) {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if referenced.contains(&name) {
            debug!(file = %name, "image referenced, keeping");
        } else {
            info!(file = %name, "deleting unreferenced image");
            fs::remove_file(&path)?;
            deleted.push(path);
        }
    }
    Ok(deleted)
}

fn has_bitmap_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BITMAP_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Collect the file-name component of every `<img src>`, percent-decoded so
/// `my%20image.png` on the wire matches `my image.png` on disk.
fn collect_image_names(nodes: &[Node], out: &mut HashSet<String>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.name == "img"
                && let Some(name) = image_basename(el)
            {
                out.insert(name);
            }
            collect_image_names(&el.children, out);
        }
    }
}

fn image_basename(img: &Element) -> Option<String> {
    let src = img.attr("src")?;
    if src.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(src).decode_utf8_lossy();
    let basename = decoded.rsplit('/').next().unwrap_or(&decoded);
    Some(basename.to_string())
}
