//! # coursemd
//!
//! Convert a packaged e-book courseware archive into a single Markdown
//! document formatted for a lab-hosting platform's navigation and styling
//! conventions.
//!
//! The pipeline unpacks the archive, selects the contiguous range of chapter
//! files starting at the first real lab, merges their body content under
//! cleanup rules, prunes unreferenced images, and rewrites the merged markup
//! into Markdown with a fixed preamble, section-break markers, synthesized
//! navigation links, and absolute image URLs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use coursemd::{ConvertOptions, convert_epub};
//!
//! let output = convert_epub("PBI101.epub".as_ref(), &ConvertOptions::default())?;
//! println!("wrote {}", output.markdown_path.display());
//! # Ok::<(), coursemd::Error>(())
//! ```
//!
//! ## Stages
//!
//! - [`archive`]: unpack the `.epub` into `<dir>/<base>/epub/`
//! - [`chapter`]: list, decode, and select chapter files
//! - [`combine`]: merge chapter bodies into the combined document
//! - [`assets`]: delete images the combined document never references
//! - [`markdown`]: render Markdown, promote headings, synthesize navigation

pub mod archive;
pub mod assets;
pub mod chapter;
pub mod combine;
pub mod dom;
pub mod error;
pub mod markdown;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{ConvertOptions, ConvertOutput, convert_epub};
