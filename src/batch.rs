//! Batch processing of an image directory into a CSV audit file.
//!
//! Images are processed on a bounded rayon pool; each file's run is fully
//! independent. Output rows are written in lexicographic filename order
//! regardless of completion order. One failing image is logged and skipped,
//! never aborting the batch.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::GrayImage;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::Result;
use crate::processing::MeterReader;

/// Outcome of a batch run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Number of images decoded and written to the CSV.
    pub decoded: usize,
    /// Filenames that failed, with the error they failed with.
    pub skipped: Vec<(String, String)>,
}

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Lists image files in `dir`, sorted lexicographically by filename.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
                })
        })
        .collect();
    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

fn read_one(reader: &MeterReader, path: &Path) -> Result<String> {
    let img: GrayImage = image::open(path)?.to_luma8();
    reader.read(&img)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A CSV row: `<stem>,<digit4>,<digit3>,<digit2>,<digit1>`, most significant
/// digit first. A 3-digit reading leaves the most-significant column empty.
fn csv_row(stem: &str, digits: &str) -> String {
    let mut fields = vec![stem.to_string()];
    if digits.chars().count() == 3 {
        fields.push(String::new());
    }
    fields.extend(digits.chars().map(String::from));
    fields.join(",")
}

/// Processes `files` in parallel and writes one CSV row per decoded image to
/// `csv_path`. The destination must not already exist: a collision is a hard
/// failure so an audit file is never overwritten or appended to.
pub fn run_batch(
    reader: &MeterReader,
    files: &[PathBuf],
    csv_path: &Path,
    jobs: Option<usize>,
) -> Result<BatchSummary> {
    // Fail on a CSV collision before spending any work on images.
    let mut out = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(csv_path)?;

    let mut files: Vec<PathBuf> = files.to_vec();
    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));

    let results: Vec<(PathBuf, Result<String>)> = match jobs {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            pool.install(|| {
                files
                    .par_iter()
                    .map(|path| (path.clone(), read_one(reader, path)))
                    .collect()
            })
        }
        None => files
            .par_iter()
            .map(|path| (path.clone(), read_one(reader, path)))
            .collect(),
    };

    let mut summary = BatchSummary {
        decoded: 0,
        skipped: Vec::new(),
    };
    for (path, result) in results {
        match result {
            Ok(digits) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                writeln!(out, "{}", csv_row(&stem, &digits))?;
                summary.decoded += 1;
            }
            Err(err) => {
                let label = file_label(&path);
                warn!(file = %label, error = %err, "image skipped");
                summary.skipped.push((label, err.to_string()));
            }
        }
    }

    info!(
        decoded = summary.decoded,
        skipped = summary.skipped.len(),
        "batch complete"
    );
    Ok(summary)
}
