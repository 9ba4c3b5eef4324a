//! File-level thumbnail and watermark jobs.
//!
//! Takes image files (or directories of them), plans each operation with the
//! geometry in [`imaging`](crate::imaging), and executes the plan with the
//! built-in [`RasterImage`] backend.
//!
//! ## Output Structure
//!
//! Thumbnails keep their file name and land flat in the output directory:
//!
//! ```text
//! photos/a.jpg        →  thumbs/a.jpg
//! photos/2024/b.png   →  thumbs/b.png
//! ```
//!
//! Images that already fit the target box are copied byte for byte instead of
//! being re-encoded.
//!
//! Inputs are never overwritten: a thumbnail whose output path resolves to its
//! own source fails with [`ProcessError::OutputIsSource`], and inputs that
//! would share an output name (`2023/a.jpg` and `2024/a.jpg`) all fail with
//! [`ProcessError::OutputCollision`] before anything is written.
//!
//! ## Parallel Processing
//!
//! Batches run in parallel using [rayon](https://docs.rs/rayon). Each worker
//! owns its decoded buffers; one failing file does not stop the others.

use crate::imaging::rust_backend::is_supported_input;
use crate::imaging::{
    Anchor, BackendError, ImageBuffer, PastePlan, RasterImage, ResizePlan, ResizePolicy,
    execute_paste_plan, execute_resize, plan_resize, plan_watermark,
};
use crate::types::Size;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Output {0} is the source image itself")]
    OutputIsSource(PathBuf),
    #[error("Output {0} would be written by more than one input")]
    OutputCollision(PathBuf),
    #[error("Walking {path} failed: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// What to do with each file of a thumbnail batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailJob {
    pub target: Size,
    pub policy: ResizePolicy,
}

/// One finished thumbnail.
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: ResizePlan,
}

/// One finished watermark.
#[derive(Debug, Clone, Serialize)]
pub struct WatermarkOutcome {
    /// Size of the watermarked image.
    pub source: Size,
    pub plan: PastePlan,
}

/// Expand the given paths into a sorted list of image files.
///
/// Files are taken as-is; directories are walked recursively and filtered
/// to extensions the raster backend can decode.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|source| ProcessError::Walk {
                    path: path.clone(),
                    source,
                })?;
                if entry.file_type().is_file() && is_supported_input(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            return Err(ProcessError::SourceNotFound(path.clone()));
        }
    }
    Ok(files)
}

/// Where the thumbnail of `source` goes inside `out_dir`.
pub fn output_path_for(source: &Path, out_dir: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.join("thumbnail.png"),
    }
}

/// True when both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Thumbnail one file.
///
/// # Errors
/// [`ProcessError::OutputIsSource`] when `output` is `source`; the source is
/// left untouched.
pub fn thumbnail_file(
    source: &Path,
    output: &Path,
    job: ThumbnailJob,
) -> Result<ThumbnailOutcome, ProcessError> {
    if !source.exists() {
        return Err(ProcessError::SourceNotFound(source.to_path_buf()));
    }
    if is_same_file(source, output) {
        return Err(ProcessError::OutputIsSource(output.to_path_buf()));
    }

    let (width, height) = image::image_dimensions(source).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
    })?;
    let plan = plan_resize(Size::new(width, height), job.target, job.policy)
        .map_err(BackendError::from)?;

    if plan.no_op {
        std::fs::copy(source, output)?;
    } else {
        let image = RasterImage::open(source)?;
        execute_resize(image, &plan)?.save(output)?;
    }
    tracing::debug!(source = %source.display(), output = %output.display(), size = %plan.final_size, "wrote thumbnail");

    Ok(ThumbnailOutcome {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        plan,
    })
}

/// Thumbnail every input into `out_dir` in parallel.
///
/// Results come back in input order, one per file. Inputs whose output
/// paths collide are not processed.
pub fn thumbnail_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    job: ThumbnailJob,
) -> Result<Vec<Result<ThumbnailOutcome, ProcessError>>, ProcessError> {
    std::fs::create_dir_all(out_dir)?;

    let outputs: Vec<PathBuf> = inputs
        .iter()
        .map(|source| output_path_for(source, out_dir))
        .collect();
    let mut claims: HashMap<PathBuf, usize> = HashMap::new();
    for output in &outputs {
        *claims.entry(output.clone()).or_default() += 1;
    }

    Ok(inputs
        .par_iter()
        .zip(outputs.par_iter())
        .map(|(source, output)| {
            if claims[output] > 1 {
                tracing::warn!(source = %source.display(), output = %output.display(), "output name shared with another input");
                return Err(ProcessError::OutputCollision(output.clone()));
            }
            thumbnail_file(source, output, job)
        })
        .collect())
}

/// Watermark one file and write the result to `output`.
///
/// When the watermark does not fit the image is written unchanged.
pub fn watermark_file(
    source: &Path,
    mark: &Path,
    output: &Path,
    anchor: Anchor,
    shrink_factor: f64,
) -> Result<WatermarkOutcome, ProcessError> {
    for path in [source, mark] {
        if !path.exists() {
            return Err(ProcessError::SourceNotFound(path.to_path_buf()));
        }
    }

    let mut image = RasterImage::open(source)?;
    let watermark = RasterImage::open(mark)?;
    let source_size = image.size();
    let plan = plan_watermark(source_size, watermark.size(), anchor, shrink_factor)
        .map_err(BackendError::from)?;
    if plan.is_empty() {
        tracing::info!(source = %source.display(), "watermark does not fit, writing image unchanged");
    }
    execute_paste_plan(&mut image, &watermark, &plan)?;
    image.save(output)?;
    Ok(WatermarkOutcome {
        source: source_size,
        plan,
    })
}
