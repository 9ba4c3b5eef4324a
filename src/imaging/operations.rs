//! High-level image operations.
//!
//! These functions combine the planners with backend execution: compute a
//! plan, then drive the [`ImageBuffer`] primitives it calls for.

use super::backend::{BackendError, ImageBuffer};
use super::calculations::{compute_missing_dimension, plan_resize};
use super::params::{Anchor, PastePlan, ResizePlan, ResizePolicy, ResizeStep};
use super::watermark::plan_watermark;
use crate::types::{Point, Size};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions from a decoded buffer.
pub fn get_dimensions(image: &impl ImageBuffer) -> Size {
    image.size()
}

/// Fill in a missing target dimension from the image's own aspect ratio.
pub fn scale_dimensions(
    image: &impl ImageBuffer,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(u32, u32)> {
    Ok(compute_missing_dimension(image.size(), width, height)?)
}

/// Resize `image` into `target` under `policy`.
///
/// Images that already fit, and the `0x0` target, come back untouched.
pub fn resize<B: ImageBuffer>(image: B, target: Size, policy: ResizePolicy) -> Result<B> {
    let plan = plan_resize(image.size(), target, policy)?;
    execute_resize(image, &plan)
}

/// Run a previously computed [`ResizePlan`].
pub fn execute_resize<B: ImageBuffer>(image: B, plan: &ResizePlan) -> Result<B> {
    tracing::debug!(step = ?plan.step, source = %plan.source, target = %plan.target, "executing resize");
    match plan.step {
        ResizeStep::PassThrough => Ok(image),
        ResizeStep::Inset => image.thumbnail_inset(plan.target),
        ResizeStep::Outbound => image.thumbnail_outbound(plan.target),
        ResizeStep::TopCrop => {
            let origin = plan.crop_origin.unwrap_or(Point::ORIGIN);
            let crop = plan.crop_size.unwrap_or(plan.target);
            image.resize_to(plan.scaled_size)?.crop_to(origin, crop)
        }
    }
}

/// Paste `watermark` onto `source` at `anchor`.
///
/// Returns the plan that was executed; an empty plan means the watermark did
/// not fit and `source` was left unchanged.
pub fn apply_watermark<B: ImageBuffer>(
    source: &mut B,
    watermark: &B,
    anchor: Anchor,
    shrink_factor: f64,
) -> Result<PastePlan> {
    let plan = plan_watermark(source.size(), watermark.size(), anchor, shrink_factor)?;
    execute_paste_plan(source, watermark, &plan)?;
    Ok(plan)
}

/// Run a previously computed [`PastePlan`].
///
/// Shrinks the watermark first when the plan says so; clipped entries paste
/// the top-left part of the watermark cut to the clip size.
pub fn execute_paste_plan<B: ImageBuffer>(
    source: &mut B,
    watermark: &B,
    plan: &PastePlan,
) -> Result<()> {
    if plan.is_empty() {
        return Ok(());
    }

    let shrunk = match &plan.shrink {
        Some(shrink) if !shrink.no_op => Some(watermark.thumbnail_inset(shrink.target)?),
        _ => None,
    };
    let mark = shrunk.as_ref().unwrap_or(watermark);

    for paste in &plan.pastes {
        if paste.clipped {
            let piece = mark.crop_to(Point::ORIGIN, paste.clip)?;
            source.paste_at(paste.origin, &piece)?;
        } else {
            source.paste_at(paste.origin, mark)?;
        }
    }
    tracing::debug!(anchor = %plan.anchor, pastes = plan.len(), "applied watermark");
    Ok(())
}
