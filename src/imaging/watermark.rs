//! Watermark placement.
//!
//! [`plan_watermark`] turns a source size, a watermark size and an
//! [`Anchor`] into a [`PastePlan`]:
//!
//! - **Named anchors** produce at most one paste. Computed origins are
//!   clamped to be non-negative; if the watermark would still run past the
//!   right or bottom edge the plan is empty and nothing is pasted.
//! - **Offset** uses the given origin as-is, with the same overflow rule.
//! - **Repeat** tiles the watermark row by row from the top-left corner,
//!   clipping the last column and row to whatever space is left.
//!
//! A watermark larger than the source on either axis is first shrunk with
//! the inset policy into a box of `shrink_factor` times the source size.

use super::calculations::{PlanError, plan_resize};
use super::params::{Anchor, Paste, PastePlan, ResizePolicy};
use crate::types::{Point, Size};

/// Default fraction of the source size an oversized watermark is shrunk into.
pub const DEFAULT_SHRINK_FACTOR: f64 = 0.9;

/// Plan where to paste `watermark` on `source`.
///
/// # Errors
/// - [`PlanError::InvalidBox`] / [`PlanError::DegenerateSize`] from the
///   shrink step, for sources too small to hold a shrunken watermark.
/// - [`PlanError::DegenerateSize`] when tiling a zero-sized watermark.
pub fn plan_watermark(
    source: Size,
    watermark: Size,
    anchor: Anchor,
    shrink_factor: f64,
) -> Result<PastePlan, PlanError> {
    let mut wm = watermark;
    let mut shrink = None;

    if !watermark.fits_within(source) {
        let bounds = Size::new(
            (source.width as f64 * shrink_factor) as u32,
            (source.height as f64 * shrink_factor) as u32,
        );
        let plan = plan_resize(watermark, bounds, ResizePolicy::Inset)?;
        tracing::debug!(%watermark, %bounds, shrunk = %plan.final_size, "shrinking oversized watermark");
        wm = plan.final_size;
        shrink = Some(plan);
    }

    let pastes = match anchor {
        Anchor::Repeat => tile(source, wm)?,
        Anchor::Offset(origin) => single(source, wm, origin).into_iter().collect(),
        named => single(source, wm, anchor_origin(named, source, wm).clamped())
            .into_iter()
            .collect(),
    };

    if pastes.is_empty() {
        tracing::debug!(%source, watermark = %wm, %anchor, "watermark does not fit, skipping");
    }

    Ok(PastePlan {
        anchor,
        watermark_size: wm,
        shrink,
        pastes,
    })
}

/// Unclamped origin for a named anchor.
fn anchor_origin(anchor: Anchor, source: Size, wm: Size) -> Point {
    let (sw, sh) = (source.width as i64, source.height as i64);
    let (ww, wh) = (wm.width as i64, wm.height as i64);

    let centre_x = (sw - ww) / 2;
    let centre_y = (sh - wh) / 2;
    let right = sw - ww;
    let bottom = sh - wh;

    match anchor {
        Anchor::Top => Point::new(centre_x, 0),
        Anchor::Bottom => Point::new(centre_x, bottom),
        Anchor::Center => Point::new(centre_x, centre_y),
        Anchor::Left => Point::new(0, centre_y),
        Anchor::Right => Point::new(right, centre_y),
        Anchor::TopLeft => Point::ORIGIN,
        Anchor::TopRight => Point::new(right, 0),
        Anchor::BottomLeft => Point::new(0, bottom),
        Anchor::BottomRight => Point::new(right, bottom),
        Anchor::Offset(p) => p,
        Anchor::Repeat => Point::ORIGIN,
    }
}

/// A single full paste at `origin`, or nothing if it would not fit.
fn single(source: Size, wm: Size, origin: Point) -> Option<Paste> {
    let fits = origin.is_non_negative()
        && origin.x + wm.width as i64 <= source.width as i64
        && origin.y + wm.height as i64 <= source.height as i64;

    fits.then_some(Paste {
        origin,
        clip: wm,
        clipped: false,
    })
}

/// Number of pastes needed to tile `source` with `wm`, partial tiles included.
fn tile_count(source: Size, wm: Size) -> u64 {
    let columns = source.width.div_ceil(wm.width) as u64;
    let rows = source.height.div_ceil(wm.height) as u64;
    columns * rows
}

/// Row-major tiling from the top-left corner.
///
/// The plan holds one entry per tile, so a tiny watermark on a huge source
/// costs memory in proportion to the tile count. The whole list is reserved
/// up front and an unsatisfiable reservation fails with
/// [`PlanError::TooManyTiles`].
fn tile(source: Size, wm: Size) -> Result<Vec<Paste>, PlanError> {
    if wm.width == 0 || wm.height == 0 {
        return Err(PlanError::DegenerateSize(wm));
    }

    let count = tile_count(source, wm);
    let mut pastes = Vec::new();
    usize::try_from(count)
        .ok()
        .and_then(|n| pastes.try_reserve_exact(n).ok())
        .ok_or(PlanError::TooManyTiles(count))?;
    let mut y = 0;
    while y < source.height {
        let clip_h = wm.height.min(source.height - y);
        let mut x = 0;
        while x < source.width {
            let clip_w = wm.width.min(source.width - x);
            pastes.push(Paste {
                origin: Point::new(x as i64, y as i64),
                clip: Size::new(clip_w, clip_h),
                clipped: clip_w != wm.width || clip_h != wm.height,
            });
            x += clip_w;
        }
        y += clip_h;
    }
    Ok(pastes)
}
